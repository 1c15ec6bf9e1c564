//! Logging macros.
//!
//! With the `defmt` feature these forward to the matching [defmt] macro; without it they compile to
//! nothing. When testing on the host Operating system `eprintln!` is called instead and `error!`
//! panics. In order to work with both `defmt` and `eprintln` only the debug syntax can be used, not
//! the `defmt::Formatter` syntax.

#[macro_export]
macro_rules! debug {
    ($($arg:expr),*) => {
        $crate::log_to!(debug, $($arg),*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:expr),*) => {
        $crate::log_to!(info, $($arg),*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:expr),*) => {
        $crate::log_to!(warn, $($arg),*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:expr),*) => {
        $crate::log_to!(error, $($arg),*)
    };
}

/// Log at debug level only when `$verbose` is true.
///
/// ```ignore
/// verbose!(self.config.verbose, "key {} down", key_id);
/// ```
#[macro_export]
macro_rules! verbose {
    ($verbose:expr, $($arg:expr),*) => {
        if $verbose {
            $crate::debug!($($arg),*);
        }
    };
}

#[doc(hidden)]
#[cfg(all(not(test), not(feature = "test-utils"), feature = "defmt"))]
#[macro_export]
macro_rules! log_to {
    ($level:ident, $($arg:expr),*) => {
        defmt::$level!($($arg,)*)
    };
}

#[doc(hidden)]
#[cfg(all(not(test), not(feature = "test-utils"), not(feature = "defmt")))]
#[macro_export]
macro_rules! log_to {
    ($level:ident, $($arg:expr),*) => {{
        let _ = ($($arg),*);
    }};
}

#[doc(hidden)]
#[cfg(any(test, feature = "test-utils"))]
#[macro_export]
macro_rules! log_to {
    (error, $($arg:expr),*) => {{
        extern crate std;
        if cfg!(test) {
            panic!("{}", std::format!($($arg,)*));
        } else {
            std::eprintln!(
                "\nERROR: at ./{}:{}:{}:\n{}",
                file!(),
                line!(),
                column!(),
                std::format!($($arg,)*)
            );
        }
    }};
    ($level:ident, $($arg:expr),*) => {{
        extern crate std;
        std::eprintln!("{}: {}", stringify!($level), std::format!($($arg,)*))
    }};
}
