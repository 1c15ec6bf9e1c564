//! Board supplied hooks for actions the core cannot perform itself.
//!
//! Each hook is optional; calling one that has not been registered does nothing.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

pub type FirmwareFn = &'static (dyn Fn() + Sync);

#[derive(Clone, Copy)]
enum Hook {
    Reset,
    Bootloader,
    Suspend,
    Shutdown,
}

struct Functions {
    reset: Option<FirmwareFn>,
    bootloader: Option<FirmwareFn>,
    suspend: Option<FirmwareFn>,
    shutdown: Option<FirmwareFn>,
}
impl Functions {
    const fn new() -> Self {
        Self {
            reset: None,
            bootloader: None,
            suspend: None,
            shutdown: None,
        }
    }

    fn slot(&mut self, hook: Hook) -> &mut Option<FirmwareFn> {
        match hook {
            Hook::Reset => &mut self.reset,
            Hook::Bootloader => &mut self.bootloader,
            Hook::Suspend => &mut self.suspend,
            Hook::Shutdown => &mut self.shutdown,
        }
    }
}

static FUNCTIONS: CriticalSectionMutex<RefCell<Functions>> =
    CriticalSectionMutex::new(RefCell::new(Functions::new()));

fn call(hook: Hook) {
    // copy out so the hook runs outside the critical section
    let f = FUNCTIONS.lock(|r| *r.borrow_mut().slot(hook));
    if let Some(f) = f {
        f();
    }
}

fn register(hook: Hook, value: Option<FirmwareFn>) {
    FUNCTIONS.lock(|r| *r.borrow_mut().slot(hook) = value);
}

pub fn reset() {
    call(Hook::Reset);
}

pub fn reset_to_bootloader() {
    call(Hook::Bootloader);
}

/// Enter low power sleep. Wakes on a key press.
pub fn suspend() {
    call(Hook::Suspend);
}

pub fn shutdown() {
    call(Hook::Shutdown);
}

/// Register a function that will reset the MCU when [reset] is called.
///
/// ```ignore
/// fn myreset() {
///     cortex_m::peripheral::SCB::sys_reset();
/// }
///
/// handle_reset(Some(&myreset));
/// ```
pub fn handle_reset(value: Option<FirmwareFn>) {
    register(Hook::Reset, value);
}

pub fn handle_reset_to_bootloader(value: Option<FirmwareFn>) {
    register(Hook::Bootloader, value);
}

pub fn handle_suspend(value: Option<FirmwareFn>) {
    register(Hook::Suspend, value);
}

pub fn handle_shutdown(value: Option<FirmwareFn>) {
    register(Hook::Shutdown, value);
}

#[cfg(all(not(test), feature = "reset-on-panic", target_os = "none"))]
mod panic {
    #[panic_handler]
    fn panic(_info: &core::panic::PanicInfo) -> ! {
        super::reset();

        loop {}
    }
}

#[cfg(test)]
#[path = "firmware_functions_test.rs"]
pub(crate) mod test;
