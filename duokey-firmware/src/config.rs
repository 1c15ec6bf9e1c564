//! Boot-time configuration. Read once at startup and never changed afterwards.

use duokey_common::{globals, mouse::MouseConfig};

use crate::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// N-key rollover keyboard report instead of the 6 key boot report.
    pub nkro: bool,
    pub radio_enabled: bool,
    pub tap_thresh_ms: u16,
    pub tap_delay_ms: u16,
    /// Log every key event at debug level.
    pub verbose: bool,
    pub advertise_timeout_secs: u16,
    pub reconnect_window_secs: u16,
    pub idle_timeout_secs: u16,
    pub mouse_profile: u8,
    /// The advertised radio name is this followed by the profile number.
    pub radio_name_prefix: &'static str,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nkro: false,
            radio_enabled: true,
            tap_thresh_ms: globals::TAP_THRESH_DEFAULT,
            tap_delay_ms: globals::TAP_DELAY_DEFAULT,
            verbose: false,
            advertise_timeout_secs: globals::ADVERTISE_TIMEOUT_DEFAULT,
            reconnect_window_secs: globals::RECONNECT_WINDOW_DEFAULT,
            idle_timeout_secs: globals::IDLE_TIMEOUT_DEFAULT,
            mouse_profile: globals::MOUSE_PROFILE_DEFAULT as u8,
            radio_name_prefix: globals::RADIO_NAME_PREFIX,
        }
    }
}

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    Corrupt,
    UnknownSetting(u16),
}

impl Config {
    /// Load settings from a word stream: the number of words that follow, then `(id, value)`
    /// pairs using the ids in [globals]. Missing settings keep their defaults.
    pub fn load(iter: impl IntoIterator<Item = u16>) -> Result<Self, ConfigError> {
        let mut iter = iter.into_iter();
        let mut config = Self::default();

        let mut count = iter.next().ok_or(ConfigError::Corrupt)?;
        while count != 0 {
            if count < 2 {
                warn!("corrupt config: odd word count");
                return Err(ConfigError::Corrupt);
            }
            count -= 2;
            let id = iter.next().ok_or(ConfigError::Corrupt)?;
            let value = iter.next().ok_or(ConfigError::Corrupt)?;
            match id {
                globals::NKRO => config.nkro = value != 0,
                globals::RADIO_ENABLED => config.radio_enabled = value != 0,
                globals::TAP_THRESH => config.tap_thresh_ms = value,
                globals::TAP_DELAY => config.tap_delay_ms = value,
                globals::VERBOSE => config.verbose = value != 0,
                globals::ADVERTISE_TIMEOUT => config.advertise_timeout_secs = value,
                globals::RECONNECT_WINDOW => config.reconnect_window_secs = value,
                globals::IDLE_TIMEOUT => config.idle_timeout_secs = value,
                globals::MOUSE_PROFILE => config.mouse_profile = value.min(2) as u8,
                _ => {
                    warn!("unknown config setting {}", id);
                    return Err(ConfigError::UnknownSetting(id));
                }
            }
        }

        Ok(config.sanitized())
    }

    /// Apply the lower bounds the rest of the firmware relies on.
    pub fn sanitized(mut self) -> Self {
        self.advertise_timeout_secs = self
            .advertise_timeout_secs
            .max(globals::ADVERTISE_TIMEOUT_MIN);
        self.tap_delay_ms = self.tap_delay_ms.min(self.tap_thresh_ms);
        self
    }

    pub fn mouse(&self) -> MouseConfig {
        MouseConfig::profile(self.mouse_profile)
    }

    pub fn advertise_timeout_ms(&self) -> u64 {
        self.advertise_timeout_secs as u64 * 1000
    }

    pub fn reconnect_window_ms(&self) -> u64 {
        self.reconnect_window_secs as u64 * 1000
    }

    pub fn idle_timeout_ms(&self) -> u64 {
        self.idle_timeout_secs as u64 * 1000
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod test;
