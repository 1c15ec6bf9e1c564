//! Setting ids for the boot-time configuration stream and their default values.

pub const NKRO: u16 = 0;
pub const RADIO_ENABLED: u16 = 1;
pub const TAP_THRESH: u16 = 2;
pub const TAP_DELAY: u16 = 3;
pub const VERBOSE: u16 = 4;
pub const ADVERTISE_TIMEOUT: u16 = 5;
pub const RECONNECT_WINDOW: u16 = 6;
pub const IDLE_TIMEOUT: u16 = 7;
pub const MOUSE_PROFILE: u16 = 8;

/// Milliseconds a dual-function key must be held before it resolves as hold.
pub const TAP_THRESH_DEFAULT: u16 = 170;
/// Milliseconds within which an interrupting key press still resolves a dual-function key as tap.
pub const TAP_DELAY_DEFAULT: u16 = 87;

/// Seconds.
pub const ADVERTISE_TIMEOUT_DEFAULT: u16 = 60;
pub const ADVERTISE_TIMEOUT_MIN: u16 = 10;
/// Seconds after losing a radio connection during which advertising restarts automatically.
pub const RECONNECT_WINDOW_DEFAULT: u16 = 180;
/// Seconds without key activity before requesting suspend.
pub const IDLE_TIMEOUT_DEFAULT: u16 = 600;

pub const MOUSE_PROFILE_DEFAULT: u16 = 1;

pub const RADIO_PROFILE_COUNT: u8 = 10;
pub const RADIO_NAME_PREFIX: &str = "DUOKEY";
