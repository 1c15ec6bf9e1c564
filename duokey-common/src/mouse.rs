//! Mouse key acceleration profiles.
//!
//! Speeds are in counts per [MOUSE_INTERVAL_MS]. While a movement key is held the speed grows by
//! `accel_step` each report until `max_speed`.

/// Milliseconds between mouse reports while a mouse key is held.
pub const MOUSE_INTERVAL_MS: u64 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseConfig {
    pub base_speed: u8,
    pub accel_step: u8,
    pub max_speed: u8,
    /// Wheel clicks per second.
    pub wheel_rate: u8,
}
impl Default for MouseConfig {
    fn default() -> Self {
        MouseConfig::normal()
    }
}
impl MouseConfig {
    pub const fn slow() -> Self {
        Self {
            base_speed: 1,
            accel_step: 1,
            max_speed: 10,
            wheel_rate: 5,
        }
    }
    pub const fn normal() -> Self {
        Self {
            base_speed: 2,
            accel_step: 1,
            max_speed: 20,
            wheel_rate: 10,
        }
    }
    pub const fn fast() -> Self {
        Self {
            base_speed: 4,
            accel_step: 2,
            max_speed: 40,
            wheel_rate: 20,
        }
    }

    /// Profile 0 is slow, 1 normal and anything higher fast.
    pub const fn profile(i: u8) -> Self {
        match i {
            0 => Self::slow(),
            1 => Self::normal(),
            _ => Self::fast(),
        }
    }

    pub fn accelerate(&self, speed: u8) -> u8 {
        speed.saturating_add(self.accel_step).min(self.max_speed)
    }
}

/// Distance covered at `speed` over `elapsed_ms`, clamped to what fits in a report.
pub fn movement(speed: u8, elapsed_ms: u64) -> i8 {
    let d = speed as u64 * elapsed_ms / MOUSE_INTERVAL_MS;
    d.min(i8::MAX as u64) as i8
}

#[cfg(test)]
#[path = "mouse_test.rs"]
mod test;
