//! Mouse keys: buttons, accelerating movement and wheel.

use duokey_common::{
    action_code::MouseAction,
    mouse::{movement, MouseConfig, MOUSE_INTERVAL_MS},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum MouseEvent {
    Buttons(u8),
    Move { x: i8, y: i8, wheel: i8 },
}

#[derive(Default)]
pub(crate) struct Mouse {
    config: MouseConfig,
    buttons: u8,
    /// Sum of the directions of the held movement keys.
    dx: i8,
    dy: i8,
    wheel: i8,
    /// Held key counts; releases of keys held across a [Mouse::clear] find these at zero.
    moving: u8,
    wheeling: u8,
    speed: u8,
    wheel_ms: u64,
    last_flush: u64,
    next_flush: Option<u64>,
}

impl Mouse {
    pub(crate) fn new(config: MouseConfig) -> Self {
        Self {
            config,
            speed: config.base_speed,
            ..Default::default()
        }
    }

    pub(crate) fn next_flush(&self) -> Option<u64> {
        self.next_flush
    }

    pub(crate) fn action(
        &mut self,
        action: MouseAction,
        is_down: bool,
        now: u64,
    ) -> Option<MouseEvent> {
        match action {
            MouseAction::Buttons(mask) => {
                if is_down {
                    self.buttons |= mask;
                } else {
                    self.buttons &= !mask;
                }
                Some(MouseEvent::Buttons(self.buttons))
            }
            MouseAction::Move { dx, dy, speed } => {
                if is_down {
                    if self.moving == 0 {
                        self.speed = if speed == 0 {
                            self.config.base_speed
                        } else {
                            speed
                        };
                    }
                    self.moving += 1;
                    self.dx = self.dx.saturating_add(dx);
                    self.dy = self.dy.saturating_add(dy);
                    self.start(now)
                } else {
                    self.moving = self.moving.saturating_sub(1);
                    self.dx = self.dx.saturating_sub(dx);
                    self.dy = self.dy.saturating_sub(dy);
                    if self.moving == 0 {
                        self.dx = 0;
                        self.dy = 0;
                        self.speed = self.config.base_speed;
                    }
                    self.stop_if_idle();
                    None
                }
            }
            MouseAction::Wheel { dir, .. } => {
                if is_down {
                    self.wheeling += 1;
                    self.wheel = self.wheel.saturating_add(dir);
                    self.wheel_ms = 0;
                    self.start(now)
                } else {
                    if self.wheeling != 0 {
                        self.wheeling -= 1;
                        self.wheel = self.wheel.saturating_sub(dir);
                    }
                    if self.wheeling == 0 {
                        self.wheel = 0;
                    }
                    self.stop_if_idle();
                    None
                }
            }
            MouseAction::Accel(profile) => {
                if is_down {
                    self.config = MouseConfig::profile(profile);
                    if self.moving == 0 {
                        self.speed = self.config.base_speed;
                    }
                }
                None
            }
        }
    }

    fn start(&mut self, now: u64) -> Option<MouseEvent> {
        self.last_flush = now;
        self.next_flush = Some(now + MOUSE_INTERVAL_MS);
        self.report(MOUSE_INTERVAL_MS, self.wheel.signum())
    }

    fn stop_if_idle(&mut self) {
        if self.moving == 0 && self.wheel == 0 {
            self.next_flush = None;
        }
    }

    fn report(&self, elapsed: u64, wheel: i8) -> Option<MouseEvent> {
        let d = movement(self.speed, elapsed);
        let ev = MouseEvent::Move {
            x: self.dx.signum() * d,
            y: self.dy.signum() * d,
            wheel,
        };
        (ev != MouseEvent::Move {
            x: 0,
            y: 0,
            wheel: 0,
        })
        .then_some(ev)
    }

    /// Movement since the last flush; call when [Mouse::next_flush] is due.
    pub(crate) fn flush(&mut self, now: u64) -> Option<MouseEvent> {
        self.next_flush?;
        let elapsed = now.saturating_sub(self.last_flush);
        self.last_flush = now;
        self.next_flush = Some(now + MOUSE_INTERVAL_MS);
        if self.moving != 0 {
            self.speed = self.config.accelerate(self.speed);
        }

        let mut wheel = 0;
        if self.wheel != 0 {
            self.wheel_ms += elapsed * self.config.wheel_rate as u64;
            let clicks = (self.wheel_ms / 1000).min(i8::MAX as u64) as i8;
            self.wheel_ms %= 1000;
            wheel = self.wheel.signum() * clicks;
        }
        self.report(elapsed, wheel)
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new(self.config);
    }
}

#[cfg(test)]
#[path = "mouse_test.rs"]
mod test;
