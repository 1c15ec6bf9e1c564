//! Chooses between the USB and radio interfaces and routes reports to the current one.
//!
//! USB is always present, even when no cable is attached, so there is always somewhere to send
//! reports. Switching interface releases everything on the old one first so the old host is not
//! left with stuck keys.

use duokey_common::globals::RADIO_PROFILE_COUNT;
use radio::{Radio, RadioLink};

use crate::{
    config::Config,
    info,
    key_reporter::{HidInterface, ReportSink},
    warn,
};

pub mod radio;

/// Run `$e` with `$hid` bound to the current interface's reports.
macro_rules! on_current {
    ($self:ident, $hid:ident => $e:expr) => {
        match ($self.current, $self.radio.as_mut()) {
            (Interface::Radio, Some(r)) => {
                let $hid = &mut r.hid;
                $e
            }
            _ => {
                let $hid = &mut $self.usb;
                $e
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interface {
    Usb,
    Radio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    pub interface: Interface,
    pub usb_connected: bool,
    pub radio_connected: bool,
    pub radio_advertising: bool,
    pub radio_profile: u8,
    /// Keyboard LEDs (caps lock etc.) as set by the host of the current interface.
    pub leds: u8,
}

/// Keyboard level press and release, used by macros.
pub trait KeyReporter {
    fn press(&mut self, keycodes: &[u8]);
    fn release(&mut self, keycodes: &[u8]);
    fn release_all(&mut self);
}

pub struct TransportManager<U: ReportSink, R: RadioLink> {
    config: Config,
    device_id: [u8; 8],
    usb: HidInterface<U>,
    radio: Option<Radio<R>>,
    current: Interface,
    usb_connected: bool,
}

impl<U: ReportSink, R: RadioLink> TransportManager<U, R> {
    /// Pick the starting interface: connected USB, else the radio, else USB anyway.
    pub fn new(
        config: Config,
        usb: HidInterface<U>,
        radio: Option<Radio<R>>,
        device_id: [u8; 8],
        usb_connected: bool,
        now: u64,
    ) -> Self {
        let radio = if config.radio_enabled { radio } else { None };
        let mut tm = Self {
            config,
            device_id,
            usb,
            radio,
            current: Interface::Usb,
            usb_connected,
        };
        if let Some(radio) = tm.radio.as_mut() {
            radio.apply_profile(&device_id, config.radio_name_prefix, 0);
        }

        if usb_connected {
            info!("start on USB");
        } else if tm.radio.is_some() {
            info!("start on radio");
            tm.switch_to_radio(now);
        } else {
            info!("start on USB; no cable or radio");
        }
        tm
    }

    pub fn current(&self) -> Interface {
        self.current
    }

    pub fn has_radio(&self) -> bool {
        self.radio.is_some()
    }

    pub fn radio(&self) -> Option<&Radio<R>> {
        self.radio.as_ref()
    }

    fn release_current(&mut self) {
        on_current!(self, hid => hid.release_all())
    }

    pub fn switch_to_usb(&mut self) {
        info!("switch to USB");
        self.release_current();
        self.current = Interface::Usb;
    }

    /// Make the radio current and advertise unless already connected.
    pub fn switch_to_radio(&mut self, now: u64) {
        if self.radio.is_none() {
            warn!("no radio to switch to");
            return;
        }
        self.release_current();
        self.enter_radio(now);
    }

    /// Advertising that is already running restarts, so its timeout counts from `now`.
    fn enter_radio(&mut self, now: u64) {
        self.current = Interface::Radio;
        let timeout = self.config.advertise_timeout_ms();
        if let Some(radio) = self.radio.as_mut() {
            info!("switch to radio profile {}", radio.profile());
            radio.rearm(now);
            if !radio.is_connected() {
                if radio.is_advertising() {
                    radio.stop_advertising();
                }
                radio.start_advertising(now, timeout);
            }
        }
    }

    /// Select radio profile `n` (mod 10). A new profile drops current peers and advertises under
    /// that profile's address and name.
    pub fn switch_to_profile(&mut self, n: u8, now: u64) {
        let n = n % RADIO_PROFILE_COUNT;
        if self.radio.is_none() {
            warn!("no radio for profile {}", n);
            return;
        }
        // release while the old peers are still connected
        self.release_current();
        if let Some(radio) = self.radio.as_mut() {
            if radio.profile() != n {
                info!("radio profile {} -> {}", radio.profile(), n);
                radio.stop_advertising();
                radio.disconnect_all();
                radio.apply_profile(&self.device_id, self.config.radio_name_prefix, n);
            }
        }
        self.enter_radio(now);
    }

    pub fn toggle_usb(&mut self, now: u64) {
        match self.current {
            Interface::Usb if self.radio.is_some() => self.switch_to_radio(now),
            Interface::Usb => {}
            Interface::Radio => self.switch_to_usb(),
        }
    }

    /// Disconnect if connected, else stop advertising if advertising, else switch to the radio.
    pub fn toggle_radio(&mut self, now: u64) {
        let Some(radio) = self.radio.as_mut() else {
            warn!("no radio to toggle");
            return;
        };
        if radio.is_connected() {
            radio.disconnect_all();
        } else if radio.is_advertising() {
            radio.stop_advertising();
        } else {
            self.switch_to_radio(now);
        }
    }

    /// Liveness check, called about once a second.
    pub fn check(&mut self, now: u64, usb_connected: bool) {
        let usb_attached = usb_connected && !self.usb_connected;
        self.usb_connected = usb_connected;

        let window = self.config.reconnect_window_ms();
        let timeout = self.config.advertise_timeout_ms();
        let current = self.current;
        if let Some(radio) = self.radio.as_mut() {
            if radio.refresh(now) {
                info!("radio connected on profile {}", radio.profile());
            }
            if radio.advertise_expired(now) {
                info!("radio advertising timed out");
                radio.stop_advertising();
            }
            if current == Interface::Radio
                && !radio.is_connected()
                && !radio.is_advertising()
                && radio.still_trying(now, window)
            {
                radio.start_advertising(now, timeout);
            }
        }

        if usb_attached {
            info!("USB attached");
            if self.current == Interface::Usb {
                // the new host starts from an all-released state
                self.usb.release_all();
            } else {
                self.switch_to_usb();
            }
        }
    }

    pub fn set_battery_level(&mut self, level: u8) {
        let level = level.min(100);
        if let Some(radio) = self.radio.as_mut() {
            radio.set_battery_level(level);
        }
    }

    pub fn status(&self) -> Status {
        let radio = self.radio.as_ref();
        Status {
            interface: self.current,
            usb_connected: self.usb_connected,
            radio_connected: radio.is_some_and(|r| r.is_connected()),
            radio_advertising: radio.is_some_and(|r| r.is_advertising()),
            radio_profile: radio.map_or(0, |r| r.profile()),
            leds: match (self.current, radio) {
                (Interface::Radio, Some(r)) => r.hid.led_status(),
                _ => self.usb.led_status(),
            },
        }
    }

    pub fn consumer(&mut self, usage: u16) {
        on_current!(self, hid => hid.consumer(usage))
    }

    pub fn mouse_buttons(&mut self, buttons: u8) {
        on_current!(self, hid => hid.mouse_buttons(buttons))
    }

    pub fn mouse_move(&mut self, x: i8, y: i8, wheel: i8) {
        on_current!(self, hid => hid.mouse_move(x, y, wheel))
    }
}

impl<U: ReportSink, R: RadioLink> KeyReporter for TransportManager<U, R> {
    fn press(&mut self, keycodes: &[u8]) {
        on_current!(self, hid => hid.press(keycodes))
    }

    fn release(&mut self, keycodes: &[u8]) {
        on_current!(self, hid => hid.release(keycodes))
    }

    fn release_all(&mut self) {
        self.release_current();
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod test;
