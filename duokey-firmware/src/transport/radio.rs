//! Radio (BLE) link state and profile identities.
//!
//! Every link operation can fail through a race with the radio stack, such as disconnecting a
//! peer that already left. Failures are logged and the operation abandoned; they never reach the
//! core loop.

use core::fmt::Write;

use duokey_common::globals::RADIO_PROFILE_COUNT;
use heapless::String;

use crate::{
    info,
    key_reporter::{HidInterface, ReportSink},
    warn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    Busy,
    NotConnected,
    InvalidState,
    Driver,
}

/// The radio stack as seen by the transport manager.
pub trait RadioLink {
    type Sink: ReportSink;

    fn is_connected(&self) -> bool;
    fn start_advertising(&mut self) -> Result<(), RadioError>;
    fn stop_advertising(&mut self) -> Result<(), RadioError>;
    fn disconnect_all(&mut self) -> Result<(), RadioError>;
    /// Set the static random link-layer address.
    fn set_address(&mut self, address: [u8; 6]) -> Result<(), RadioError>;
    fn set_name(&mut self, name: &str) -> Result<(), RadioError>;
    fn set_battery_level(&mut self, level: u8) -> Result<(), RadioError>;
}

pub type RadioName = String<24>;

/// The link-layer address for `profile`, a pure function of the device id and profile.
///
/// Little endian; the top two bits of the last byte mark a static random address.
pub fn profile_address(device_id: &[u8; 8], profile: u8) -> [u8; 6] {
    let mut addr = [0u8; 6];
    for (i, b) in device_id.iter().enumerate() {
        addr[i % 6] ^= b.rotate_left((i / 6) as u32);
    }
    addr[0] = addr[0].wrapping_add(profile);
    addr[5] |= 0xc0;
    addr
}

pub fn profile_name(prefix: &str, profile: u8) -> RadioName {
    let mut name = RadioName::new();
    if write!(name, "{} {}", prefix, profile).is_err() {
        // prefix too long
        name.clear();
        let _ = write!(name, "{}", profile);
    }
    name
}

fn soft(what: &str, result: Result<(), RadioError>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            warn!("radio {} failed: {:?}", what, err);
            false
        }
    }
}

/// A radio link with its own report buffers and connection state.
pub struct Radio<R: RadioLink> {
    link: R,
    pub(super) hid: HidInterface<R::Sink>,
    connected: bool,
    advertising: bool,
    advertise_deadline: u64,
    profile: u8,
    /// Last time the link was seen connected, or a user asked for the radio.
    last_connected: Option<u64>,
}

impl<R: RadioLink> Radio<R> {
    pub fn new(link: R, hid: HidInterface<R::Sink>) -> Self {
        Self {
            connected: link.is_connected(),
            link,
            hid,
            advertising: false,
            advertise_deadline: 0,
            profile: 0,
            last_connected: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_advertising(&self) -> bool {
        self.advertising
    }

    pub fn profile(&self) -> u8 {
        self.profile
    }

    pub(super) fn start_advertising(&mut self, now: u64, timeout_ms: u64) {
        if soft("start advertising", self.link.start_advertising()) {
            info!("radio advertising profile {}", self.profile);
            self.advertising = true;
            self.advertise_deadline = now + timeout_ms;
        }
    }

    pub(super) fn stop_advertising(&mut self) {
        soft("stop advertising", self.link.stop_advertising());
        // treat a failed stop as stopped
        self.advertising = false;
    }

    pub(super) fn disconnect_all(&mut self) {
        if soft("disconnect", self.link.disconnect_all()) {
            self.connected = false;
        }
    }

    /// Give the link the address and name of `profile`. The profile only changes if the address
    /// was accepted.
    pub(super) fn apply_profile(&mut self, device_id: &[u8; 8], prefix: &str, profile: u8) -> bool {
        let profile = profile % RADIO_PROFILE_COUNT;
        if !soft(
            "set address",
            self.link.set_address(profile_address(device_id, profile)),
        ) {
            return false;
        }
        soft(
            "set name",
            self.link.set_name(profile_name(prefix, profile).as_str()),
        );
        self.profile = profile;
        true
    }

    pub(super) fn set_battery_level(&mut self, level: u8) {
        soft("battery level", self.link.set_battery_level(level));
    }

    /// Re-read the connection flag. Returns true when the link just connected.
    pub(super) fn refresh(&mut self, now: u64) -> bool {
        let was = self.connected;
        self.connected = self.link.is_connected();
        if self.connected {
            self.last_connected = Some(now);
            // the stack stops advertising once a peer connects
            self.advertising = false;
        } else if was {
            info!("radio disconnected");
        }
        self.connected && !was
    }

    pub(super) fn advertise_expired(&self, now: u64) -> bool {
        self.advertising && now >= self.advertise_deadline
    }

    /// Whether a lost connection is recent enough to keep advertising for it.
    pub(super) fn still_trying(&self, now: u64, window_ms: u64) -> bool {
        matches!(self.last_connected, Some(t) if now.saturating_sub(t) < window_ms)
    }

    pub(super) fn rearm(&mut self, now: u64) {
        self.last_connected = Some(now);
    }

    pub fn link(&self) -> &R {
        &self.link
    }
}

#[cfg(test)]
#[path = "radio_test.rs"]
mod test;
