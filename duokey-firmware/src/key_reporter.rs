//! HID report buffers for one transport interface.
//!
//! Every mutation is followed by sending the whole report, so the host always sees the current
//! state even if an earlier report was lost.

use duokey_common::keycodes::key_range::{is_modifier, MODIFIER_MIN};

use crate::{add_key_bit, del_key_bit, KEY_BITS_SIZE};

/// Something that can deliver a report to a host.
pub trait ReportSink {
    fn send_report(&mut self, report: &[u8]);

    /// Keyboard LED state last set by the host.
    fn led_status(&self) -> u8 {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportKind {
    Keyboard,
    Mouse,
    Consumer,
}
impl ReportKind {
    pub fn report_id(self) -> u8 {
        match self {
            ReportKind::Keyboard => 1,
            ReportKind::Mouse => 2,
            ReportKind::Consumer => 3,
        }
    }
}

/// A report destination; `Dummy` stands in for report types the transport cannot carry.
pub enum Sink<S> {
    Device(S),
    Dummy,
}
impl<S: ReportSink> Sink<S> {
    fn send(&mut self, report: &[u8]) {
        if let Sink::Device(s) = self {
            s.send_report(report);
        }
    }

    fn led_status(&self) -> u8 {
        match self {
            Sink::Device(s) => s.led_status(),
            Sink::Dummy => 0,
        }
    }
}

pub const BOOT_REPORT_SIZE: usize = 8;
pub const NKRO_REPORT_SIZE: usize = KEY_BITS_SIZE + 1;
pub const MOUSE_REPORT_SIZE: usize = 4;
pub const CONSUMER_REPORT_SIZE: usize = 2;

const BOOT_SLOTS: core::ops::Range<usize> = 2..BOOT_REPORT_SIZE;

/// Modifier byte followed by either 6 key slots (boot protocol) or a bitmap of every keycode.
pub struct KeyboardReport {
    nkro: bool,
    buf: [u8; NKRO_REPORT_SIZE],
}
impl KeyboardReport {
    pub fn new(nkro: bool) -> Self {
        Self {
            nkro,
            buf: [0; NKRO_REPORT_SIZE],
        }
    }

    /// Returns false if the key was already down or, in boot mode, all 6 slots are taken.
    pub fn add(&mut self, kc: u8) -> bool {
        if is_modifier(kc) {
            let bit = 1 << (kc - MODIFIER_MIN);
            let old = self.buf[0];
            self.buf[0] |= bit;
            return old & bit == 0;
        }
        if self.nkro {
            return add_key_bit(&mut self.buf[1..], kc);
        }
        let slots = &mut self.buf[BOOT_SLOTS];
        if slots.contains(&kc) {
            return false;
        }
        match slots.iter_mut().find(|s| **s == 0) {
            Some(slot) => {
                *slot = kc;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, kc: u8) -> bool {
        if is_modifier(kc) {
            let bit = 1 << (kc - MODIFIER_MIN);
            let old = self.buf[0];
            self.buf[0] &= !bit;
            return old & bit != 0;
        }
        if self.nkro {
            return del_key_bit(&mut self.buf[1..], kc);
        }
        match self.buf[BOOT_SLOTS].iter_mut().find(|s| **s == kc) {
            Some(slot) => {
                *slot = 0;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.buf.fill(0);
    }

    pub fn modifiers(&self) -> u8 {
        self.buf[0]
    }

    pub fn as_bytes(&self) -> &[u8] {
        if self.nkro {
            &self.buf
        } else {
            &self.buf[..BOOT_REPORT_SIZE]
        }
    }
}

/// The keyboard, consumer and mouse reports of one interface and where to send them.
pub struct HidInterface<S> {
    keyboard: KeyboardReport,
    consumer: u16,
    mouse_buttons: u8,
    keyboard_sink: Sink<S>,
    consumer_sink: Sink<S>,
    mouse_sink: Sink<S>,
}

impl<S: ReportSink> HidInterface<S> {
    pub fn new(nkro: bool, keyboard: Sink<S>, consumer: Sink<S>, mouse: Sink<S>) -> Self {
        Self {
            keyboard: KeyboardReport::new(nkro),
            consumer: 0,
            mouse_buttons: 0,
            keyboard_sink: keyboard,
            consumer_sink: consumer,
            mouse_sink: mouse,
        }
    }

    fn send_keyboard(&mut self) {
        self.keyboard_sink.send(self.keyboard.as_bytes());
    }

    fn send_consumer(&mut self) {
        self.consumer_sink.send(&self.consumer.to_le_bytes());
    }

    fn send_mouse(&mut self, x: i8, y: i8, wheel: i8) {
        self.mouse_sink
            .send(&[self.mouse_buttons, x as u8, y as u8, wheel as u8]);
    }

    pub fn press(&mut self, keycodes: &[u8]) {
        for kc in keycodes.iter().filter(|kc| **kc != 0) {
            self.keyboard.add(*kc);
        }
        self.send_keyboard();
    }

    pub fn release(&mut self, keycodes: &[u8]) {
        for kc in keycodes {
            self.keyboard.remove(*kc);
        }
        self.send_keyboard();
    }

    /// Set the consumer usage; zero releases it.
    pub fn consumer(&mut self, usage: u16) {
        self.consumer = usage;
        self.send_consumer();
    }

    pub fn mouse_buttons(&mut self, buttons: u8) {
        self.mouse_buttons = buttons;
        self.send_mouse(0, 0, 0);
    }

    pub fn mouse_move(&mut self, x: i8, y: i8, wheel: i8) {
        self.send_mouse(x, y, wheel);
    }

    /// Clear every report and tell the host.
    pub fn release_all(&mut self) {
        self.keyboard.clear();
        self.consumer = 0;
        self.mouse_buttons = 0;
        self.send_keyboard();
        self.send_consumer();
        self.send_mouse(0, 0, 0);
    }

    pub fn keyboard_report(&self) -> &KeyboardReport {
        &self.keyboard
    }

    pub fn led_status(&self) -> u8 {
        self.keyboard_sink.led_status()
    }
}

#[cfg(test)]
#[path = "key_reporter_test.rs"]
mod test;
