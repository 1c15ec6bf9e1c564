//! USB HID transport.
//!
//! The mapper side writes reports into a [UsbChannel] without waiting; [run_writer] drains it
//! into the interrupt IN endpoint and [run_led_reader] stores the host's keyboard LED state.
//! Descriptor and control-pipe handling is done by `embassy_usb::class::hid`.

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::{Channel, TrySendError},
};
use embassy_usb::{
    class::hid::{self, HidReader, HidReaderWriter, HidWriter, ReportId, RequestHandler, State},
    control::OutResponse,
    driver::{Driver, EndpointError},
    Builder,
};

use crate::{
    key_reporter::{ReportKind, ReportSink, NKRO_REPORT_SIZE},
    warn,
};

/// Largest report on the wire: report id followed by an N-key rollover keyboard report.
pub const USB_REPORT_MAX: usize = NKRO_REPORT_SIZE + 1;
/// Report id plus the LED byte.
pub const LED_REPORT_SIZE: usize = 2;

pub type UsbReport = heapless::Vec<u8, USB_REPORT_MAX>;

#[rustfmt::skip]
const BOOT_KEYBOARD_DESC: [u8; 66] = [
    0x05, 0x01,       // USAGE_PAGE (Generic Desktop)
    0x09, 0x06,       // USAGE (Keyboard)
    0xA1, 0x01,       // COLLECTION (Application)
    0x85, 0x01,       //   REPORT_ID (1)
    0x05, 0x07,       //   USAGE_PAGE (Keyboard)
    0x19, 0xE0,       //   USAGE_MINIMUM (Left Control)
    0x29, 0xE7,       //   USAGE_MAXIMUM (Right GUI)
    0x15, 0x00,       //   LOGICAL_MINIMUM (0)
    0x25, 0x01,       //   LOGICAL_MAXIMUM (1)
    0x75, 0x01,       //   REPORT_SIZE (1)
    0x95, 0x08,       //   REPORT_COUNT (8)
    0x81, 0x02,       //   INPUT (Data,Var,Abs) modifiers
    0x95, 0x01,       //   REPORT_COUNT (1)
    0x75, 0x08,       //   REPORT_SIZE (8)
    0x81, 0x01,       //   INPUT (Cnst) reserved
    0x05, 0x08,       //   USAGE_PAGE (LEDs)
    0x19, 0x01,       //   USAGE_MINIMUM (Num Lock)
    0x29, 0x05,       //   USAGE_MAXIMUM (Kana)
    0x95, 0x05,       //   REPORT_COUNT (5)
    0x75, 0x01,       //   REPORT_SIZE (1)
    0x91, 0x02,       //   OUTPUT (Data,Var,Abs)
    0x95, 0x01,       //   REPORT_COUNT (1)
    0x75, 0x03,       //   REPORT_SIZE (3)
    0x91, 0x01,       //   OUTPUT (Cnst) padding
    0x05, 0x07,       //   USAGE_PAGE (Keyboard)
    0x19, 0x00,       //   USAGE_MINIMUM (0)
    0x29, 0xFF,       //   USAGE_MAXIMUM (255)
    0x15, 0x00,       //   LOGICAL_MINIMUM (0)
    0x26, 0xFF, 0x00, //   LOGICAL_MAXIMUM (255)
    0x95, 0x06,       //   REPORT_COUNT (6)
    0x75, 0x08,       //   REPORT_SIZE (8)
    0x81, 0x00,       //   INPUT (Data,Ary,Abs) key slots
    0xC0,             // END_COLLECTION
];

#[rustfmt::skip]
const NKRO_KEYBOARD_DESC: [u8; 59] = [
    0x05, 0x01,       // USAGE_PAGE (Generic Desktop)
    0x09, 0x06,       // USAGE (Keyboard)
    0xA1, 0x01,       // COLLECTION (Application)
    0x85, 0x01,       //   REPORT_ID (1)
    0x05, 0x07,       //   USAGE_PAGE (Keyboard)
    0x19, 0xE0,       //   USAGE_MINIMUM (Left Control)
    0x29, 0xE7,       //   USAGE_MAXIMUM (Right GUI)
    0x15, 0x00,       //   LOGICAL_MINIMUM (0)
    0x25, 0x01,       //   LOGICAL_MAXIMUM (1)
    0x95, 0x08,       //   REPORT_COUNT (8)
    0x75, 0x01,       //   REPORT_SIZE (1)
    0x81, 0x02,       //   INPUT (Data,Var,Abs) modifiers
    0x05, 0x07,       //   USAGE_PAGE (Keyboard)
    0x19, 0x00,       //   USAGE_MINIMUM (0)
    0x29, 0xFE,       //   USAGE_MAXIMUM (254)
    0x15, 0x00,       //   LOGICAL_MINIMUM (0)
    0x25, 0x01,       //   LOGICAL_MAXIMUM (1)
    0x95, 0xFF,       //   REPORT_COUNT (255)
    0x75, 0x01,       //   REPORT_SIZE (1)
    0x81, 0x02,       //   INPUT (Data,Var,Abs) key bitmap
    0x05, 0x08,       //   USAGE_PAGE (LEDs)
    0x19, 0x01,       //   USAGE_MINIMUM (Num Lock)
    0x29, 0x05,       //   USAGE_MAXIMUM (Kana)
    0x95, 0x05,       //   REPORT_COUNT (5)
    0x75, 0x01,       //   REPORT_SIZE (1)
    0x91, 0x02,       //   OUTPUT (Data,Var,Abs)
    0x95, 0x01,       //   REPORT_COUNT (1)
    0x75, 0x03,       //   REPORT_SIZE (3)
    0x91, 0x01,       //   OUTPUT (Cnst) padding
    0xC0,             // END_COLLECTION
];

#[rustfmt::skip]
const MOUSE_DESC: [u8; 48] = [
    0x05, 0x01,       // USAGE_PAGE (Generic Desktop)
    0x09, 0x02,       // USAGE (Mouse)
    0xA1, 0x01,       // COLLECTION (Application)
    0x85, 0x02,       //   REPORT_ID (2)
    0x09, 0x01,       //   USAGE (Pointer)
    0xA1, 0x00,       //   COLLECTION (Physical)
    0x05, 0x09,       //     USAGE_PAGE (Button)
    0x19, 0x01,       //     USAGE_MINIMUM (1)
    0x29, 0x08,       //     USAGE_MAXIMUM (8)
    0x15, 0x00,       //     LOGICAL_MINIMUM (0)
    0x25, 0x01,       //     LOGICAL_MAXIMUM (1)
    0x95, 0x08,       //     REPORT_COUNT (8)
    0x75, 0x01,       //     REPORT_SIZE (1)
    0x81, 0x02,       //     INPUT (Data,Var,Abs) buttons
    0x05, 0x01,       //     USAGE_PAGE (Generic Desktop)
    0x09, 0x30,       //     USAGE (X)
    0x09, 0x31,       //     USAGE (Y)
    0x09, 0x38,       //     USAGE (Wheel)
    0x15, 0x81,       //     LOGICAL_MINIMUM (-127)
    0x25, 0x7F,       //     LOGICAL_MAXIMUM (127)
    0x95, 0x03,       //     REPORT_COUNT (3)
    0x75, 0x08,       //     REPORT_SIZE (8)
    0x81, 0x06,       //     INPUT (Data,Var,Rel)
    0xC0,             //   END_COLLECTION
    0xC0,             // END_COLLECTION
];

#[rustfmt::skip]
const CONSUMER_DESC: [u8; 25] = [
    0x05, 0x0C,       // USAGE_PAGE (Consumer)
    0x09, 0x01,       // USAGE (Consumer Control)
    0xA1, 0x01,       // COLLECTION (Application)
    0x85, 0x03,       //   REPORT_ID (3)
    0x19, 0x01,       //   USAGE_MINIMUM (1)
    0x2A, 0xA0, 0x02, //   USAGE_MAXIMUM (0x2A0)
    0x15, 0x01,       //   LOGICAL_MINIMUM (1)
    0x26, 0xA0, 0x02, //   LOGICAL_MAXIMUM (0x2A0)
    0x95, 0x01,       //   REPORT_COUNT (1)
    0x75, 0x10,       //   REPORT_SIZE (16)
    0x81, 0x00,       //   INPUT (Data,Ary,Abs)
    0xC0,             // END_COLLECTION
];

const fn join<const N: usize>(parts: [&[u8]; 3]) -> [u8; N] {
    let mut out = [0; N];
    let mut n = 0;
    let mut p = 0;
    while p < parts.len() {
        let mut i = 0;
        while i < parts[p].len() {
            out[n] = parts[p][i];
            n += 1;
            i += 1;
        }
        p += 1;
    }
    assert!(n == N);
    out
}

const BOOT_DESC_LEN: usize = BOOT_KEYBOARD_DESC.len() + MOUSE_DESC.len() + CONSUMER_DESC.len();
const NKRO_DESC_LEN: usize = NKRO_KEYBOARD_DESC.len() + MOUSE_DESC.len() + CONSUMER_DESC.len();

pub const BOOT_REPORT_DESC: [u8; BOOT_DESC_LEN] =
    join([&BOOT_KEYBOARD_DESC, &MOUSE_DESC, &CONSUMER_DESC]);

pub const NKRO_REPORT_DESC: [u8; NKRO_DESC_LEN] =
    join([&NKRO_KEYBOARD_DESC, &MOUSE_DESC, &CONSUMER_DESC]);

pub fn report_descriptor(nkro: bool) -> &'static [u8] {
    if nkro {
        &NKRO_REPORT_DESC
    } else {
        &BOOT_REPORT_DESC
    }
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UsbSendError;

/// Reports waiting for the USB writer, plus the LED state last set by the host.
pub struct UsbChannel<M: RawMutex, const N: usize> {
    reports: Channel<M, UsbReport, N>,
    leds: AtomicU8,
}

impl<M: RawMutex, const N: usize> Default for UsbChannel<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> UsbChannel<M, N> {
    pub const fn new() -> Self {
        Self {
            reports: Channel::new(),
            leds: AtomicU8::new(0),
        }
    }

    pub fn sink(&self, kind: ReportKind) -> UsbSink<'_, M, N> {
        UsbSink {
            channel: self,
            kind,
        }
    }

    /// Queue `report` behind its report id. A full queue drops its oldest report so the host
    /// always ends up with the latest state.
    pub fn try_send(&self, kind: ReportKind, report: &[u8]) -> Result<(), UsbSendError> {
        let mut msg = UsbReport::new();
        msg.push(kind.report_id()).map_err(|_| UsbSendError)?;
        msg.extend_from_slice(report).map_err(|_| UsbSendError)?;
        match self.reports.try_send(msg) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(msg)) => {
                if let Ok(old) = self.reports.try_receive() {
                    warn!("USB queue full; dropped oldest report {:?}", old.first());
                }
                self.reports.try_send(msg).map_err(|_| UsbSendError)
            }
        }
    }

    pub async fn receive(&self) -> UsbReport {
        self.reports.receive().await
    }

    pub fn try_receive(&self) -> Option<UsbReport> {
        self.reports.try_receive().ok()
    }

    pub fn leds(&self) -> u8 {
        self.leds.load(Ordering::Relaxed)
    }

    pub fn set_leds(&self, leds: u8) {
        self.leds.store(leds, Ordering::Relaxed);
    }
}

/// One report type of the USB interface.
pub struct UsbSink<'c, M: RawMutex, const N: usize> {
    channel: &'c UsbChannel<M, N>,
    kind: ReportKind,
}

impl<M: RawMutex, const N: usize> ReportSink for UsbSink<'_, M, N> {
    fn send_report(&mut self, report: &[u8]) {
        if self.channel.try_send(self.kind, report).is_err() {
            warn!("{:?} report not queued", self.kind);
        }
    }

    fn led_status(&self) -> u8 {
        self.channel.leds()
    }
}

/// Where [run_writer] sends reports.
#[allow(async_fn_in_trait)]
pub trait ReportEndpoint {
    async fn write(&mut self, report: &[u8]) -> Result<(), EndpointError>;
    /// Wait until the host has configured the endpoint.
    async fn ready(&mut self);
}

impl<'d, D: Driver<'d>, const N: usize> ReportEndpoint for HidWriter<'d, D, N> {
    async fn write(&mut self, report: &[u8]) -> Result<(), EndpointError> {
        HidWriter::write(self, report).await
    }

    async fn ready(&mut self) {
        HidWriter::ready(self).await
    }
}

pub async fn run_writer<M: RawMutex, const N: usize>(
    channel: &UsbChannel<M, N>,
    mut endpoint: impl ReportEndpoint,
) -> ! {
    loop {
        let report = channel.receive().await;
        match endpoint.write(&report).await {
            Ok(()) => {}
            Err(EndpointError::Disabled) => {
                warn!("USB endpoint disabled; report dropped");
                endpoint.ready().await;
            }
            Err(err) => warn!("USB write failed {:?}", err),
        }
    }
}

/// Stores the keyboard LED output report.
pub struct LedHandler<'c> {
    leds: &'c AtomicU8,
}

impl<'c> LedHandler<'c> {
    pub fn new<M: RawMutex, const N: usize>(channel: &'c UsbChannel<M, N>) -> Self {
        Self {
            leds: &channel.leds,
        }
    }
}

impl RequestHandler for LedHandler<'_> {
    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        let leds = match (id, data) {
            // over the interrupt pipe the report id is still in front
            (ReportId::Out(1), [1, leds]) | (ReportId::Out(1), [leds]) => *leds,
            _ => return OutResponse::Rejected,
        };
        self.leds.store(leds, Ordering::Relaxed);
        OutResponse::Accepted
    }
}

pub async fn run_led_reader<'d, D: Driver<'d>, M: RawMutex, const N: usize>(
    reader: HidReader<'d, D, LED_REPORT_SIZE>,
    channel: &UsbChannel<M, N>,
) -> ! {
    reader.run(true, &mut LedHandler::new(channel)).await
}

/// Add the keyboard/mouse/consumer HID interface to `builder`.
pub fn add_hid_interface<'d, D: Driver<'d>>(
    builder: &mut Builder<'d, D>,
    state: &'d mut State<'d>,
    control_handler: &'d mut LedHandler<'d>,
    nkro: bool,
) -> (
    HidReader<'d, D, LED_REPORT_SIZE>,
    HidWriter<'d, D, USB_REPORT_MAX>,
) {
    let config = hid::Config {
        report_descriptor: report_descriptor(nkro),
        request_handler: Some(control_handler as &mut dyn RequestHandler),
        poll_ms: 1,
        max_packet_size: 64,
    };
    HidReaderWriter::<_, LED_REPORT_SIZE, USB_REPORT_MAX>::new(builder, state, config).split()
}

#[cfg(test)]
#[path = "usb_test.rs"]
mod test;
