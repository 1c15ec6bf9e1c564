//! Recording report sinks and a scripted radio link for host tests.

extern crate std;

use core::cell::{Cell, RefCell};
use std::{rc::Rc, vec::Vec};

use crate::{
    key_reporter::{HidInterface, ReportKind, ReportSink, Sink, BOOT_REPORT_SIZE},
    transport::radio::{RadioError, RadioLink},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub interface: &'static str,
    pub kind: ReportKind,
    pub data: Vec<u8>,
}
impl Report {
    /// Non-zero key slots of a boot keyboard report.
    pub fn keys(&self) -> Vec<u8> {
        assert_eq!(self.kind, ReportKind::Keyboard);
        assert_eq!(self.data.len(), BOOT_REPORT_SIZE);
        self.data[2..].iter().copied().filter(|k| *k != 0).collect()
    }

    pub fn modifiers(&self) -> u8 {
        assert_eq!(self.kind, ReportKind::Keyboard);
        self.data[0]
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }
}

/// Every report sent through any sink sharing this log, in order.
#[derive(Clone, Default)]
pub struct ReportLog(Rc<RefCell<Vec<Report>>>);
impl ReportLog {
    pub fn take(&self) -> Vec<Report> {
        self.0.take()
    }

    pub fn take_keyboard(&self) -> Vec<Report> {
        self.take()
            .into_iter()
            .filter(|r| r.kind == ReportKind::Keyboard)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sink(&self, interface: &'static str, kind: ReportKind) -> RecordingSink {
        RecordingSink {
            log: self.clone(),
            interface,
            kind,
            leds: Rc::default(),
        }
    }

    pub fn hid(&self, interface: &'static str, nkro: bool) -> HidInterface<RecordingSink> {
        HidInterface::new(
            nkro,
            Sink::Device(self.sink(interface, ReportKind::Keyboard)),
            Sink::Device(self.sink(interface, ReportKind::Consumer)),
            Sink::Device(self.sink(interface, ReportKind::Mouse)),
        )
    }
}

pub struct RecordingSink {
    log: ReportLog,
    interface: &'static str,
    kind: ReportKind,
    pub leds: Rc<Cell<u8>>,
}
impl ReportSink for RecordingSink {
    fn send_report(&mut self, report: &[u8]) {
        self.log.0.borrow_mut().push(Report {
            interface: self.interface,
            kind: self.kind,
            data: Vec::from(report),
        });
    }

    fn led_status(&self) -> u8 {
        self.leds.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RadioCall {
    StartAdvertising,
    StopAdvertising,
    DisconnectAll,
    SetAddress([u8; 6]),
    SetName(std::string::String),
    SetBatteryLevel(u8),
}

#[derive(Default)]
pub struct RadioScript {
    pub connected: bool,
    pub calls: Vec<RadioCall>,
    /// Calls matching these fail with [RadioError::Busy].
    pub failing: Vec<fn(&RadioCall) -> bool>,
    /// When set, each call is also recorded with the number of reports logged before it.
    pub trace: Option<(ReportLog, Vec<(RadioCall, usize)>)>,
}

#[derive(Clone, Default)]
pub struct TestRadio(pub Rc<RefCell<RadioScript>>);
impl TestRadio {
    pub fn set_connected(&self, connected: bool) {
        self.0.borrow_mut().connected = connected;
    }

    pub fn take_calls(&self) -> Vec<RadioCall> {
        core::mem::take(&mut self.0.borrow_mut().calls)
    }

    pub fn fail_when(&self, f: fn(&RadioCall) -> bool) {
        self.0.borrow_mut().failing.push(f);
    }

    pub fn trace_reports(&self, log: &ReportLog) {
        self.0.borrow_mut().trace = Some((log.clone(), Vec::new()));
    }

    pub fn take_trace(&self) -> Vec<(RadioCall, usize)> {
        match &mut self.0.borrow_mut().trace {
            Some((_, calls)) => core::mem::take(calls),
            None => Vec::new(),
        }
    }

    fn call(&mut self, call: RadioCall) -> Result<(), RadioError> {
        let mut script = self.0.borrow_mut();
        let fail = script.failing.iter().any(|f| f(&call));
        if let Some((log, calls)) = &mut script.trace {
            calls.push((call.clone(), log.len()));
        }
        script.calls.push(call);
        if fail {
            Err(RadioError::Busy)
        } else {
            Ok(())
        }
    }
}
impl RadioLink for TestRadio {
    type Sink = RecordingSink;

    fn is_connected(&self) -> bool {
        self.0.borrow().connected
    }

    fn start_advertising(&mut self) -> Result<(), RadioError> {
        self.call(RadioCall::StartAdvertising)
    }

    fn stop_advertising(&mut self) -> Result<(), RadioError> {
        self.call(RadioCall::StopAdvertising)
    }

    fn disconnect_all(&mut self) -> Result<(), RadioError> {
        self.call(RadioCall::DisconnectAll)?;
        self.0.borrow_mut().connected = false;
        Ok(())
    }

    fn set_address(&mut self, address: [u8; 6]) -> Result<(), RadioError> {
        self.call(RadioCall::SetAddress(address))
    }

    fn set_name(&mut self, name: &str) -> Result<(), RadioError> {
        self.call(RadioCall::SetName(name.into()))
    }

    fn set_battery_level(&mut self, level: u8) -> Result<(), RadioError> {
        self.call(RadioCall::SetBatteryLevel(level))
    }
}
