extern crate std;

use embassy_futures::{block_on, select::select, yield_now};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use std::vec;

use crate::{key_reporter::HidInterface, key_reporter::Sink, usb_test_stub::MyEndpointIn};

use super::*;

type TestChannel = UsbChannel<NoopRawMutex, 4>;

#[test]
fn descriptors_have_each_report_id() {
    for desc in [&BOOT_REPORT_DESC[..], &NKRO_REPORT_DESC[..]] {
        for id in [1u8, 2, 3] {
            assert!(
                desc.windows(2).any(|w| w == [0x85, id]),
                "report id {id} missing"
            );
        }
        assert_eq!(desc.last(), Some(&0xC0));
    }
    assert_eq!(report_descriptor(true).len(), NKRO_REPORT_DESC.len());
}

#[test]
fn sink_prefixes_report_id() {
    let channel = TestChannel::new();
    let mut hid = HidInterface::new(
        false,
        Sink::Device(channel.sink(ReportKind::Keyboard)),
        Sink::Device(channel.sink(ReportKind::Consumer)),
        Sink::Device(channel.sink(ReportKind::Mouse)),
    );

    hid.press(&[4]);
    hid.consumer(0x00e2);
    hid.mouse_move(1, -1, 0);

    assert_eq!(
        channel.try_receive().as_deref(),
        Some(&[1, 0, 0, 4, 0, 0, 0, 0, 0][..])
    );
    assert_eq!(channel.try_receive().as_deref(), Some(&[3, 0xe2, 0][..]));
    assert_eq!(channel.try_receive().as_deref(), Some(&[2, 0, 1, 0xff, 0][..]));
    assert_eq!(channel.try_receive(), None);
}

#[test]
fn full_queue_keeps_newest_reports() {
    let channel = TestChannel::new();
    let mut sink = channel.sink(ReportKind::Consumer);
    for i in 0..6u8 {
        sink.send_report(&[i, 0]);
    }

    assert_eq!(channel.try_send(ReportKind::Consumer, &[9, 9]), Ok(()));
    for i in 3..6u8 {
        assert_eq!(channel.try_receive().as_deref(), Some(&[3, i, 0][..]));
    }
    assert_eq!(channel.try_receive().as_deref(), Some(&[3, 9, 9][..]));
    assert_eq!(channel.try_receive(), None);
}

#[test]
fn detached_host_sees_final_release() {
    let channel = UsbChannel::<NoopRawMutex, 2>::new();
    let mut hid = HidInterface::new(
        false,
        Sink::Device(channel.sink(ReportKind::Keyboard)),
        Sink::Device(channel.sink(ReportKind::Consumer)),
        Sink::Device(channel.sink(ReportKind::Mouse)),
    );

    // nothing drains while the host is away
    hid.press(&[4]);
    hid.press(&[5]);
    hid.release(&[5]);
    hid.release(&[4]);

    let mut last = None;
    while let Some(report) = channel.try_receive() {
        last = Some(report);
    }
    assert_eq!(last.as_deref(), Some(&[1, 0, 0, 0, 0, 0, 0, 0, 0][..]));
}

#[test]
fn writer_drains_the_queue() {
    let channel = TestChannel::new();
    let ep = MyEndpointIn::default();
    channel.try_send(ReportKind::Keyboard, &[0, 0, 5]).unwrap();
    channel.try_send(ReportKind::Mouse, &[1, 0, 0, 0]).unwrap();

    block_on(select(run_writer(&channel, ep.clone()), async {
        while ep.len() < 2 {
            yield_now().await;
        }
    }));

    assert_eq!(ep.take(), vec![vec![1, 0, 0, 5], vec![2, 1, 0, 0, 0]]);
}

#[test]
fn writer_waits_for_disabled_endpoint() {
    let channel = TestChannel::new();
    let ep = MyEndpointIn::default();
    ep.disabled_writes.set(1);
    channel.try_send(ReportKind::Consumer, &[1, 0]).unwrap();
    channel.try_send(ReportKind::Consumer, &[0, 0]).unwrap();

    block_on(select(run_writer(&channel, ep.clone()), async {
        while ep.is_empty() {
            yield_now().await;
        }
    }));

    assert_eq!(ep.ready_calls.get(), 1);
    assert_eq!(ep.take(), vec![vec![3, 0, 0]]);
}

#[test]
fn led_handler_stores_host_leds() {
    let channel = TestChannel::new();
    let sink = channel.sink(ReportKind::Keyboard);
    let mut handler = LedHandler::new(&channel);

    assert_eq!(
        handler.set_report(ReportId::Out(1), &[1, 0b011]),
        OutResponse::Accepted
    );
    assert_eq!(sink.led_status(), 0b011);

    assert_eq!(
        handler.set_report(ReportId::Out(1), &[0b100]),
        OutResponse::Accepted
    );
    assert_eq!(channel.leds(), 0b100);

    assert_eq!(
        handler.set_report(ReportId::Out(2), &[2, 1]),
        OutResponse::Rejected
    );
    assert_eq!(
        handler.set_report(ReportId::Feature(1), &[1, 1]),
        OutResponse::Rejected
    );
    assert_eq!(channel.leds(), 0b100);
}
