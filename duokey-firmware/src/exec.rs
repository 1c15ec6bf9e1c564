//! The core loop: feeds scanned keys to the [Mapper] and drives its timers.

use embassy_futures::select::{select3, Either3};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Duration, Instant, Ticker, Timer};

use crate::{
    debug,
    key_event::ScanChannel,
    key_reporter::ReportSink,
    mapper::Mapper,
    transport::radio::RadioLink,
};

// Seconds between battery reads
const BATTERY_INTERVAL: u32 = 300;

/// Hardware the core loop polls.
pub trait Board {
    /// True while a USB host has the device configured.
    fn usb_connected(&self) -> bool;

    fn backlight(&mut self, _code: u16) {}

    /// Battery charge in percent, if the board can measure it.
    fn battery_level(&mut self) -> Option<u8> {
        None
    }
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Run forever: each batch of scanned keys is processed as it arrives, tap-hold and mouse
/// deadlines are honoured and transport/idle housekeeping runs once a second.
pub async fn run<
    U: ReportSink,
    R: RadioLink,
    M: RawMutex,
    B: Board,
    const KEYS: usize,
    const LAYERS: usize,
    const N: usize,
>(
    mapper: &mut Mapper<'_, U, R, KEYS, LAYERS>,
    channel: &ScanChannel<M, N>,
    board: &mut B,
) -> ! {
    let mut ticker = Ticker::every(Duration::from_secs(1));
    let mut ticks = 0u32;

    loop {
        let deadline = mapper.next_deadline();
        let timer = async move {
            match deadline {
                Some(t) => Timer::at(Instant::from_millis(t)).await,
                None => core::future::pending().await,
            }
        };

        match select3(channel.wait(), timer, ticker.next()).await {
            Either3::First(()) => {
                let batch = channel.drain();
                mapper.process_batch(&batch, now_ms());
            }
            Either3::Second(()) => mapper.check_time(now_ms()),
            Either3::Third(()) => {
                mapper.tick(now_ms(), board.usb_connected());
                ticks += 1;
                if ticks >= BATTERY_INTERVAL {
                    ticks = 0;
                    if let Some(level) = board.battery_level() {
                        debug!("battery {}%", level);
                        mapper.set_battery_level(level);
                    }
                }
            }
        }

        mapper.drain_backlight(|code| board.backlight(code));
    }
}

#[cfg(test)]
#[path = "exec_test.rs"]
mod test;
