//! Host clock for tests. Time only moves when a test sets it.

extern crate std;

use core::{cell::Cell, task::Waker};
use embassy_time_driver::Driver;

struct TestTimeDriver;

std::thread_local! {
    static NOW: Cell<u64> = const { Cell::new(0) };
}

impl Driver for TestTimeDriver {
    fn now(&self) -> u64 {
        NOW.with(|now| now.get())
    }

    fn schedule_wake(&self, _at: u64, waker: &Waker) {
        // the timer rechecks now() when polled
        waker.wake_by_ref();
    }
}

embassy_time_driver::time_driver_impl!(static TIME_DRIVER: TestTimeDriver = TestTimeDriver);

pub fn set_time_ms(ms: u64) {
    let ticks = embassy_time::Instant::from_millis(ms).as_ticks();
    NOW.with(|now| now.set(ticks));
}
