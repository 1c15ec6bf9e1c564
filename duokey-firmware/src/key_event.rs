//! Key switch events delivered by the matrix scanner.

use core::cell::RefCell;

use embassy_sync::{
    blocking_mutex::{raw::RawMutex, Mutex},
    signal::Signal,
};
use heapless::{Deque, Vec};

use crate::warn;

/// A key switch change packed into one byte: bits 6-0 are the key id, bit 7 is set for a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanKey(u8);
impl ScanKey {
    const RELEASE: u8 = 0x80;

    pub fn new(key_id: u8, is_down: bool) -> Self {
        Self((key_id & 0x7f) | if is_down { 0 } else { Self::RELEASE })
    }

    pub fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u8 {
        self.0
    }

    pub fn key_id(&self) -> usize {
        (self.0 & 0x7f) as usize
    }

    pub fn is_down(&self) -> bool {
        self.0 & Self::RELEASE == 0
    }

    pub fn same_key(&self, other: ScanKey) -> bool {
        (self.0 ^ other.0) & 0x7f == 0
    }
}

/// Bounded queue between the matrix scanner and the core loop.
///
/// Pushing never blocks: when the queue is full the oldest event is evicted.
pub struct ScanChannel<M: RawMutex, const N: usize> {
    queue: Mutex<M, RefCell<Deque<ScanKey, N>>>,
    ready: Signal<M, ()>,
}
impl<M: RawMutex, const N: usize> Default for ScanChannel<M, N> {
    fn default() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
            ready: Signal::new(),
        }
    }
}
impl<M: RawMutex, const N: usize> ScanChannel<M, N> {
    pub fn push(&self, key: ScanKey) {
        self.queue.lock(|q| {
            let mut q = q.borrow_mut();
            if q.is_full() {
                if let Some(old) = q.pop_front() {
                    warn!("scan queue full; dropped {:?}", old);
                }
            }
            // cannot fail; a slot was freed above
            let _ = q.push_back(key);
        });
        self.ready.signal(());
    }

    pub fn len(&self) -> usize {
        self.queue.lock(|q| q.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait until at least one event is queued.
    pub async fn wait(&self) {
        while self.is_empty() {
            self.ready.wait().await;
        }
    }

    /// Take every queued event, oldest first, as one batch.
    pub fn drain(&self) -> Vec<ScanKey, N> {
        self.queue.lock(|q| {
            let mut q = q.borrow_mut();
            let mut batch = Vec::new();
            while let Some(k) = q.pop_front() {
                let _ = batch.push(k);
            }
            batch
        })
    }
}

#[cfg(test)]
#[path = "key_event_test.rs"]
mod test;
