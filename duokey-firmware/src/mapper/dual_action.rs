//! Tap-hold disambiguation for `MODS_TAP` and `LAYER_TAP` keys.
//!
//! At most one key is pending at a time. It resolves to a tap or a hold depending on how long it
//! has been down and on what the next key event is.

use duokey_common::action_code::ActionCode;

use crate::key_event::ScanKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Resolution {
    Tap,
    Hold,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TapTiming {
    /// Held longer than this is a hold.
    pub thresh: u64,
    /// Another key pressed sooner than this after the pending key is a tap.
    pub delay: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum DualAction {
    #[default]
    Idle,
    Pending {
        key_id: usize,
        code: ActionCode,
        down_time: u64,
    },
}

impl DualAction {
    pub(crate) fn start(&mut self, key_id: usize, code: ActionCode, down_time: u64) {
        debug_assert!(*self == DualAction::Idle);
        *self = DualAction::Pending {
            key_id,
            code,
            down_time,
        };
    }

    /// The earliest time [DualAction::expired] can become true.
    pub(crate) fn wait_until(&self, timing: &TapTiming) -> Option<u64> {
        match self {
            DualAction::Idle => None,
            DualAction::Pending { down_time, .. } => Some(down_time + timing.thresh + 1),
        }
    }

    /// How the pending key resolves because of `event`, if it does.
    pub(crate) fn on_event(
        &self,
        event: ScanKey,
        now: u64,
        timing: &TapTiming,
    ) -> Option<Resolution> {
        let DualAction::Pending { down_time, .. } = self else {
            return None;
        };
        let elapsed = now.saturating_sub(*down_time);
        Some(if event.is_down() {
            if elapsed < timing.delay {
                Resolution::Tap
            } else {
                Resolution::Hold
            }
        } else if elapsed <= timing.thresh {
            Resolution::Tap
        } else {
            Resolution::Hold
        })
    }

    pub(crate) fn expired(&self, now: u64, timing: &TapTiming) -> bool {
        match self {
            DualAction::Idle => false,
            DualAction::Pending { down_time, .. } => now.saturating_sub(*down_time) > timing.thresh,
        }
    }

    /// Leave the pending state, returning the key and its action code.
    pub(crate) fn take(&mut self) -> Option<(usize, ActionCode)> {
        match core::mem::take(self) {
            DualAction::Idle => None,
            DualAction::Pending { key_id, code, .. } => Some((key_id, code)),
        }
    }
}

#[cfg(test)]
#[path = "dual_action_test.rs"]
mod test;
