//! Turns key events into reports, layer changes and commands.
//!
//! A key's action is resolved when it goes down and remembered until it comes up, so changing
//! layers while a key is held never changes what its release does.

use dual_action::{DualAction, Resolution, TapTiming};
use duokey_common::{
    action_code::{decode, Action, ActionCode, Command, NO},
    keycodes::mods_to_keycodes,
};
use mouse::{Mouse, MouseEvent};

use crate::{
    config::Config,
    debug, firmware_functions, info,
    key_event::ScanKey,
    key_reporter::ReportSink,
    layout::{self, LoadError},
    transport::{radio::RadioLink, KeyReporter, Status, TransportManager},
    verbose, warn,
};

pub mod macros;

pub(crate) mod dual_action;
pub(crate) mod mouse;

pub use macros::{MacroContext, MacroError, MacroHandler};

/// How a dual-function key ended up being used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    #[default]
    Undecided,
    Tapped,
    Held,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyRuntime {
    pub action: ActionCode,
    pub down_time: u64,
    pub up_time: u64,
    pub outcome: Outcome,
}

/// Layer mask, per-key state and the pending tap-hold key; changed together or not at all.
pub struct CoreState<const KEYS: usize, const LAYERS: usize> {
    layout: layout::Manager<KEYS, LAYERS>,
    keys: [KeyRuntime; KEYS],
    dual: DualAction,
    heatmap: [u16; KEYS],
    last_activity: u64,
}

impl<const KEYS: usize, const LAYERS: usize> Default for CoreState<KEYS, LAYERS> {
    fn default() -> Self {
        Self {
            layout: layout::Manager::default(),
            keys: [KeyRuntime::default(); KEYS],
            dual: DualAction::Idle,
            heatmap: [0; KEYS],
            last_activity: 0,
        }
    }
}

const BACKLIGHT_QUEUE: usize = 4;

pub struct Mapper<'h, U: ReportSink, R: RadioLink, const KEYS: usize, const LAYERS: usize> {
    config: Config,
    timing: TapTiming,
    core: CoreState<KEYS, LAYERS>,
    transport: TransportManager<U, R>,
    mouse: Mouse,
    macros: Option<&'h mut dyn MacroHandler<KEYS, LAYERS>>,
    backlight: heapless::Vec<u16, BACKLIGHT_QUEUE>,
}

impl<'h, U: ReportSink, R: RadioLink, const KEYS: usize, const LAYERS: usize>
    Mapper<'h, U, R, KEYS, LAYERS>
{
    pub fn new(config: Config, transport: TransportManager<U, R>, now: u64) -> Self {
        Self {
            config,
            timing: TapTiming {
                thresh: config.tap_thresh_ms as u64,
                delay: config.tap_delay_ms as u64,
            },
            core: CoreState {
                last_activity: now,
                ..Default::default()
            },
            transport,
            mouse: Mouse::new(config.mouse()),
            macros: None,
            backlight: heapless::Vec::new(),
        }
    }

    pub fn set_macro_handler(&mut self, handler: &'h mut dyn MacroHandler<KEYS, LAYERS>) {
        self.macros = Some(handler);
    }

    pub fn register_keymap(&mut self, keymap: &[&[ActionCode]]) -> Result<(), LoadError> {
        self.core.layout.register(keymap)
    }

    pub fn transport(&self) -> &TransportManager<U, R> {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut TransportManager<U, R> {
        &mut self.transport
    }

    pub fn status(&self) -> Status {
        self.transport.status()
    }

    pub fn layout(&self) -> &layout::Manager<KEYS, LAYERS> {
        &self.core.layout
    }

    pub fn heatmap(&self) -> &[u16; KEYS] {
        &self.core.heatmap
    }

    pub fn last_activity(&self) -> u64 {
        self.core.last_activity
    }

    /// Process one scan batch in order.
    pub fn process_batch(&mut self, batch: &[ScanKey], now: u64) {
        let concurrent = batch.len() > 1;
        for key in batch {
            self.key_event(*key, concurrent, now);
        }
    }

    /// When [Mapper::check_time] next has something to do.
    pub fn next_deadline(&self) -> Option<u64> {
        match (
            self.core.dual.wait_until(&self.timing),
            self.mouse.next_flush(),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Resolve an expired tap-hold key and send due mouse movement.
    pub fn check_time(&mut self, now: u64) {
        if self.core.dual.expired(now, &self.timing) {
            self.resolve_pending(Resolution::Hold);
        }
        if self.mouse.next_flush().is_some_and(|t| t <= now) {
            if let Some(ev) = self.mouse.flush(now) {
                self.send_mouse(ev);
            }
        }
    }

    /// Liveness work, about once a second.
    pub fn tick(&mut self, now: u64, usb_connected: bool) {
        self.transport.check(now, usb_connected);
        if now.saturating_sub(self.core.last_activity) >= self.config.idle_timeout_ms() {
            info!("idle; suspending");
            self.core.last_activity = now;
            self.release_all();
            firmware_functions::suspend();
        }
    }

    pub fn set_battery_level(&mut self, level: u8) {
        self.transport.set_battery_level(level);
    }

    /// Hand queued backlight codes to `f`.
    pub fn drain_backlight(&mut self, mut f: impl FnMut(u16)) {
        for code in self.backlight.iter() {
            f(*code);
        }
        self.backlight.clear();
    }

    fn release_all(&mut self) {
        self.mouse.clear();
        self.transport.release_all();
    }

    fn key_event(&mut self, key: ScanKey, concurrent: bool, now: u64) {
        let key_id = key.key_id();
        if key_id >= KEYS {
            warn!("key {} out of range", key_id);
            return;
        }
        verbose!(
            self.config.verbose,
            "key {} {}",
            key_id,
            if key.is_down() { "down" } else { "up" }
        );
        self.core.last_activity = now;

        // a deadline that passed without check_time still counts as a hold
        if self.core.dual.expired(now, &self.timing) {
            self.resolve_pending(Resolution::Hold);
        }
        if let Some(resolution) = self.core.dual.on_event(key, now, &self.timing) {
            self.resolve_pending(resolution);
        }

        if key.is_down() {
            self.press(key_id, concurrent, now);
        } else {
            self.release(key_id, now);
        }
    }

    fn press(&mut self, key_id: usize, concurrent: bool, now: u64) {
        let code = self.core.layout.resolve(key_id);
        self.core.keys[key_id] = KeyRuntime {
            action: code,
            down_time: now,
            up_time: self.core.keys[key_id].up_time,
            outcome: Outcome::Undecided,
        };
        let count = &mut self.core.heatmap[key_id];
        *count = count.saturating_add(1);

        let action = decode(code);
        if action.is_dual() {
            if concurrent {
                self.core.keys[key_id].outcome = Outcome::Held;
                self.hold(action, true);
            } else {
                self.core.dual.start(key_id, code, now);
            }
            return;
        }
        self.run_action(action, true, now);
    }

    fn release(&mut self, key_id: usize, now: u64) {
        let rt = &mut self.core.keys[key_id];
        rt.up_time = now;
        let action = decode(rt.action);
        let outcome = core::mem::take(&mut rt.outcome);
        rt.action = NO;

        if action.is_dual() {
            if outcome == Outcome::Held {
                self.hold(action, false);
            }
            return;
        }
        self.run_action(action, false, now);
    }

    fn resolve_pending(&mut self, resolution: Resolution) {
        let Some((key_id, code)) = self.core.dual.take() else {
            return;
        };
        let action = decode(code);
        verbose!(
            self.config.verbose,
            "key {} resolved {:?}",
            key_id,
            resolution
        );
        match resolution {
            Resolution::Tap => {
                self.core.keys[key_id].outcome = Outcome::Tapped;
                if let Action::ModsTap { key, .. } | Action::LayerTap { key, .. } = action {
                    self.transport.press(&[key]);
                    self.transport.release(&[key]);
                }
            }
            Resolution::Hold => {
                self.core.keys[key_id].outcome = Outcome::Held;
                self.hold(action, true);
            }
        }
    }

    fn hold(&mut self, action: Action, is_down: bool) {
        match action {
            Action::ModsTap { mods, .. } => self.modifiers(mods, is_down),
            Action::LayerTap { layer, .. } => self.layer_switch(layer, is_down),
            _ => {}
        }
    }

    fn modifiers(&mut self, mods: u8, is_down: bool) {
        let mut buf = [0; 4];
        let keycodes = mods_to_keycodes(mods, &mut buf);
        if !keycodes.is_empty() {
            self.key(keycodes, is_down);
        }
    }

    fn layer_switch(&mut self, layer: u8, is_down: bool) {
        let mask = self.core.layout.mask_mut();
        if is_down {
            mask.activate(layer);
        } else {
            mask.deactivate(layer);
        }
    }

    fn key(&mut self, keycodes: &[u8], is_down: bool) {
        if is_down {
            self.transport.press(keycodes);
        } else {
            self.transport.release(keycodes);
        }
    }

    fn run_action(&mut self, action: Action, is_down: bool, now: u64) {
        match action {
            Action::NoOp | Action::Transparent => {}
            Action::Key(kc) => self.key(&[kc], is_down),
            Action::ModsKey { mods, key } => {
                let mut buf = [0; 4];
                let mods = mods_to_keycodes(mods, &mut buf);
                let mut keycodes = [0; 5];
                keycodes[..mods.len()].copy_from_slice(mods);
                keycodes[mods.len()] = key;
                let n = mods.len() + 1;
                self.key(&keycodes[..n], is_down);
            }
            Action::Consumer(usage) => self.transport.consumer(if is_down { usage } else { 0 }),
            Action::SystemControl(usage) => {
                debug!("system control {} not supported", usage);
            }
            Action::Mouse(ma) => {
                if let Some(ev) = self.mouse.action(ma, is_down, now) {
                    self.send_mouse(ev);
                }
            }
            Action::Layer(op) => {
                self.core.layout.mask_mut().apply_op(&op, is_down);
            }
            Action::LayerMods { layer, mods } => {
                self.layer_switch(layer, is_down);
                self.modifiers(mods, is_down);
            }
            Action::ModsTap { .. } | Action::LayerTap { .. } => {}
            Action::Macro(index) => self.dispatch_macro(index, is_down),
            Action::Backlight(code) => {
                if is_down && self.backlight.push(code).is_err() {
                    warn!("backlight queue full");
                }
            }
            Action::Command(cmd) => self.command(cmd, is_down, now),
        }
    }

    fn send_mouse(&mut self, ev: MouseEvent) {
        match ev {
            MouseEvent::Buttons(b) => self.transport.mouse_buttons(b),
            MouseEvent::Move { x, y, wheel } => self.transport.mouse_move(x, y, wheel),
        }
    }

    fn dispatch_macro(&mut self, index: u16, press: bool) {
        let Some(handler) = self.macros.as_deref_mut() else {
            debug!("no handler for macro {}", index);
            return;
        };
        let mut ctx = MacroContext::new(&mut self.core.layout, &mut self.transport);
        if let Err(err) = handler.dispatch(&mut ctx, index, press) {
            warn!("macro {} failed: {:?}", index, err);
        }
    }

    fn command(&mut self, cmd: Command, is_down: bool, now: u64) {
        verbose!(self.config.verbose, "command {:?} {}", cmd, is_down);
        match cmd {
            // these act on release so the host sees the key go up first
            Command::Bootloader | Command::Reset | Command::Suspend | Command::Shutdown => {
                if is_down {
                    return;
                }
                self.release_all();
                match cmd {
                    Command::Bootloader => firmware_functions::reset_to_bootloader(),
                    Command::Reset => firmware_functions::reset(),
                    Command::Suspend => firmware_functions::suspend(),
                    _ => firmware_functions::shutdown(),
                }
            }
            _ if !is_down => {}
            Command::Heatmap => self.log_heatmap(),
            Command::UsbToggle => self.transport.toggle_usb(now),
            Command::RadioToggle => self.transport.toggle_radio(now),
            Command::SwitchToUsb => self.transport.switch_to_usb(),
            Command::SwitchToRadio => self.transport.switch_to_radio(now),
            Command::RadioProfile(n) => self.transport.switch_to_profile(n, now),
        }
    }

    fn log_heatmap(&self) {
        info!("heatmap");
        for (key_id, count) in self.core.heatmap.iter().enumerate() {
            if *count != 0 {
                info!("  key {}: {}", key_id, count);
            }
        }
    }
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod test;
