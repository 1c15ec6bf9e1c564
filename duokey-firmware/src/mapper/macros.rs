//! Programmable macros run by a board supplied handler.

use duokey_common::{
    action_code::ActionCode,
    keycodes::{ascii_to_keycode, LEFT_SHIFT},
};

use crate::{
    layout::{self, LoadError},
    transport::KeyReporter,
    warn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroError {
    Failed,
    Unsupported,
}

/// Runs `MACRO` action codes. `index` is the 12 bit macro number; `press` is false on key up.
pub trait MacroHandler<const KEYS: usize, const LAYERS: usize> {
    fn dispatch(
        &mut self,
        ctx: &mut MacroContext<'_, KEYS, LAYERS>,
        index: u16,
        press: bool,
    ) -> Result<(), MacroError>;
}

/// What a macro is allowed to do.
pub struct MacroContext<'a, const KEYS: usize, const LAYERS: usize> {
    layout: &'a mut layout::Manager<KEYS, LAYERS>,
    reporter: &'a mut dyn KeyReporter,
}

impl<'a, const KEYS: usize, const LAYERS: usize> MacroContext<'a, KEYS, LAYERS> {
    pub(crate) fn new(
        layout: &'a mut layout::Manager<KEYS, LAYERS>,
        reporter: &'a mut dyn KeyReporter,
    ) -> Self {
        Self { layout, reporter }
    }

    /// Replace the keymap; the layer mask goes back to layer 0 only.
    pub fn register_keymap(&mut self, keymap: &[&[ActionCode]]) -> Result<(), LoadError> {
        self.layout.register(keymap)
    }

    /// Type `text` one key at a time, shifting where needed.
    pub fn send_text(&mut self, text: &str) {
        self.reporter.release_all();
        for ch in text.chars() {
            let Some((kc, shift)) = ascii_to_keycode(ch) else {
                warn!("cannot type {:?}", ch as u32);
                continue;
            };
            if shift {
                self.reporter.press(&[LEFT_SHIFT]);
            }
            self.reporter.press(&[kc]);
            self.reporter.release(&[kc]);
            if shift {
                self.reporter.release(&[LEFT_SHIFT]);
            }
        }
    }

    pub fn press(&mut self, keycodes: &[u8]) {
        self.reporter.press(keycodes);
    }

    pub fn release(&mut self, keycodes: &[u8]) {
        self.reporter.release(keycodes);
    }

    pub fn release_all(&mut self) {
        self.reporter.release_all();
    }
}
