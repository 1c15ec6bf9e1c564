use duokey_common::action_code::{
    ActionCode, LayerOp, NO, OP_AND, OP_OR, OP_SET, OP_XOR, TRANSPARENT,
};
use heapless::Vec;

use crate::info;

pub const MAX_LAYERS: usize = 32;

#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// No layers, or more than the firmware was built for.
    LayerCount,
    /// A layer does not have exactly one code per key.
    LayerSize,
}

/// The set of active layers; bit `i` set means layer `i` is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerMask(u32);
impl Default for LayerMask {
    fn default() -> Self {
        Self::BASE
    }
}
impl LayerMask {
    pub const BASE: Self = Self(1);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_active(&self, layer: usize) -> bool {
        layer < MAX_LAYERS && self.0 & (1 << layer) != 0
    }

    pub fn activate(&mut self, layer: u8) {
        self.0 |= 1 << (layer & 0x1f);
    }

    pub fn deactivate(&mut self, layer: u8) {
        self.0 &= !(1 << (layer & 0x1f));
    }

    /// Combine a 4 bit slice into the mask.
    ///
    /// Nothing happens unless `on` includes the current phase. `bits` is shifted into nibble
    /// `part`; with `extend` every bit outside that nibble is set too, so an AND clears only
    /// within the nibble. Returns true when the op fired.
    pub fn apply(
        &mut self,
        op: u8,
        on: u8,
        is_down: bool,
        part: u8,
        bits: u8,
        extend: bool,
    ) -> bool {
        let phase = if is_down { 1 } else { 2 };
        if on & phase == 0 {
            return false;
        }
        let shift = (part & 7) * 4;
        let mut mask = ((bits & 0xf) as u32) << shift;
        if extend {
            mask |= !(0xf << shift);
        }
        match op & 3 {
            OP_AND => self.0 &= mask,
            OP_OR => self.0 |= mask,
            OP_XOR => self.0 ^= mask,
            OP_SET => self.0 = mask,
            _ => unreachable!(),
        }
        true
    }

    pub fn apply_op(&mut self, op: &LayerOp, is_down: bool) -> bool {
        self.apply(op.op, op.on, is_down, op.part, op.bits, op.extend)
    }
}

/// Keymap layers compiled into fixed size arrays indexed by key id.
pub struct ActionMap<const KEYS: usize, const LAYERS: usize> {
    layers: Vec<[ActionCode; KEYS], LAYERS>,
}
impl<const KEYS: usize, const LAYERS: usize> Default for ActionMap<KEYS, LAYERS> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}
impl<const KEYS: usize, const LAYERS: usize> ActionMap<KEYS, LAYERS> {
    const OKAY: bool = {
        assert!(LAYERS > 0 && LAYERS <= MAX_LAYERS);
        assert!(KEYS <= 128);
        true
    };

    /// Build the map from layer 0 upwards.
    pub fn compile(keymap: &[&[ActionCode]]) -> Result<Self, LoadError> {
        assert!(Self::OKAY);
        if keymap.is_empty() || keymap.len() > LAYERS {
            return Err(LoadError::LayerCount);
        }
        let mut layers = Vec::new();
        for codes in keymap {
            let layer: [ActionCode; KEYS] =
                (*codes).try_into().map_err(|_| LoadError::LayerSize)?;
            layers.push(layer).map_err(|_| LoadError::LayerCount)?;
        }
        Ok(Self { layers })
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn get(&self, layer: usize, key_id: usize) -> ActionCode {
        self.layers
            .get(layer)
            .and_then(|l| l.get(key_id))
            .copied()
            .unwrap_or(NO)
    }
}

/// The registered keymap and the layers currently active on it.
#[derive(Default)]
pub struct Manager<const KEYS: usize, const LAYERS: usize> {
    map: ActionMap<KEYS, LAYERS>,
    mask: LayerMask,
}

impl<const KEYS: usize, const LAYERS: usize> Manager<KEYS, LAYERS> {
    /// Compile `keymap` and make it current with only layer 0 active. On error the previous
    /// keymap stays in force.
    pub fn register(&mut self, keymap: &[&[ActionCode]]) -> Result<(), LoadError> {
        let map = ActionMap::compile(keymap)?;
        info!("keymap loaded: {} layers", map.layer_count());
        self.map = map;
        self.mask = LayerMask::BASE;
        Ok(())
    }

    /// The code for `key_id` on the highest active layer that is not transparent there. Layer 0
    /// is always consulted last.
    pub fn resolve(&self, key_id: usize) -> ActionCode {
        for layer in (0..self.map.layer_count()).rev() {
            if layer != 0 && !self.mask.is_active(layer) {
                continue;
            }
            match self.map.get(layer, key_id) {
                TRANSPARENT => continue,
                code => return code,
            }
        }
        NO
    }

    pub fn mask(&self) -> LayerMask {
        self.mask
    }

    pub fn mask_mut(&mut self) -> &mut LayerMask {
        &mut self.mask
    }

    pub fn is_loaded(&self) -> bool {
        self.map.layer_count() != 0
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod test;
