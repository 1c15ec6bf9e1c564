//! The 16 bit action code each key position is mapped to.
//!
//! Codes below `0xff` are plain keyboard keycodes. Otherwise the top nibble selects a family and
//! the remaining 12 bits are family specific:
//!
//! ```text
//! 000r mmmm kkkkkkkk  MODS_KEY       modifiers + key pressed together
//! 001r mmmm kkkkkkkk  MODS_TAP       hold: modifiers, tap: key
//! 0100 -Cuu uuuuuuuu  USAGE          C=1 consumer usage, C=0 system control usage
//! 0101 cccc vvvvvvvv  MOUSEKEY       class + magnitude / button mask
//! 100- ooww pppebbbb  LAYER          op, when, nibble, extend, bits
//! 101l llll kkkkkkkk  LAYER_TAP      hold: layer (or layer + mods), tap: key
//! 1100 iiiiiiiiiiii  MACRO
//! 1101 iiiiiiiiiiii  BACKLIGHT
//! 1110 iiiiiiiiiiii  COMMAND
//! ```
//!
//! Decoding is total: every value maps to one [Action], unused encodings to [Action::NoOp].

pub type ActionCode = u16;

pub const NO: ActionCode = 0;
pub const TRANSPARENT: ActionCode = 1;

/// Values of the top nibble. Families are compared as ordered ranges.
pub mod variant {
    pub const MODS_KEY: u16 = 0b0000;
    pub const MODS_TAP: u16 = 0b0010;
    pub const USAGE: u16 = 0b0100;
    pub const MOUSEKEY: u16 = 0b0101;
    pub const LAYER: u16 = 0b1000;
    pub const LAYER_TAP: u16 = 0b1010;
    pub const LAYER_TAP_EXT: u16 = 0b1011;
    pub const MACRO: u16 = 0b1100;
    pub const BACKLIGHT: u16 = 0b1101;
    pub const COMMAND: u16 = 0b1110;
}

pub const ON_PRESS: u8 = 1;
pub const ON_RELEASE: u8 = 2;
pub const ON_BOTH: u8 = 3;

pub const OP_AND: u8 = 0;
pub const OP_OR: u8 = 1;
pub const OP_XOR: u8 = 2;
pub const OP_SET: u8 = 3;

/// Payload marking a `LAYER_TAP` code as `LAYER_MODS`.
const LAYER_MODS_PATTERN: u8 = 0xc0;

pub mod mouse_class {
    pub const BUTTONS: u8 = 0;
    pub const UP: u8 = 1;
    pub const DOWN: u8 = 2;
    pub const LEFT: u8 = 3;
    pub const RIGHT: u8 = 4;
    pub const UP_LEFT: u8 = 5;
    pub const UP_RIGHT: u8 = 6;
    pub const DOWN_LEFT: u8 = 7;
    pub const DOWN_RIGHT: u8 = 8;
    pub const WHEEL_UP: u8 = 9;
    pub const WHEEL_DOWN: u8 = 10;
    pub const ACCEL: u8 = 11;
}

pub mod command_id {
    pub const BOOTLOADER: u16 = 0;
    pub const SUSPEND: u16 = 1;
    pub const SHUTDOWN: u16 = 2;
    pub const HEATMAP: u16 = 3;
    pub const USB_TOGGLE: u16 = 4;
    pub const RADIO_TOGGLE: u16 = 5;
    pub const RESET: u16 = 6;
    pub const SWITCH_TO_USB: u16 = 7;
    pub const SWITCH_TO_RADIO: u16 = 8;
    pub const RADIO_PROFILE: u16 = 0x10;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    NoOp,
    Transparent,
    Key(u8),
    ModsKey { mods: u8, key: u8 },
    ModsTap { mods: u8, key: u8 },
    Consumer(u16),
    SystemControl(u16),
    Mouse(MouseAction),
    Layer(LayerOp),
    LayerTap { layer: u8, key: u8 },
    LayerMods { layer: u8, mods: u8 },
    Macro(u16),
    Backlight(u16),
    Command(Command),
}

impl Action {
    /// Actions whose meaning depends on how long the key is held.
    pub fn is_dual(&self) -> bool {
        matches!(self, Action::ModsTap { .. } | Action::LayerTap { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerOp {
    pub op: u8,
    pub on: u8,
    pub part: u8,
    pub bits: u8,
    pub extend: bool,
}

impl LayerOp {
    fn decode(code: ActionCode) -> Self {
        Self {
            op: ((code >> 10) & 3) as u8,
            on: ((code >> 8) & 3) as u8,
            part: ((code >> 5) & 7) as u8,
            bits: (code & 0xf) as u8,
            extend: code & 0x10 != 0,
        }
    }

    pub fn fires(&self, is_down: bool) -> bool {
        self.on & if is_down { ON_PRESS } else { ON_RELEASE } != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MouseAction {
    Buttons(u8),
    /// Direction in -1..=1 per axis; a speed of 0 means the configured base speed.
    Move { dx: i8, dy: i8, speed: u8 },
    Wheel { dir: i8, speed: u8 },
    Accel(u8),
}

impl MouseAction {
    fn decode(code: ActionCode) -> Option<Self> {
        use mouse_class::*;
        let value = code as u8;
        let mv = |dx, dy| Some(MouseAction::Move { dx, dy, speed: value });
        match ((code >> 8) & 0xf) as u8 {
            BUTTONS => Some(MouseAction::Buttons(value)),
            UP => mv(0, -1),
            DOWN => mv(0, 1),
            LEFT => mv(-1, 0),
            RIGHT => mv(1, 0),
            UP_LEFT => mv(-1, -1),
            UP_RIGHT => mv(1, -1),
            DOWN_LEFT => mv(-1, 1),
            DOWN_RIGHT => mv(1, 1),
            WHEEL_UP => Some(MouseAction::Wheel {
                dir: 1,
                speed: value,
            }),
            WHEEL_DOWN => Some(MouseAction::Wheel {
                dir: -1,
                speed: value,
            }),
            ACCEL => Some(MouseAction::Accel(value)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Bootloader,
    Suspend,
    Shutdown,
    Heatmap,
    UsbToggle,
    RadioToggle,
    Reset,
    SwitchToUsb,
    SwitchToRadio,
    RadioProfile(u8),
}

impl Command {
    fn decode(id: u16) -> Option<Self> {
        use command_id::*;
        Some(match id {
            BOOTLOADER => Command::Bootloader,
            SUSPEND => Command::Suspend,
            SHUTDOWN => Command::Shutdown,
            HEATMAP => Command::Heatmap,
            USB_TOGGLE => Command::UsbToggle,
            RADIO_TOGGLE => Command::RadioToggle,
            RESET => Command::Reset,
            SWITCH_TO_USB => Command::SwitchToUsb,
            SWITCH_TO_RADIO => Command::SwitchToRadio,
            n if (RADIO_PROFILE..RADIO_PROFILE + 10).contains(&n) => {
                Command::RadioProfile((n - RADIO_PROFILE) as u8)
            }
            _ => return None,
        })
    }
}

/// Decode any action code. Never fails.
pub fn decode(code: ActionCode) -> Action {
    use variant::*;

    if code < 0xff {
        return match code {
            NO => Action::NoOp,
            TRANSPARENT => Action::Transparent,
            kc => Action::Key(kc as u8),
        };
    }

    let kind = code >> 12;
    let high = ((code >> 8) & 0x1f) as u8;
    let low = code as u8;

    if kind < MODS_TAP {
        Action::ModsKey {
            mods: high,
            key: low,
        }
    } else if kind < USAGE {
        Action::ModsTap {
            mods: high,
            key: low,
        }
    } else if kind == USAGE {
        if code & 0x400 != 0 {
            Action::Consumer(code & 0x3ff)
        } else {
            Action::SystemControl(code & 0x3ff)
        }
    } else if kind == MOUSEKEY {
        MouseAction::decode(code).map_or(Action::NoOp, Action::Mouse)
    } else if kind < LAYER {
        Action::NoOp
    } else if kind < LAYER_TAP {
        Action::Layer(LayerOp::decode(code))
    } else if kind < MACRO {
        if low & 0xe0 == LAYER_MODS_PATTERN {
            Action::LayerMods {
                layer: high,
                mods: low & 0x1f,
            }
        } else {
            Action::LayerTap {
                layer: high,
                key: low,
            }
        }
    } else if kind == MACRO {
        Action::Macro(code & 0xfff)
    } else if kind == BACKLIGHT {
        Action::Backlight(code & 0xfff)
    } else if kind == COMMAND {
        Command::decode(code & 0xfff).map_or(Action::NoOp, Action::Command)
    } else {
        Action::NoOp
    }
}

// Symbolic constructors used when writing keymaps.

pub const fn mods_key(mods: u8, key: u8) -> ActionCode {
    (((mods & 0x1f) as u16) << 8) | key as u16
}

pub const fn mods_tap(mods: u8, key: u8) -> ActionCode {
    (variant::MODS_TAP << 12) | mods_key(mods, key)
}

pub const fn consumer(usage: u16) -> ActionCode {
    (variant::USAGE << 12) | 0x400 | (usage & 0x3ff)
}

pub const fn system_control(usage: u16) -> ActionCode {
    (variant::USAGE << 12) | (usage & 0x3ff)
}

pub const fn mouse(class: u8, value: u8) -> ActionCode {
    (variant::MOUSEKEY << 12) | (((class & 0xf) as u16) << 8) | value as u16
}

pub const fn mouse_button(mask: u8) -> ActionCode {
    mouse(mouse_class::BUTTONS, mask)
}

pub const fn mouse_accel(profile: u8) -> ActionCode {
    mouse(mouse_class::ACCEL, profile)
}

pub const fn layer_bitop(op: u8, part: u8, bits: u8, on: u8) -> ActionCode {
    (variant::LAYER << 12)
        | (((op & 3) as u16) << 10)
        | (((on & 3) as u16) << 8)
        | (((part & 7) as u16) << 5)
        | (bits & 0x1f) as u16
}

pub const fn layer_on(layer: u8, on: u8) -> ActionCode {
    layer_bitop(OP_OR, layer / 4, 1 << (layer % 4), on)
}

/// The complemented nibble sets the extend bit, clearing only `layer`.
pub const fn layer_off(layer: u8, on: u8) -> ActionCode {
    layer_bitop(OP_AND, layer / 4, !(1 << (layer % 4)), on)
}

pub const fn layer_toggle(layer: u8) -> ActionCode {
    layer_bitop(OP_XOR, layer / 4, 1 << (layer % 4), ON_RELEASE)
}

/// Make `layer` the only active layer.
pub const fn layer_set(layer: u8, on: u8) -> ActionCode {
    layer_bitop(OP_SET, layer / 4, 1 << (layer % 4), on)
}

/// Layers 16 to 31 spill into the `LAYER_TAP_EXT` variant.
pub const fn layer_tap(layer: u8, key: u8) -> ActionCode {
    (variant::LAYER_TAP << 12) | (((layer & 0x1f) as u16) << 8) | key as u16
}

pub const fn layer_mods(layer: u8, mods: u8) -> ActionCode {
    layer_tap(layer, LAYER_MODS_PATTERN | (mods & 0x1f))
}

/// Layer active only while held.
pub const fn momentary(layer: u8) -> ActionCode {
    layer_mods(layer, 0)
}

pub const fn macro_action(index: u16) -> ActionCode {
    (variant::MACRO << 12) | (index & 0xfff)
}

pub const fn backlight(id: u16) -> ActionCode {
    (variant::BACKLIGHT << 12) | (id & 0xfff)
}

pub const fn command(id: u16) -> ActionCode {
    (variant::COMMAND << 12) | (id & 0xfff)
}

pub const fn radio_profile(n: u8) -> ActionCode {
    command(command_id::RADIO_PROFILE + (n % 10) as u16)
}

pub const BOOTLOADER: ActionCode = command(command_id::BOOTLOADER);
pub const SUSPEND: ActionCode = command(command_id::SUSPEND);
pub const SHUTDOWN: ActionCode = command(command_id::SHUTDOWN);
pub const HEATMAP: ActionCode = command(command_id::HEATMAP);
pub const USB_TOGGLE: ActionCode = command(command_id::USB_TOGGLE);
pub const BT_TOGGLE: ActionCode = command(command_id::RADIO_TOGGLE);
pub const RESET: ActionCode = command(command_id::RESET);
pub const SWITCH_TO_USB: ActionCode = command(command_id::SWITCH_TO_USB);
pub const SWITCH_TO_RADIO: ActionCode = command(command_id::SWITCH_TO_RADIO);

pub const MS_UP: ActionCode = mouse(mouse_class::UP, 0);
pub const MS_DOWN: ActionCode = mouse(mouse_class::DOWN, 0);
pub const MS_LEFT: ActionCode = mouse(mouse_class::LEFT, 0);
pub const MS_RIGHT: ActionCode = mouse(mouse_class::RIGHT, 0);
pub const MS_WHEEL_UP: ActionCode = mouse(mouse_class::WHEEL_UP, 0);
pub const MS_WHEEL_DOWN: ActionCode = mouse(mouse_class::WHEEL_DOWN, 0);
pub const MS_BTN1: ActionCode = mouse_button(1);
pub const MS_BTN2: ActionCode = mouse_button(2);
pub const MS_BTN3: ActionCode = mouse_button(4);

#[cfg(test)]
#[path = "action_code_test.rs"]
mod test;
