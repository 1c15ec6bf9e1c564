//! HID keyboard page usage ids.

pub mod key_range {
    pub const BASIC_MIN: u8 = 0x4;
    pub const BASIC_A: u8 = 0x4;
    pub const BASIC_1: u8 = 0x1e;
    pub const BASIC_0: u8 = 0x27;
    pub const BASIC_MAX: u8 = 0xdd;
    pub const MODIFIER_MIN: u8 = 0xe0;
    pub const MODIFIER_MAX: u8 = 0xe7;

    pub const fn is_modifier(kc: u8) -> bool {
        matches!(kc, MODIFIER_MIN..=MODIFIER_MAX)
    }
}

pub const A: u8 = 0x04;
pub const B: u8 = 0x05;
pub const C: u8 = 0x06;
pub const D: u8 = 0x07;
pub const E: u8 = 0x08;
pub const F: u8 = 0x09;
pub const G: u8 = 0x0a;
pub const H: u8 = 0x0b;
pub const I: u8 = 0x0c;
pub const J: u8 = 0x0d;
pub const K: u8 = 0x0e;
pub const L: u8 = 0x0f;
pub const M: u8 = 0x10;
pub const N: u8 = 0x11;
pub const O: u8 = 0x12;
pub const P: u8 = 0x13;
pub const Q: u8 = 0x14;
pub const R: u8 = 0x15;
pub const S: u8 = 0x16;
pub const T: u8 = 0x17;
pub const U: u8 = 0x18;
pub const V: u8 = 0x19;
pub const W: u8 = 0x1a;
pub const X: u8 = 0x1b;
pub const Y: u8 = 0x1c;
pub const Z: u8 = 0x1d;
pub const N1: u8 = 0x1e;
pub const N2: u8 = 0x1f;
pub const N3: u8 = 0x20;
pub const N4: u8 = 0x21;
pub const N5: u8 = 0x22;
pub const N6: u8 = 0x23;
pub const N7: u8 = 0x24;
pub const N8: u8 = 0x25;
pub const N9: u8 = 0x26;
pub const N0: u8 = 0x27;
pub const ENTER: u8 = 0x28;
pub const ESCAPE: u8 = 0x29;
pub const BACKSPACE: u8 = 0x2a;
pub const TAB: u8 = 0x2b;
pub const SPACE: u8 = 0x2c;
pub const MINUS: u8 = 0x2d;
pub const EQUAL: u8 = 0x2e;
pub const LEFT_BRACKET: u8 = 0x2f;
pub const RIGHT_BRACKET: u8 = 0x30;
pub const BACKSLASH: u8 = 0x31;
pub const SEMICOLON: u8 = 0x33;
pub const QUOTE: u8 = 0x34;
pub const GRAVE: u8 = 0x35;
pub const COMMA: u8 = 0x36;
pub const DOT: u8 = 0x37;
pub const SLASH: u8 = 0x38;
pub const CAPS_LOCK: u8 = 0x39;
pub const F1: u8 = 0x3a;
pub const F2: u8 = 0x3b;
pub const F3: u8 = 0x3c;
pub const F4: u8 = 0x3d;
pub const F5: u8 = 0x3e;
pub const F6: u8 = 0x3f;
pub const F7: u8 = 0x40;
pub const F8: u8 = 0x41;
pub const F9: u8 = 0x42;
pub const F10: u8 = 0x43;
pub const F11: u8 = 0x44;
pub const F12: u8 = 0x45;
pub const PRINT_SCREEN: u8 = 0x46;
pub const SCROLL_LOCK: u8 = 0x47;
pub const PAUSE: u8 = 0x48;
pub const INSERT: u8 = 0x49;
pub const HOME: u8 = 0x4a;
pub const PAGE_UP: u8 = 0x4b;
pub const DELETE: u8 = 0x4c;
pub const END: u8 = 0x4d;
pub const PAGE_DOWN: u8 = 0x4e;
pub const RIGHT: u8 = 0x4f;
pub const LEFT: u8 = 0x50;
pub const DOWN: u8 = 0x51;
pub const UP: u8 = 0x52;
pub const APPLICATION: u8 = 0x65;

pub const LEFT_CTRL: u8 = 0xe0;
pub const LEFT_SHIFT: u8 = 0xe1;
pub const LEFT_ALT: u8 = 0xe2;
pub const LEFT_GUI: u8 = 0xe3;
pub const RIGHT_CTRL: u8 = 0xe4;
pub const RIGHT_SHIFT: u8 = 0xe5;
pub const RIGHT_ALT: u8 = 0xe6;
pub const RIGHT_GUI: u8 = 0xe7;

/// Consumer page usage ids.
pub mod consumer {
    pub const BRIGHTNESS_UP: u16 = 0x6f;
    pub const BRIGHTNESS_DOWN: u16 = 0x70;
    pub const NEXT_TRACK: u16 = 0xb5;
    pub const PREV_TRACK: u16 = 0xb6;
    pub const STOP: u16 = 0xb7;
    pub const PLAY_PAUSE: u16 = 0xcd;
    pub const MUTE: u16 = 0xe2;
    pub const VOLUME_UP: u16 = 0xe9;
    pub const VOLUME_DOWN: u16 = 0xea;
}

/// The 5 bit modifier set carried by the `MODS_*` and `LAYER_MODS` action codes.
pub mod mods {
    pub const CTRL: u8 = 0x01;
    pub const SHIFT: u8 = 0x02;
    pub const ALT: u8 = 0x04;
    pub const GUI: u8 = 0x08;
    /// Selects the right hand modifiers instead of the left.
    pub const RIGHT: u8 = 0x10;
}

/// Expand a 5 bit modifier set into modifier keycodes, written to the front of `buf`.
pub fn mods_to_keycodes(mods: u8, buf: &mut [u8; 4]) -> &[u8] {
    let base = if mods & mods::RIGHT != 0 {
        RIGHT_CTRL
    } else {
        LEFT_CTRL
    };
    let mut n = 0;
    for i in 0..4 {
        if mods & (1 << i) != 0 {
            buf[n] = base + i;
            n += 1;
        }
    }
    &buf[..n]
}

/// Set on an [ASCII_TO_KEYCODE] entry when the character needs shift held.
pub const SHIFT_FLAG: u8 = 0x80;

/// US layout keycodes for 7 bit ascii. Zero means the character cannot be typed.
pub const ASCII_TO_KEYCODE: [u8; 128] = ascii_table();

const fn ascii_table() -> [u8; 128] {
    let mut t = [0u8; 128];

    let mut i = 0;
    while i < 26 {
        t[b'a' as usize + i] = A + i as u8;
        t[b'A' as usize + i] = (A + i as u8) | SHIFT_FLAG;
        i += 1;
    }
    let mut i = 0;
    while i < 9 {
        t[b'1' as usize + i] = N1 + i as u8;
        i += 1;
    }
    t[b'0' as usize] = N0;

    t[0x08] = BACKSPACE;
    t[b'\t' as usize] = TAB;
    t[b'\n' as usize] = ENTER;
    t[0x1b] = ESCAPE;
    t[b' ' as usize] = SPACE;
    t[0x7f] = DELETE;

    t[b'!' as usize] = N1 | SHIFT_FLAG;
    t[b'@' as usize] = N2 | SHIFT_FLAG;
    t[b'#' as usize] = N3 | SHIFT_FLAG;
    t[b'$' as usize] = N4 | SHIFT_FLAG;
    t[b'%' as usize] = N5 | SHIFT_FLAG;
    t[b'^' as usize] = N6 | SHIFT_FLAG;
    t[b'&' as usize] = N7 | SHIFT_FLAG;
    t[b'*' as usize] = N8 | SHIFT_FLAG;
    t[b'(' as usize] = N9 | SHIFT_FLAG;
    t[b')' as usize] = N0 | SHIFT_FLAG;

    t[b'-' as usize] = MINUS;
    t[b'_' as usize] = MINUS | SHIFT_FLAG;
    t[b'=' as usize] = EQUAL;
    t[b'+' as usize] = EQUAL | SHIFT_FLAG;
    t[b'[' as usize] = LEFT_BRACKET;
    t[b'{' as usize] = LEFT_BRACKET | SHIFT_FLAG;
    t[b']' as usize] = RIGHT_BRACKET;
    t[b'}' as usize] = RIGHT_BRACKET | SHIFT_FLAG;
    t[b'\\' as usize] = BACKSLASH;
    t[b'|' as usize] = BACKSLASH | SHIFT_FLAG;
    t[b';' as usize] = SEMICOLON;
    t[b':' as usize] = SEMICOLON | SHIFT_FLAG;
    t[b'\'' as usize] = QUOTE;
    t[b'"' as usize] = QUOTE | SHIFT_FLAG;
    t[b'`' as usize] = GRAVE;
    t[b'~' as usize] = GRAVE | SHIFT_FLAG;
    t[b',' as usize] = COMMA;
    t[b'<' as usize] = COMMA | SHIFT_FLAG;
    t[b'.' as usize] = DOT;
    t[b'>' as usize] = DOT | SHIFT_FLAG;
    t[b'/' as usize] = SLASH;
    t[b'?' as usize] = SLASH | SHIFT_FLAG;

    t
}

/// Look up the keycode for `ch` and whether shift is needed. Returns `None` for characters that
/// cannot be typed.
pub fn ascii_to_keycode(ch: char) -> Option<(u8, bool)> {
    let i = ch as u32;
    if i >= 128 {
        return None;
    }
    match ASCII_TO_KEYCODE[i as usize] {
        0 => None,
        kc => Some((kc & !SHIFT_FLAG, kc & SHIFT_FLAG != 0)),
    }
}

#[cfg(test)]
#[path = "keycodes_test.rs"]
mod test;
