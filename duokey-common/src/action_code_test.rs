use crate::keycodes::{self, mods};

use super::*;

#[test]
fn decode_is_total_and_deterministic() {
    for code in 0..=u16::MAX {
        let a = decode(code);
        assert_eq!(a, decode(code));
        if code < 0xff {
            assert!(matches!(
                a,
                Action::NoOp | Action::Transparent | Action::Key(_)
            ));
        }
    }
}

#[test]
fn gaps_decode_to_noop() {
    for kind in [0b0110u16, 0b0111, 0b1111] {
        assert_eq!(decode((kind << 12) | 0x123), Action::NoOp);
    }
    assert_eq!(decode(mouse(12, 5)), Action::NoOp);
    assert_eq!(decode(command(0x1a)), Action::NoOp);
    assert_eq!(decode(command(0x7ff)), Action::NoOp);
}

#[test]
fn plain_keycodes() {
    assert_eq!(decode(NO), Action::NoOp);
    assert_eq!(decode(TRANSPARENT), Action::Transparent);
    assert_eq!(decode(keycodes::A as u16), Action::Key(keycodes::A));
    assert_eq!(decode(0xe7), Action::Key(keycodes::RIGHT_GUI));
}

#[test]
fn mods_families() {
    assert_eq!(
        decode(mods_key(mods::SHIFT, keycodes::N1)),
        Action::ModsKey {
            mods: mods::SHIFT,
            key: keycodes::N1
        }
    );
    // right hand flag lands in bit 12 which is still the MODS_KEY family
    assert_eq!(
        decode(mods_key(mods::RIGHT | mods::CTRL, keycodes::C)),
        Action::ModsKey {
            mods: mods::RIGHT | mods::CTRL,
            key: keycodes::C
        }
    );
    let code = mods_tap(mods::RIGHT | mods::ALT, keycodes::SPACE);
    assert_eq!(code >> 12, 0b0011);
    assert_eq!(
        decode(code),
        Action::ModsTap {
            mods: mods::RIGHT | mods::ALT,
            key: keycodes::SPACE
        }
    );
    assert!(decode(code).is_dual());
}

#[test]
fn usage_family() {
    assert_eq!(
        decode(consumer(keycodes::consumer::VOLUME_UP)),
        Action::Consumer(0xe9)
    );
    assert_eq!(decode(system_control(0x81)), Action::SystemControl(0x81));
}

#[test]
fn mouse_family() {
    assert_eq!(
        decode(MS_UP),
        Action::Mouse(MouseAction::Move {
            dx: 0,
            dy: -1,
            speed: 0
        })
    );
    assert_eq!(
        decode(mouse(mouse_class::DOWN_RIGHT, 9)),
        Action::Mouse(MouseAction::Move {
            dx: 1,
            dy: 1,
            speed: 9
        })
    );
    assert_eq!(decode(MS_BTN2), Action::Mouse(MouseAction::Buttons(2)));
    assert_eq!(
        decode(MS_WHEEL_DOWN),
        Action::Mouse(MouseAction::Wheel { dir: -1, speed: 0 })
    );
    assert_eq!(decode(mouse_accel(2)), Action::Mouse(MouseAction::Accel(2)));
}

#[test]
fn layer_ops() {
    let Action::Layer(op) = decode(layer_on(5, ON_PRESS)) else {
        panic!("not a layer op");
    };
    assert_eq!(
        op,
        LayerOp {
            op: OP_OR,
            on: ON_PRESS,
            part: 1,
            bits: 0b0010,
            extend: false
        }
    );
    assert!(op.fires(true));
    assert!(!op.fires(false));

    let Action::Layer(op) = decode(layer_off(6, ON_BOTH)) else {
        panic!("not a layer op");
    };
    assert_eq!(op.op, OP_AND);
    assert_eq!(op.bits, 0b1011);
    assert!(op.extend);
    assert!(op.fires(true) && op.fires(false));

    let Action::Layer(op) = decode(layer_toggle(3)) else {
        panic!("not a layer op");
    };
    assert_eq!((op.op, op.part, op.bits), (OP_XOR, 0, 0b1000));
    assert!(!op.fires(true));
}

#[test]
fn layer_on_zero_never_fires() {
    let Action::Layer(op) = decode(layer_bitop(OP_OR, 0, 1, 0)) else {
        panic!("not a layer op");
    };
    assert!(!op.fires(true) && !op.fires(false));
}

#[test]
fn layer_tap_and_layer_mods() {
    assert_eq!(
        decode(layer_tap(1, keycodes::D)),
        Action::LayerTap {
            layer: 1,
            key: keycodes::D
        }
    );
    let ext = layer_tap(20, keycodes::ESCAPE);
    assert_eq!(ext >> 12, variant::LAYER_TAP_EXT);
    assert_eq!(
        decode(ext),
        Action::LayerTap {
            layer: 20,
            key: keycodes::ESCAPE
        }
    );
    assert_eq!(
        decode(layer_mods(2, mods::CTRL | mods::SHIFT)),
        Action::LayerMods {
            layer: 2,
            mods: mods::CTRL | mods::SHIFT
        }
    );
    assert!(!decode(momentary(3)).is_dual());
}

#[test]
fn macro_backlight_and_commands() {
    assert_eq!(decode(macro_action(0x123)), Action::Macro(0x123));
    assert_eq!(decode(backlight(4)), Action::Backlight(4));
    assert_eq!(decode(BOOTLOADER), Action::Command(Command::Bootloader));
    assert_eq!(decode(USB_TOGGLE), Action::Command(Command::UsbToggle));
    assert_eq!(decode(BT_TOGGLE), Action::Command(Command::RadioToggle));
    assert_eq!(
        decode(radio_profile(7)),
        Action::Command(Command::RadioProfile(7))
    );
    assert_eq!(
        decode(radio_profile(13)),
        Action::Command(Command::RadioProfile(3))
    );
}
