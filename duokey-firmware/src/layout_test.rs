use duokey_common::{
    action_code::{
        decode, layer_bitop, layer_off, layer_on, Action, ON_BOTH, ON_PRESS, ON_RELEASE,
    },
    keycodes::*,
};

use super::*;

const T: ActionCode = TRANSPARENT;

fn manager(keymap: &[&[ActionCode]]) -> Manager<4, 8> {
    let mut m = Manager::default();
    m.register(keymap).unwrap();
    m
}

#[test]
fn register_validates_shape() {
    let mut m = Manager::<4, 2>::default();
    assert!(!m.is_loaded());
    assert_eq!(m.register(&[]), Err(LoadError::LayerCount));
    assert_eq!(
        m.register(&[&[1, 2, 3, 4], &[1, 2, 3, 4], &[1, 2, 3, 4]]),
        Err(LoadError::LayerCount)
    );
    assert_eq!(m.register(&[&[1, 2, 3]]), Err(LoadError::LayerSize));
    assert!(!m.is_loaded());

    m.register(&[&[A as u16, B as u16, C as u16, D as u16]])
        .unwrap();
    m.mask_mut().activate(1);

    // a bad keymap leaves the old one and its mask alone
    assert_eq!(m.register(&[&[1]]), Err(LoadError::LayerSize));
    assert_eq!(m.resolve(2), C as u16);
    assert_eq!(m.mask().bits(), 0b11);

    m.register(&[&[E as u16, T, T, T]]).unwrap();
    assert_eq!(m.mask(), LayerMask::BASE);
}

#[test]
fn resolve_uses_highest_active_layer() {
    let mut m = manager(&[
        &[A as u16, B as u16, C as u16, D as u16],
        &[E as u16, T, T, T],
        &[F as u16, G as u16, T, T],
    ]);
    assert_eq!(m.resolve(0), A as u16);

    m.mask_mut().activate(1);
    assert_eq!(m.resolve(0), E as u16);
    assert_eq!(m.resolve(1), B as u16);

    m.mask_mut().activate(2);
    assert_eq!(m.resolve(0), F as u16);
    assert_eq!(m.resolve(1), G as u16);
    assert_eq!(m.resolve(2), C as u16);

    m.mask_mut().deactivate(2);
    assert_eq!(m.resolve(1), B as u16);

    assert_eq!(m.resolve(4), NO);
    assert_eq!(m.resolve(100), NO);
}

#[test]
fn transparent_falls_through_to_layer_zero_for_any_mask() {
    let m_codes: [&[ActionCode]; 8] = [
        &[A as u16, B as u16, C as u16, D as u16],
        &[T; 4],
        &[T; 4],
        &[T; 4],
        &[T; 4],
        &[T; 4],
        &[T; 4],
        &[T; 4],
    ];
    let mut m = manager(&m_codes);
    for mask in 0..=0xffu32 {
        *m.mask_mut() = LayerMask(mask);
        assert_eq!(m.resolve(3), D as u16, "mask {mask:#x}");
    }
}

#[test]
fn transparent_on_every_layer_is_noop() {
    let mut m = manager(&[&[T; 4], &[T; 4]]);
    m.mask_mut().activate(1);
    assert_eq!(m.resolve(0), NO);
}

#[test]
fn inactive_layers_are_skipped() {
    let mut m = manager(&[&[A as u16; 4], &[B as u16; 4], &[T; 4]]);
    m.mask_mut().activate(2);
    assert_eq!(m.resolve(0), A as u16);
}

#[test]
fn or_touches_only_its_nibble() {
    for part in 0..8u8 {
        for bits in 0..16u8 {
            let before = 0x5a5a_a5a5u32;
            let mut mask = LayerMask(before);
            assert!(mask.apply(OP_OR, ON_PRESS, true, part, bits, false));
            let slot = 0xfu32 << (part * 4);
            assert_eq!(mask.bits() & !slot, before & !slot);
            assert_eq!(
                mask.bits() & slot,
                (before & slot) | ((bits as u32) << (part * 4))
            );
        }
    }
}

#[test]
fn phase_filter() {
    let mut mask = LayerMask::BASE;
    assert!(!mask.apply(OP_OR, ON_RELEASE, true, 0, 0b10, false));
    assert_eq!(mask, LayerMask::BASE);
    assert!(mask.apply(OP_OR, ON_RELEASE, false, 0, 0b10, false));
    assert_eq!(mask.bits(), 0b11);
    assert!(!mask.apply(OP_XOR, 0, true, 0, 0b10, false));
    assert!(mask.apply(OP_XOR, ON_BOTH, true, 0, 0b10, false));
    assert_eq!(mask.bits(), 0b01);
}

#[test]
fn extend_clears_a_single_layer() {
    let mut mask = LayerMask(0xffff_ffff);
    let Action::Layer(op) = decode(layer_off(13, ON_PRESS)) else {
        panic!("not a layer op");
    };
    assert!(mask.apply_op(&op, true));
    assert_eq!(mask.bits(), !(1 << 13));

    let Action::Layer(op) = decode(layer_on(13, ON_PRESS)) else {
        panic!("not a layer op");
    };
    mask.apply_op(&op, true);
    assert_eq!(mask.bits(), 0xffff_ffff);
}

#[test]
fn set_replaces_mask() {
    let mut mask = LayerMask(0b1011);
    let Action::Layer(op) = decode(layer_bitop(OP_SET, 1, 0b0100, ON_PRESS)) else {
        panic!("not a layer op");
    };
    mask.apply_op(&op, true);
    assert_eq!(mask.bits(), 1 << 6);
}
