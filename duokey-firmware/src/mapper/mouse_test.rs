use duokey_common::action_code::{decode, mouse_accel, Action, MS_RIGHT, MS_UP, MS_WHEEL_DOWN};

use super::*;

fn ma(code: u16) -> MouseAction {
    let Action::Mouse(ma) = decode(code) else {
        panic!("not a mouse action {code:#x}");
    };
    ma
}

fn mv(x: i8, y: i8, wheel: i8) -> Option<MouseEvent> {
    Some(MouseEvent::Move { x, y, wheel })
}

#[test]
fn buttons_accumulate() {
    let mut m = Mouse::new(MouseConfig::normal());
    assert_eq!(
        m.action(MouseAction::Buttons(1), true, 0),
        Some(MouseEvent::Buttons(1))
    );
    assert_eq!(
        m.action(MouseAction::Buttons(4), true, 0),
        Some(MouseEvent::Buttons(5))
    );
    assert_eq!(
        m.action(MouseAction::Buttons(1), false, 0),
        Some(MouseEvent::Buttons(4))
    );
    assert_eq!(m.next_flush(), None);
}

#[test]
fn movement_accelerates_and_resets() {
    let mut m = Mouse::new(MouseConfig::normal());

    assert_eq!(m.action(ma(MS_RIGHT), true, 100), mv(2, 0, 0));
    assert_eq!(m.next_flush(), Some(116));
    assert_eq!(m.flush(116), mv(3, 0, 0));
    assert_eq!(m.flush(132), mv(4, 0, 0));
    // a late flush moves further
    assert_eq!(m.flush(164), mv(10, 0, 0));

    for t in 0..30 {
        m.flush(180 + t * 16);
    }
    assert_eq!(m.flush(660), mv(20, 0, 0), "capped at max_speed");

    assert_eq!(m.action(ma(MS_RIGHT), false, 670), None);
    assert_eq!(m.next_flush(), None);
    assert_eq!(m.action(ma(MS_RIGHT), true, 700), mv(2, 0, 0));
}

#[test]
fn diagonal_from_two_keys() {
    let mut m = Mouse::new(MouseConfig::slow());
    m.action(ma(MS_RIGHT), true, 0);
    assert_eq!(m.action(ma(MS_UP), true, 0), mv(1, -1, 0));
    m.action(ma(MS_RIGHT), false, 5);
    assert_eq!(m.flush(16), mv(0, -2, 0));
}

#[test]
fn wheel_scrolls_at_rate() {
    let mut m = Mouse::new(MouseConfig::normal());
    assert_eq!(m.action(ma(MS_WHEEL_DOWN), true, 0), mv(0, 0, -1));
    // 10 clicks a second
    assert_eq!(m.flush(16), None);
    let clicks: i32 = (2..=63)
        .filter_map(|i| m.flush(i * 16))
        .map(|e| match e {
            MouseEvent::Move { wheel, .. } => wheel as i32,
            MouseEvent::Buttons(_) => 0,
        })
        .sum();
    assert_eq!(clicks, -10);
}

#[test]
fn wheel_key_held_across_clear_stays_stopped() {
    let mut m = Mouse::new(MouseConfig::normal());
    m.action(ma(MS_WHEEL_DOWN), true, 0);
    m.clear();
    assert_eq!(m.action(ma(MS_WHEEL_DOWN), false, 10), None);
    assert_eq!(m.wheel, 0);

    assert_eq!(m.action(ma(MS_WHEEL_DOWN), true, 20), mv(0, 0, -1));
    m.action(ma(MS_WHEEL_DOWN), false, 30);
    assert_eq!(m.next_flush(), None);
    assert_eq!(m.flush(1000), None);
}

#[test]
fn accel_selects_profile() {
    let mut m = Mouse::new(MouseConfig::normal());
    assert_eq!(m.action(ma(mouse_accel(2)), true, 0), None);
    assert_eq!(m.config, MouseConfig::fast());
    assert_eq!(m.action(ma(MS_RIGHT), true, 0), mv(4, 0, 0));
}
