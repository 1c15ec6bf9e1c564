use super::*;

#[test]
fn accelerate_is_bounded() {
    let config = MouseConfig::normal();
    let mut speed = config.base_speed;
    for _ in 0..100 {
        let next = config.accelerate(speed);
        assert!(next >= speed);
        speed = next;
    }
    assert_eq!(speed, config.max_speed);
}

#[test]
fn movement_scales_with_elapsed_time() {
    assert_eq!(movement(4, 16), 4);
    assert_eq!(movement(4, 32), 8);
    assert_eq!(movement(4, 8), 2);
    assert_eq!(movement(0, 100), 0);
    assert_eq!(movement(40, 1000), 127);
}

#[test]
fn profiles() {
    assert_eq!(MouseConfig::profile(0), MouseConfig::slow());
    assert_eq!(MouseConfig::profile(1), MouseConfig::default());
    assert_eq!(MouseConfig::profile(9), MouseConfig::fast());
}
