use duokey_common::globals::*;

use super::*;

#[test]
fn empty_stream_keeps_defaults() {
    let config = Config::load([0u16]).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.tap_thresh_ms, 170);
    assert_eq!(config.tap_delay_ms, 87);
    assert_eq!(config.advertise_timeout_ms(), 60_000);
    assert_eq!(config.reconnect_window_ms(), 180_000);
    assert!(!config.nkro);
    assert!(config.radio_enabled);
}

#[test]
fn load_settings() {
    let config = Config::load([
        8,
        NKRO,
        1,
        TAP_THRESH,
        200,
        VERBOSE,
        1,
        RADIO_ENABLED,
        0,
    ])
    .unwrap();

    assert!(config.nkro);
    assert!(config.verbose);
    assert!(!config.radio_enabled);
    assert_eq!(config.tap_thresh_ms, 200);
    assert_eq!(config.tap_delay_ms, 87);
}

#[test]
fn floors_are_applied() {
    let config = Config::load([4, ADVERTISE_TIMEOUT, 3, TAP_DELAY, 500]).unwrap();
    assert_eq!(config.advertise_timeout_secs, ADVERTISE_TIMEOUT_MIN);
    assert_eq!(config.tap_delay_ms, config.tap_thresh_ms);
}

#[test]
fn corrupt_streams() {
    assert_eq!(Config::load([0u16; 0]), Err(ConfigError::Corrupt));
    assert_eq!(Config::load([3, NKRO, 1, 7]), Err(ConfigError::Corrupt));
    assert_eq!(Config::load([4, NKRO, 1]), Err(ConfigError::Corrupt));
    assert_eq!(
        Config::load([2u16, 99, 1]),
        Err(ConfigError::UnknownSetting(99))
    );
}
