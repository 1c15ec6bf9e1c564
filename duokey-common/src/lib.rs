#![no_std]
//! Definitions shared between keymaps and the duokey firmware.
//!
//! [action_code] describes the 16 bit instruction each key position is mapped to, [keycodes] the
//! HID usage ids those instructions refer to.

pub mod action_code;
pub mod globals;
pub mod keycodes;
pub mod mouse;
