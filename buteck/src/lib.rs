//! # Bu-TECK
//!
//! The Bu-TECK layout for ErgoDox keyboards, together with the engine which turns key events into
//! HID reports: layer stack, tap/hold, one shot modifiers and macros.
//!
//! The engine is synchronous at its core, [`keyboard::Keyboard::process`] and [`keyboard::Keyboard::tick`]
//! fill an output queue. [`keyboard::Keyboard::run`] wraps it for firmware, using [`channel`]s.

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod channel;
pub mod config;
pub mod ergodox;
pub mod event;
pub mod hid;
pub mod keyboard;
pub mod keyboard_macros;
pub mod keymap;
pub mod keymaps;
pub mod layout_macro;

pub use buteck_types::{action, keycode, modifier};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

pub type RawMutex = CriticalSectionRawMutex;

/// Capacity of the key event channel
pub const EVENT_CHANNEL_SIZE: usize = 16;
/// Capacity of the keyboard report channel
pub const REPORT_CHANNEL_SIZE: usize = 16;
