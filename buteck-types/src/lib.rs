//! # Bu-TECK types
//!
//! Plain data types shared by the Bu-TECK keymap and its processing engine.
//!
//! - [`action`] - Key actions and function slots (layer-tap, mod-tap, one-shot)
//! - [`keycode`] - HID keyboard page keycodes
//! - [`modifier`] - Modifier combinations and report modifier bits

#![no_std]

pub mod action;
pub mod keycode;
pub mod modifier;
