//! ErgoDox matrix geometry.
//!
//! The matrix has 14 rows and 6 columns. A matrix row is a physical column of keys:
//! rows 0-6 are the left hand, rows 7-13 the right hand. 8 of the 84 positions have no switch.

use crate::event::KeyPos;

pub const ROW: usize = 14;
pub const COL: usize = 6;
/// Number of physical keys
pub const NUM_KEYS: usize = 76;

/// Matrix positions without a switch
pub const UNWIRED: [KeyPos; ROW * COL - NUM_KEYS] = [
    KeyPos::new(0, 5),
    KeyPos::new(5, 4),
    KeyPos::new(6, 2),
    KeyPos::new(6, 4),
    KeyPos::new(7, 2),
    KeyPos::new(7, 4),
    KeyPos::new(8, 4),
    KeyPos::new(13, 5),
];

/// Matrix position of key `0xXY`, the key in physical row X and physical column Y.
///
/// Same naming as QMK's `kXY` in the ergodox `KEYMAP` macro.
pub const fn pos(code: u8) -> KeyPos {
    KeyPos::new(code & 0x0F, code >> 4)
}

/// Matrix position of every key, in the order of [`ergodox_layer!`](crate::ergodox_layer)
#[rustfmt::skip]
pub const PHYSICAL_ORDER: [KeyPos; NUM_KEYS] = [
    // left hand
    pos(0x00), pos(0x01), pos(0x02), pos(0x03), pos(0x04), pos(0x05), pos(0x06),
    pos(0x10), pos(0x11), pos(0x12), pos(0x13), pos(0x14), pos(0x15), pos(0x16),
    pos(0x20), pos(0x21), pos(0x22), pos(0x23), pos(0x24), pos(0x25),
    pos(0x30), pos(0x31), pos(0x32), pos(0x33), pos(0x34), pos(0x35), pos(0x36),
    pos(0x40), pos(0x41), pos(0x42), pos(0x43), pos(0x44),
    pos(0x55), pos(0x56),
    pos(0x54),
    pos(0x53), pos(0x52), pos(0x51),
    // right hand
    pos(0x07), pos(0x08), pos(0x09), pos(0x0A), pos(0x0B), pos(0x0C), pos(0x0D),
    pos(0x17), pos(0x18), pos(0x19), pos(0x1A), pos(0x1B), pos(0x1C), pos(0x1D),
    pos(0x28), pos(0x29), pos(0x2A), pos(0x2B), pos(0x2C), pos(0x2D),
    pos(0x37), pos(0x38), pos(0x39), pos(0x3A), pos(0x3B), pos(0x3C), pos(0x3D),
    pos(0x49), pos(0x4A), pos(0x4B), pos(0x4C), pos(0x4D),
    pos(0x57), pos(0x58),
    pos(0x59),
    pos(0x5C), pos(0x5B), pos(0x5A),
];

pub fn is_wired(row: usize, col: usize) -> bool {
    row < ROW && col < COL && !UNWIRED.contains(&KeyPos::new(row as u8, col as u8))
}

/// Matrix position of the `index`th key in physical order
pub fn physical_position(index: usize) -> Option<KeyPos> {
    PHYSICAL_ORDER.get(index).copied()
}
