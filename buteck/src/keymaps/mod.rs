//! Keymaps shipped with the crate

pub mod variants;
pub mod zutatensuppe;
