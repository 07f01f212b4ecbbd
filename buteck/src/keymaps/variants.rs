//! Variants of the Bu-TECK layout.
//!
//! Every variant is the base layout from [`get_default_keymap`] plus a short list of overrides.
//! Overrides only move auxiliary symbols, letters and digits stay where they are.

use crate::action::KeyAction;
use crate::ergodox::{self, COL, ROW, pos};
use crate::event::KeyPos;
use crate::keymap::KeymapError;
use crate::keymaps::zutatensuppe::{L1_LFT, L2_RGT, L4_FKS, MacroId, NUM_LAYER, get_default_keymap};
use crate::{k, m, shifted};

pub type Layers = [[[KeyAction; COL]; ROW]; NUM_LAYER];

/// Replaces the action at `pos` on `layer`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Override {
    pub layer: u8,
    pub pos: KeyPos,
    pub action: KeyAction,
}

const fn ov(layer: u8, code: u8, action: KeyAction) -> Override {
    Override {
        layer,
        pos: pos(code),
        action,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// The base layout as is
    #[default]
    Classic,
    /// Euro and pound macro keys on the top row of the f-key layer. They type nothing
    EuroPound,
    /// `[` and `]` take the places of `(` and `)`, and the other way around
    BracketSwap,
    /// `;` moves to the right pinky column of the right symbol layer, `/` takes its place on the left
    SemicolonRight,
}

const EURO_POUND: [Override; 2] = [
    ov(L4_FKS, 0x05, m!(MacroId::Euro)),
    ov(L4_FKS, 0x06, m!(MacroId::Pound)),
];

const BRACKET_SWAP: [Override; 4] = [
    ov(L2_RGT, 0x19, k!(LeftBracket)),
    ov(L2_RGT, 0x1B, k!(RightBracket)),
    ov(L2_RGT, 0x29, shifted!(Kc9)),
    ov(L2_RGT, 0x2B, shifted!(Kc0)),
];

const SEMICOLON_RIGHT: [Override; 2] = [
    ov(L1_LFT, 0x34, k!(Slash)),
    ov(L2_RGT, 0x1C, k!(Semicolon)),
];

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Classic,
        Variant::EuroPound,
        Variant::BracketSwap,
        Variant::SemicolonRight,
    ];

    pub fn overrides(self) -> &'static [Override] {
        match self {
            Variant::Classic => &[],
            Variant::EuroPound => &EURO_POUND,
            Variant::BracketSwap => &BRACKET_SWAP,
            Variant::SemicolonRight => &SEMICOLON_RIGHT,
        }
    }

    /// Apply the overrides of this variant to `layers`
    pub fn apply(self, layers: &mut Layers) -> Result<(), KeymapError> {
        apply_overrides(layers, self.overrides())
    }

    /// The full layout of this variant
    pub fn keymap(self) -> Result<Layers, KeymapError> {
        let mut layers = get_default_keymap();
        self.apply(&mut layers)?;
        Ok(layers)
    }
}

/// Write `overrides` into `layers`. Nothing is written if any override is invalid
pub fn apply_overrides(layers: &mut Layers, overrides: &[Override]) -> Result<(), KeymapError> {
    for o in overrides {
        if o.layer as usize >= NUM_LAYER {
            return Err(KeymapError::LayerOutOfRange(o.layer));
        }
        let (row, col) = (o.pos.row as usize, o.pos.col as usize);
        if row >= ROW || col >= COL {
            return Err(KeymapError::PositionOutOfRange {
                row: o.pos.row,
                col: o.pos.col,
            });
        }
        if !ergodox::is_wired(row, col) {
            return Err(KeymapError::UnwiredPosition {
                row: o.pos.row,
                col: o.pos.col,
            });
        }
    }
    for o in overrides {
        layers[o.layer as usize][o.pos.row as usize][o.pos.col as usize] = o.action;
    }
    Ok(())
}
