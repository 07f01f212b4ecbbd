//! Bu-TECK inspired layout, credit to Oobly:
//! <https://geekhack.org/index.php?topic=49721.msg1078758#msg1078758>
//!
//! To be used with the QWERTY US 101-key layout on the host. Home row keys are mod-taps and layer-taps,
//! holding a key on one hand activates the symbol layer of the other hand.

use strum::FromRepr;

use crate::action::{Function, KeyAction};
use crate::ergodox::{COL, ROW, pos};
use crate::event::KeyPos;
use crate::hid::ModifierService;
use crate::keyboard_macros::{MacroHandler, MacroOperation, MacroSequence, define_macro_sequence};
use crate::keycode::KeyCode;
use crate::modifier::{HidModifiers, LALT, LCTRL, LGUI, LSHIFT};
use crate::{a, ergodox_layer, f, k, m, shifted};

pub const L0_DEF: u8 = 0;
/// Navigation and symbols, left hand
pub const L1_LFT: u8 = 1;
/// Symbols and brackets, right hand
pub const L2_RGT: u8 = 2;
/// Numpad, right hand
pub const L3_NUM: u8 = 3;
/// F-keys and umlauts, left hand
pub const L4_FKS: u8 = 4;
pub const NUM_LAYER: usize = 5;

/// Pause after every step of an Alt-code macro, in ms
pub const ALT_CODE_INTERVAL: u16 = 10;

/// Function slots of this layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FunctionId {
    Nml,
    Tml,
    Hms,
    Ems,
    Sma,
    Oma,
    Amn,
    Imf,
    Rmg,
    Umg,
    Ctl,
    Alt,
    Sft,
}

impl FunctionId {
    pub const ALL: [FunctionId; 13] = [
        FunctionId::Nml,
        FunctionId::Tml,
        FunctionId::Hms,
        FunctionId::Ems,
        FunctionId::Sma,
        FunctionId::Oma,
        FunctionId::Amn,
        FunctionId::Imf,
        FunctionId::Rmg,
        FunctionId::Umg,
        FunctionId::Ctl,
        FunctionId::Alt,
        FunctionId::Sft,
    ];

    pub const fn function(self) -> Function {
        match self {
            FunctionId::Nml => Function::LayerTap { layer: L1_LFT, key: KeyCode::N },
            FunctionId::Tml => Function::LayerTap { layer: L2_RGT, key: KeyCode::T },
            FunctionId::Hms => Function::ModTap { modifier: LSHIFT, key: KeyCode::H },
            FunctionId::Ems => Function::ModTap { modifier: LSHIFT, key: KeyCode::E },
            FunctionId::Sma => Function::ModTap { modifier: LALT, key: KeyCode::S },
            FunctionId::Oma => Function::ModTap { modifier: LALT, key: KeyCode::O },
            FunctionId::Amn => Function::LayerTap { layer: L3_NUM, key: KeyCode::A },
            FunctionId::Imf => Function::LayerTap { layer: L4_FKS, key: KeyCode::I },
            FunctionId::Rmg => Function::ModTap { modifier: LGUI, key: KeyCode::R },
            FunctionId::Umg => Function::ModTap { modifier: LGUI, key: KeyCode::U },
            FunctionId::Ctl => Function::OneShotModifier(LCTRL),
            FunctionId::Alt => Function::OneShotModifier(LALT),
            FunctionId::Sft => Function::OneShotModifier(LSHIFT),
        }
    }
}

/// Macro slots of this layout, the discriminant is the id in `Action::TriggerMacro`
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroId {
    /// Declared, but types nothing
    Euro,
    /// Declared, but types nothing
    Pound,
    AUml,
    OUml,
    UUml,
    SzLig,
}

/// Alt-codes of the uppercase umlauts. No key uses them unless [`UmlautMacros::shift_aware`] is set.
pub const UMLAUT_SHIFTED_CODES: [(MacroId, u16); 3] = [(MacroId::AUml, 142), (MacroId::OUml, 153), (MacroId::UUml, 154)];

impl MacroId {
    /// Windows Alt-code typed by this macro, in the OEM code page
    pub fn alt_code(self, shifted: bool) -> Option<u16> {
        if shifted {
            if let Some(&(_, code)) = UMLAUT_SHIFTED_CODES.iter().find(|(id, _)| *id == self) {
                return Some(code);
            }
        }
        match self {
            MacroId::AUml => Some(132),
            MacroId::OUml => Some(148),
            MacroId::UUml => Some(129),
            MacroId::SzLig => Some(225),
            MacroId::Euro | MacroId::Pound => None,
        }
    }
}

/// Type `code` as a Windows Alt-code: hold left alt and tap its digits on the keypad
pub fn alt_code_sequence(code: u16) -> Option<MacroSequence> {
    let mut digits = [0u8; 5];
    let mut len = 0;
    let mut rest = code;
    loop {
        digits[len] = (rest % 10) as u8;
        len += 1;
        rest /= 10;
        if rest == 0 {
            break;
        }
    }

    let mut seq = define_macro_sequence(&[
        MacroOperation::Interval(ALT_CODE_INTERVAL),
        MacroOperation::Press(KeyCode::LAlt),
    ])?;
    for &d in digits[..len].iter().rev() {
        let key = KeyCode::keypad_digit(d)?;
        seq.push(MacroOperation::Tap(key)).ok()?;
    }
    seq.push(MacroOperation::Release(KeyCode::LAlt)).ok()?;
    Some(seq)
}

/// Macro handler of this layout, types umlauts and ß through Alt-codes
#[derive(Clone, Copy, Debug, Default)]
pub struct UmlautMacros {
    /// Type the uppercase umlaut when shift is held
    pub shift_aware: bool,
}

impl MacroHandler for UmlautMacros {
    /// On release this always unregisters left ctrl and types nothing, for every macro id.
    /// A left ctrl held by another key, e.g. a one shot ctrl in its held state, is dropped as well.
    fn action_get_macro(&self, id: u8, pressed: bool, mods: &mut dyn ModifierService) -> Option<MacroSequence> {
        if !pressed {
            mods.unregister_mods(HidModifiers::LEFT_CTRL);
            return None;
        }

        let Some(macro_id) = MacroId::from_repr(id) else {
            warn!("Unknown macro id {}", id);
            return None;
        };
        let shifted = self.shift_aware && mods.modifiers().shifted();
        let code = macro_id.alt_code(shifted)?;
        debug!("Macro {:?}: alt code {}", macro_id, code);
        alt_code_sequence(code)
    }
}

/// Keys which do nothing on the base layer
pub const UNUSED_BASE_POSITIONS: [KeyPos; 8] = [
    pos(0x20),
    pos(0x41),
    pos(0x42),
    pos(0x1C),
    pos(0x1D),
    pos(0x2D),
    pos(0x3D),
    pos(0x5C),
];

const TRNS: KeyAction = a!(Transparent);
const NO: KeyAction = a!(No);

#[rustfmt::skip]
pub const fn get_default_keymap() -> [[[KeyAction; COL]; ROW]; NUM_LAYER] {
    [
        // Layer 0
        ergodox_layer!(
            // left hand
            k!(Escape),            k!(Kc1),               k!(Kc2),               k!(Kc3),               k!(Kc4),               k!(Kc5),  k!(LGui),
            k!(Tab),               k!(Q),                 k!(D),                 f!(FunctionId::Rmg),   k!(W),                 k!(B),    k!(Right),
            NO,                    f!(FunctionId::Amn),   f!(FunctionId::Sma),   f!(FunctionId::Hms),   f!(FunctionId::Tml),   k!(G),
            f!(FunctionId::Sft),   k!(Z),                 k!(X),                 k!(M),                 k!(C),                 k!(V),    k!(Left),
            k!(KbMute),            NO,                    NO,                    f!(FunctionId::Alt),   f!(FunctionId::Ctl),
                                                                k!(LShift), k!(Home),
                                                                            k!(End),
                                                    k!(Tab),    k!(Backspace), k!(Escape),
            // right hand
            k!(PrintScreen), k!(Kc6), k!(Kc7),              k!(Kc8),               k!(Kc9),               k!(Kc0),               k!(Delete),
            k!(Up),          k!(J),   k!(F),                f!(FunctionId::Umg),   k!(P),                 NO,                    NO,
                             k!(Y),   f!(FunctionId::Nml),  f!(FunctionId::Ems),   f!(FunctionId::Oma),   f!(FunctionId::Imf),   NO,
            k!(Down),        k!(K),   k!(L),                k!(Comma),             k!(Dot),               k!(Minus),             NO,
                                      f!(FunctionId::Ctl),  f!(FunctionId::Alt),   k!(KbVolumeUp),        k!(KbVolumeDown),      k!(NumLock),
            k!(PageUp),   k!(LShift),
            k!(PageDown),
            NO,           k!(Enter),  k!(Space)
        ),
        // Layer 1, left hand, held by N
        ergodox_layer!(
            TRNS,          k!(F1),          k!(F2),    k!(F3),    k!(F4),         k!(F5),          k!(F11),
            TRNS,          shifted!(Kc6),   k!(Slash), k!(Up),    k!(Backslash),  k!(KpAsterisk),  k!(Home),
            TRNS,          k!(Home),        k!(Left),  k!(Down),  k!(Right),      k!(End),
            k!(CapsLock),  shifted!(Kc7),   TRNS,      TRNS,      k!(Semicolon),  shifted!(Kc4),   k!(End),
            TRNS,          TRNS,            TRNS,      TRNS,      TRNS,
                                                       TRNS, TRNS,
                                                             TRNS,
                                           TRNS, k!(Delete), TRNS,
            // right hand
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
                  TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
                        TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS,
            TRNS,
            TRNS, TRNS, TRNS
        ),
        // Layer 2, right hand, held by T
        ergodox_layer!(
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS,
                                    TRNS, TRNS,
                                          TRNS,
                              TRNS, TRNS, TRNS,
            // right hand
            k!(F12),       k!(F6),          k!(F7),           k!(F8),           k!(F9),            k!(F10),    k!(Backspace),
            k!(PageUp),    k!(Grave),       shifted!(Kc9),    shifted!(Kc1),    shifted!(Kc0),     TRNS,       TRNS,
                           k!(Equal),       k!(LeftBracket),  shifted!(Kc3),    k!(RightBracket),  k!(Quote),  TRNS,
            k!(PageDown),  shifted!(Kc5),   TRNS,             TRNS,             TRNS,              TRNS,       TRNS,
                                            TRNS,             TRNS,             TRNS,              TRNS,       TRNS,
            TRNS, TRNS,
            TRNS,
            TRNS, TRNS, TRNS
        ),
        // Layer 3, numpad, held by A
        ergodox_layer!(
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS,
                                    TRNS, TRNS,
                                          TRNS,
                              TRNS, TRNS, TRNS,
            // right hand
            TRNS, TRNS,    TRNS,       TRNS,        TRNS,       TRNS,           TRNS,
            TRNS, TRNS,    k!(Kp7),    k!(Kp8),     k!(Kp9),    k!(KpSlash),    TRNS,
                  TRNS,    k!(Kp4),    k!(Kp5),     k!(Kp6),    k!(KpAsterisk), TRNS,
            TRNS, TRNS,    k!(Kp1),    k!(Kp2),     k!(Kp3),    k!(KpMinus),    TRNS,
                           k!(Kp0),    k!(KpDot),   k!(KpComma), k!(KpPlus),    k!(KpEnter),
            TRNS, TRNS,
            TRNS,
            TRNS, TRNS, TRNS
        ),
        // Layer 4, f-keys and umlauts, held by I
        ergodox_layer!(
            TRNS, m!(MacroId::AUml), m!(MacroId::OUml), m!(MacroId::UUml), m!(MacroId::SzLig), TRNS,     TRNS,
            TRNS, TRNS,              k!(F7),            k!(F8),            k!(F9),             TRNS,     TRNS,
            TRNS, k!(F11),           k!(F4),            k!(F5),            k!(F6),             k!(F12),
            TRNS, TRNS,              k!(F1),            k!(F2),            k!(F3),             TRNS,     TRNS,
            TRNS, TRNS,              TRNS,              TRNS,              k!(F10),
                                    TRNS, TRNS,
                                          TRNS,
                              TRNS, TRNS, TRNS,
            // right hand
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
                  TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS, TRNS, TRNS, TRNS, TRNS, TRNS,
                        TRNS, TRNS, TRNS, TRNS, TRNS,
            TRNS, TRNS,
            TRNS,
            TRNS, TRNS, TRNS
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::HidState;

    fn taps(seq: &MacroSequence) -> Vec<KeyCode> {
        seq.iter()
            .filter_map(|op| match op {
                MacroOperation::Tap(k) => Some(*k),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_umlaut_sequences() {
        let mut hid = HidState::new();
        let handler = UmlautMacros::default();
        let cases = [
            (MacroId::AUml, [KeyCode::Kp1, KeyCode::Kp3, KeyCode::Kp2]),
            (MacroId::OUml, [KeyCode::Kp1, KeyCode::Kp4, KeyCode::Kp8]),
            (MacroId::UUml, [KeyCode::Kp1, KeyCode::Kp2, KeyCode::Kp9]),
            (MacroId::SzLig, [KeyCode::Kp2, KeyCode::Kp2, KeyCode::Kp5]),
        ];
        for (id, digits) in cases {
            let seq = handler.action_get_macro(id as u8, true, &mut hid).unwrap();
            assert_eq!(seq[0], MacroOperation::Interval(10));
            assert_eq!(seq[1], MacroOperation::Press(KeyCode::LAlt));
            assert_eq!(taps(&seq), digits);
            assert_eq!(*seq.last().unwrap(), MacroOperation::Release(KeyCode::LAlt));
            assert_eq!(seq.len(), 6);
        }
    }

    #[test]
    fn test_unhandled_macros() {
        let mut hid = HidState::new();
        let handler = UmlautMacros::default();
        assert!(handler.action_get_macro(MacroId::Euro as u8, true, &mut hid).is_none());
        assert!(handler.action_get_macro(MacroId::Pound as u8, true, &mut hid).is_none());
        assert!(handler.action_get_macro(42, true, &mut hid).is_none());
    }

    #[test]
    fn test_release_unregisters_left_ctrl_for_every_id() {
        let handler = UmlautMacros::default();
        for id in [MacroId::Euro as u8, MacroId::SzLig as u8, 200] {
            let mut hid = HidState::new();
            hid.register_mods(HidModifiers::LEFT_CTRL | HidModifiers::LEFT_SHIFT);
            assert!(handler.action_get_macro(id, false, &mut hid).is_none());
            assert_eq!(hid.modifiers(), HidModifiers::LEFT_SHIFT);
        }
    }

    #[test]
    fn test_shift_aware_umlauts() {
        let mut hid = HidState::new();
        hid.register_mods(HidModifiers::LEFT_SHIFT);

        // Shift is ignored by default
        let seq = UmlautMacros::default().action_get_macro(MacroId::AUml as u8, true, &mut hid).unwrap();
        assert_eq!(taps(&seq), [KeyCode::Kp1, KeyCode::Kp3, KeyCode::Kp2]);

        let handler = UmlautMacros { shift_aware: true };
        let seq = handler.action_get_macro(MacroId::AUml as u8, true, &mut hid).unwrap();
        assert_eq!(taps(&seq), [KeyCode::Kp1, KeyCode::Kp4, KeyCode::Kp2]);
        let seq = handler.action_get_macro(MacroId::SzLig as u8, true, &mut hid).unwrap();
        assert_eq!(taps(&seq), [KeyCode::Kp2, KeyCode::Kp2, KeyCode::Kp5]);
    }

    #[test]
    fn test_alt_code_sequence_lengths() {
        assert_eq!(taps(&alt_code_sequence(0).unwrap()), [KeyCode::Kp0]);
        assert_eq!(taps(&alt_code_sequence(65).unwrap()), [KeyCode::Kp6, KeyCode::Kp5]);
        assert_eq!(
            taps(&alt_code_sequence(1000).unwrap()),
            [KeyCode::Kp1, KeyCode::Kp0, KeyCode::Kp0, KeyCode::Kp0]
        );
    }

    #[test]
    fn test_function_slots() {
        let keymap = get_default_keymap();
        let at = |layer: usize, code: u8| {
            let p = pos(code);
            keymap[layer][p.row as usize][p.col as usize]
        };
        // Home row
        assert_eq!(at(0, 0x21), FunctionId::Amn.function().to_key_action());
        assert_eq!(at(0, 0x24), FunctionId::Tml.function().to_key_action());
        assert_eq!(at(0, 0x29), FunctionId::Nml.function().to_key_action());
        assert_eq!(at(0, 0x2C), FunctionId::Imf.function().to_key_action());
        // One shot modifiers on both hands
        assert_eq!(at(0, 0x30), FunctionId::Sft.function().to_key_action());
        assert_eq!(at(0, 0x44), at(0, 0x49));
        // Layer 4 umlauts
        assert_eq!(at(4, 0x01), m!(MacroId::AUml));
        assert_eq!(at(4, 0x04), m!(MacroId::SzLig));
        // Shifted symbols
        assert_eq!(at(2, 0x19), shifted!(Kc9));
        assert_eq!(at(3, 0x4B), k!(KpComma));
    }

    #[test]
    fn test_every_function_slot_is_bound() {
        let keymap = get_default_keymap();
        for id in FunctionId::ALL {
            let action = id.function().to_key_action();
            assert!(keymap[0].iter().flatten().any(|a| *a == action), "{:?} is not bound", id);
        }
    }
}
