//! Macro sequences and the handler which produces them.

use heapless::Vec;

use crate::hid::ModifierService;
use crate::keycode::KeyCode;

/// Max number of operations in one macro sequence
pub const MACRO_MAX_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroOperation {
    /// Press a key, or register a modifier for modifier keycodes
    Press(KeyCode),
    /// Release a key
    Release(KeyCode),
    /// Press and release a key
    Tap(KeyCode),
    /// Wait once, in ms
    Delay(u16),
    /// Wait this many ms after every following operation
    Interval(u16),
}

pub type MacroSequence = Vec<MacroOperation, MACRO_MAX_LEN>;

/// Produces macro sequences for `Action::TriggerMacro` keys.
///
/// Called on both press and release of a macro key. `mods` is the keyboard's modifier state,
/// a handler may change it directly. Returning `None` means no action.
pub trait MacroHandler {
    fn action_get_macro(&self, id: u8, pressed: bool, mods: &mut dyn ModifierService) -> Option<MacroSequence>;
}

/// Build a sequence from a slice, `None` if it's longer than [`MACRO_MAX_LEN`]
pub fn define_macro_sequence(ops: &[MacroOperation]) -> Option<MacroSequence> {
    Vec::from_slice(ops).ok()
}
