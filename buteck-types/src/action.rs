//! Keyboard actions.
//!
//! Key types:
//! - [`Action`] - Single operations that a key sends or executes
//! - [`KeyAction`] - How a key behaves: plain, tap/hold, one-shot
//! - [`Function`] - A named function slot of a layout, lowered into a [`KeyAction`]

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::keycode::KeyCode;
use crate::modifier::ModifierCombination;

/// A KeyAction is the action at a keyboard position, stored in keymap.
/// It can be a single action like triggering a key, or a composite action like tap/hold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action. Serialized as 0x0000.
    No,
    /// Transparent action, next layer will be checked.
    Transparent,
    /// A single action, such as triggering a key, or activating a layer.
    /// Action is triggered when pressed and cancelled when released.
    Single(Action),
    /// An action with extra modifiers held together, used for shifted symbols like `!` or `(`.
    WithModifier(Action, ModifierCombination),
    /// Tap/hold action, (tap, hold).
    /// The tap action is triggered when the key is released before the tapping term,
    /// the hold action is triggered once the tapping term elapses while the key is down.
    TapHold(Action, Action),
    /// One-shot action, applies to the next key only.
    OneShot(Action),
}

impl KeyAction {
    pub fn is_transparent(&self) -> bool {
        matches!(self, KeyAction::Transparent)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, KeyAction::No)
    }

    /// The key this action would eventually send, if any.
    ///
    /// For tap/hold keys this is the tap key.
    pub fn keycode(&self) -> Option<KeyCode> {
        match self {
            KeyAction::Single(Action::Key(k))
            | KeyAction::WithModifier(Action::Key(k), _)
            | KeyAction::TapHold(Action::Key(k), _)
            | KeyAction::OneShot(Action::Key(k)) => Some(*k),
            _ => None,
        }
    }
}

/// A single basic action that a keyboard can execute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Default action, no action.
    No,
    /// Transparent action, next layer will be checked.
    Transparent,
    /// A normal key stroke, uses for all keycodes defined in `KeyCode` enum, including modifiers.
    Key(KeyCode),
    /// Modifier combination, held while the key is down
    Modifier(ModifierCombination),
    /// Activate a layer while the key is held
    LayerOn(u8),
    /// Ask the layout's macro handler for a sequence, the payload is the macro id
    TriggerMacro(u8),
}

/// A function slot of a layout.
///
/// Layouts name their slots with their own enum and map each slot to a `Function`.
/// The mapping is exhaustive, so a slot can never point outside of the table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Function {
    /// Hold: layer `layer` is active while held. Tap: `key`.
    LayerTap { layer: u8, key: KeyCode },
    /// Hold: `modifier` is registered while held. Tap: `key`.
    ModTap { modifier: ModifierCombination, key: KeyCode },
    /// `modifier` applies to the next key only
    OneShotModifier(ModifierCombination),
}

impl Function {
    pub const fn to_key_action(self) -> KeyAction {
        match self {
            Function::LayerTap { layer, key } => KeyAction::TapHold(Action::Key(key), Action::LayerOn(layer)),
            Function::ModTap { modifier, key } => KeyAction::TapHold(Action::Key(key), Action::Modifier(modifier)),
            Function::OneShotModifier(modifier) => KeyAction::OneShot(Action::Modifier(modifier)),
        }
    }
}

impl From<Function> for KeyAction {
    fn from(f: Function) -> Self {
        f.to_key_action()
    }
}
