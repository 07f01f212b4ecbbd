//! HID reports and the modifier/key state they are built from.

use usbd_hid::descriptor::SerializedDescriptor;

use crate::keycode::KeyCode;
use crate::modifier::HidModifiers;

/// Number of keycode slots in a boot keyboard report
pub const KEYCODE_SLOTS: usize = 6;

/// 8-byte boot keyboard report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    pub modifier: u8,
    pub reserved: u8,
    pub leds: u8,
    pub keycodes: [u8; KEYCODE_SLOTS],
}

impl KeyboardReport {
    /// Report descriptor matching this report's layout
    pub fn descriptor() -> &'static [u8] {
        usbd_hid::descriptor::KeyboardReport::desc()
    }

    pub fn modifiers(&self) -> HidModifiers {
        HidModifiers::from_bits(self.modifier)
    }

    /// `true` if `key` is in one of the keycode slots
    pub fn contains(&self, key: KeyCode) -> bool {
        self.keycodes.contains(&(key as u8))
    }
}

impl From<KeyboardReport> for usbd_hid::descriptor::KeyboardReport {
    fn from(r: KeyboardReport) -> Self {
        Self {
            modifier: r.modifier,
            reserved: r.reserved,
            leds: r.leds,
            keycodes: r.keycodes,
        }
    }
}

/// Access to the modifier state of the keyboard.
///
/// Macro handlers get this injected instead of touching global state.
pub trait ModifierService {
    /// Register modifiers, they stay in every report until unregistered
    fn register_mods(&mut self, mods: HidModifiers);
    /// Unregister modifiers. Bits which are not registered are ignored
    fn unregister_mods(&mut self, mods: HidModifiers);
    /// Currently registered modifiers
    fn modifiers(&self) -> HidModifiers;
}

/// Keys and modifiers which are currently sent to the host
#[derive(Clone, Debug)]
pub struct HidState {
    keycodes: [KeyCode; KEYCODE_SLOTS],
    /// Modifiers registered by modifier keys, held mod-taps and macros
    modifiers: HidModifiers,
    /// Modifiers which belong to a shifted symbol key, e.g. `(`
    key_modifiers: HidModifiers,
}

impl HidState {
    pub fn new() -> Self {
        Self {
            keycodes: [KeyCode::No; KEYCODE_SLOTS],
            modifiers: HidModifiers::new(),
            key_modifiers: HidModifiers::new(),
        }
    }

    /// Add a key to the report. Modifier keycodes register their modifier bit instead.
    ///
    /// Returns `false` if all keycode slots are in use.
    pub fn register_key(&mut self, key: KeyCode) -> bool {
        if key.is_modifier() {
            self.modifiers |= key.to_hid_modifiers();
            return true;
        }
        if !key.is_simple_key() || self.keycodes.contains(&key) {
            return true;
        }
        match self.keycodes.iter_mut().find(|k| **k == KeyCode::No) {
            Some(slot) => {
                *slot = key;
                true
            }
            None => {
                warn!("Keycode slots are full, dropping {:?}", key);
                false
            }
        }
    }

    pub fn unregister_key(&mut self, key: KeyCode) {
        if key.is_modifier() {
            self.modifiers &= !key.to_hid_modifiers();
            return;
        }
        self.keycodes.iter_mut().filter(|k| **k == key).for_each(|k| *k = KeyCode::No);
    }

    pub(crate) fn register_key_modifiers(&mut self, mods: HidModifiers) {
        self.key_modifiers |= mods;
    }

    pub(crate) fn unregister_key_modifiers(&mut self, mods: HidModifiers) {
        self.key_modifiers &= !mods;
    }

    /// Build a report, with `extra` modifiers added, e.g. an armed one-shot modifier
    pub fn report(&self, extra: HidModifiers) -> KeyboardReport {
        let mut keycodes = [0; KEYCODE_SLOTS];
        for (dst, src) in keycodes.iter_mut().zip(self.keycodes.iter()) {
            *dst = *src as u8;
        }
        KeyboardReport {
            modifier: (self.modifiers | self.key_modifiers | extra).into_bits(),
            reserved: 0,
            leds: 0,
            keycodes,
        }
    }
}

impl Default for HidState {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifierService for HidState {
    fn register_mods(&mut self, mods: HidModifiers) {
        self.modifiers |= mods;
    }

    fn unregister_mods(&mut self, mods: HidModifiers) {
        self.modifiers &= !mods;
    }

    fn modifiers(&self) -> HidModifiers {
        self.modifiers | self.key_modifiers
    }
}
