use crate::event::KeyboardEvent;
use crate::hid::{KeyboardReport, ModifierService};
use crate::keyboard::Keyboard;
use crate::modifier::{HidModifiers, ModifierCombination};

/// State machine for one shot keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OneShotState<T> {
    /// First one shot key press
    Initial(T),
    /// One shot key was released before any other key, normal one shot behavior
    Single(T),
    /// Another key was pressed before one shot key was released, treat as a normal modifier
    Held(T),
    /// One shot inactive
    #[default]
    None,
}

impl<T> OneShotState<T> {
    /// Get the current one shot value if any
    pub fn value(&self) -> Option<&T> {
        match self {
            OneShotState::Initial(v) | OneShotState::Single(v) | OneShotState::Held(v) => Some(v),
            OneShotState::None => None,
        }
    }
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> Keyboard<'a, ROW, COL, NUM_LAYER> {
    pub(crate) fn process_action_osm(&mut self, new_modifiers: ModifierCombination, event: KeyboardEvent) {
        if event.pressed {
            // Add new modifier combination to existing one shot or init if none
            self.osm_state = match self.osm_state {
                OneShotState::None => OneShotState::Initial(new_modifiers),
                OneShotState::Initial(cur) => OneShotState::Initial(cur | new_modifiers),
                OneShotState::Single(cur) => OneShotState::Single(cur | new_modifiers),
                OneShotState::Held(cur) => {
                    self.hid.register_mods(new_modifiers.to_hid_modifiers());
                    OneShotState::Held(cur | new_modifiers)
                }
            };
            self.osm_deadline = None;
        } else {
            match self.osm_state {
                OneShotState::Initial(cur) | OneShotState::Single(cur) => {
                    // Armed for the next key
                    self.osm_state = OneShotState::Single(cur);
                    self.osm_deadline = Some(event.time + self.keymap.borrow().behavior.one_shot.timeout);
                }
                OneShotState::Held(cur) => {
                    // Another key was pressed meanwhile, the modifier was a plain hold
                    self.osm_state = OneShotState::None;
                    self.hid.unregister_mods(cur.to_hid_modifiers());
                    self.send_keyboard_report();
                }
                OneShotState::None => (),
            }
        }
    }

    /// Update one shot state on any other key event
    pub(crate) fn update_osm(&mut self, event: KeyboardEvent) {
        if let OneShotState::Initial(m) = self.osm_state {
            if event.pressed {
                // Held together with another key, from now on it's a registered modifier
                self.osm_state = OneShotState::Held(m);
                self.hid.register_mods(m.to_hid_modifiers());
            }
        }
    }

    /// An armed one shot modifier is used up by the first report which carries a key
    pub(crate) fn consume_osm(&mut self, report: &KeyboardReport) {
        if matches!(self.osm_state, OneShotState::Single(_)) && report.keycodes.iter().any(|k| *k != 0) {
            self.osm_state = OneShotState::None;
            self.osm_deadline = None;
        }
    }

    /// Drop an armed one shot modifier which was not used in time
    pub(crate) fn expire_osm(&mut self, now: embassy_time::Instant) {
        if let Some(deadline) = self.osm_deadline {
            if now >= deadline {
                debug!("One shot modifier timeout");
                self.osm_state = OneShotState::None;
                self.osm_deadline = None;
            }
        }
    }

    /// Modifiers of an armed one shot key, they apply to the current report only.
    /// Held one shot modifiers are registered in the hid state instead.
    pub(crate) fn resolved_osm_modifiers(&self) -> HidModifiers {
        match self.osm_state {
            OneShotState::Single(m) => m.to_hid_modifiers(),
            _ => HidModifiers::new(),
        }
    }
}
