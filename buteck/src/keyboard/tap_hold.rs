use embassy_time::Instant;
use heapless::Deque;

use crate::action::Action;
use crate::config::TapHoldMode;
use crate::event::KeyboardEvent;
use crate::keyboard::Keyboard;

/// Max number of events buffered while a tap/hold key is undecided
pub(crate) const TAP_HOLD_BUFFER_SIZE: usize = 16;

/// A tap/hold key which is pressed, but not yet decided
#[derive(Clone, Copy, Debug)]
pub(crate) struct PendingTapHold {
    pub(crate) event: KeyboardEvent,
    pub(crate) tap: Action,
    pub(crate) hold: Action,
    pub(crate) deadline: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TapHoldDecision {
    Tap,
    Hold,
    /// Keep waiting, the event goes to the buffer
    Buffer,
}

impl PendingTapHold {
    /// Decide what `event` means for this key. `buffered` are the events received since the key was pressed.
    pub(crate) fn decide(
        &self,
        event: &KeyboardEvent,
        buffered: &Deque<KeyboardEvent, TAP_HOLD_BUFFER_SIZE>,
        mode: TapHoldMode,
    ) -> TapHoldDecision {
        if event.time >= self.deadline {
            return TapHoldDecision::Hold;
        }
        if event.pos == self.event.pos {
            return if event.pressed {
                // Should not happen, the key is still down
                TapHoldDecision::Buffer
            } else {
                TapHoldDecision::Tap
            };
        }
        match mode {
            TapHoldMode::HoldOnOtherPress if event.pressed => TapHoldDecision::Hold,
            TapHoldMode::PermissiveHold if !event.pressed => {
                // The other key must have been pressed after this one
                if buffered.iter().any(|e| e.pos == event.pos && e.pressed) {
                    TapHoldDecision::Hold
                } else {
                    TapHoldDecision::Buffer
                }
            }
            _ => TapHoldDecision::Buffer,
        }
    }
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> Keyboard<'a, ROW, COL, NUM_LAYER> {
    pub(crate) fn process_action_tap_hold(&mut self, tap: Action, hold: Action, event: KeyboardEvent) {
        if event.pressed {
            let deadline = event.time + self.keymap.borrow().behavior.tap_hold.hold_timeout;
            debug!("Tap/hold key {:?} pending until {:?}", event.pos, deadline);
            self.pending_tap_hold = Some(PendingTapHold {
                event,
                tap,
                hold,
                deadline,
            });
        } else {
            // Released without pending state, the key was decided as hold
            self.process_action(hold, event);
        }
    }

    /// Feed an event to the undecided tap/hold key
    pub(crate) fn process_pending_tap_hold(&mut self, pending: PendingTapHold, event: KeyboardEvent) {
        let mode = self.keymap.borrow().behavior.tap_hold.mode;
        match pending.decide(&event, &self.tap_hold_buffer, mode) {
            TapHoldDecision::Tap => self.resolve_tap(pending, event),
            TapHoldDecision::Hold => {
                self.resolve_hold(pending);
                self.process(event);
            }
            TapHoldDecision::Buffer => {
                if self.tap_hold_buffer.is_full() {
                    warn!("Tap/hold buffer is full, holding {:?}", pending.event.pos);
                    self.resolve_hold(pending);
                    self.process(event);
                } else if self.tap_hold_buffer.push_back(event).is_err() {
                    error!("Tap/hold buffer overflow, dropping {:?}", event.pos);
                }
            }
        }
    }

    /// Decide the pending key as hold if its tapping term has elapsed
    pub(crate) fn expire_tap_hold(&mut self, now: Instant) {
        if let Some(pending) = self.pending_tap_hold {
            if now >= pending.deadline {
                self.resolve_hold(pending);
            }
        }
    }

    fn resolve_tap(&mut self, pending: PendingTapHold, release: KeyboardEvent) {
        debug!("Tap/hold key {:?} tapped", pending.event.pos);
        self.pending_tap_hold = None;
        // Restore the layer cache of the released key
        self.keymap.borrow_mut().get_action_with_layer_cache(release);

        self.update_osm(pending.event);
        self.process_action(pending.tap, pending.event);
        self.update_osm(release);
        self.process_action(pending.tap, release);
        self.replay_tap_hold_buffer();
    }

    fn resolve_hold(&mut self, pending: PendingTapHold) {
        debug!("Tap/hold key {:?} held", pending.event.pos);
        self.pending_tap_hold = None;
        self.update_osm(pending.event);
        self.process_action(pending.hold, pending.event);
        self.replay_tap_hold_buffer();
    }

    fn replay_tap_hold_buffer(&mut self) {
        let mut buffered = core::mem::replace(&mut self.tap_hold_buffer, Deque::new());
        while let Some(e) = buffered.pop_front() {
            self.process(e);
        }
    }
}
