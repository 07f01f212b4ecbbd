pub(crate) mod oneshot;
pub(crate) mod tap_hold;

use core::cell::RefCell;

use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};
use heapless::Deque;

use self::oneshot::OneShotState;
use self::tap_hold::{PendingTapHold, TAP_HOLD_BUFFER_SIZE};
use crate::action::{Action, KeyAction};
use crate::channel::{KEY_EVENT_CHANNEL, KEYBOARD_REPORT_CHANNEL};
use crate::event::KeyboardEvent;
use crate::hid::{HidState, KeyboardReport, ModifierService};
use crate::keyboard_macros::{MacroHandler, MacroOperation};
use crate::keycode::KeyCode;
use crate::keymap::KeyMap;
use crate::modifier::ModifierCombination;

/// Max number of outputs waiting to be drained
pub const OUTPUT_QUEUE_SIZE: usize = 64;

/// What the keyboard wants the host side to do, in order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyboardOutput {
    Report(KeyboardReport),
    /// Wait before sending the next report
    Delay(Duration),
}

pub struct Keyboard<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Keymap
    pub(crate) keymap: &'a RefCell<KeyMap<'a, ROW, COL, NUM_LAYER>>,

    /// Layout specific macros
    macros: Option<&'a dyn MacroHandler>,

    /// Keys and modifiers sent to the host
    pub(crate) hid: HidState,

    /// One shot modifier state
    pub(crate) osm_state: OneShotState<ModifierCombination>,

    /// An armed one shot modifier is dropped at this time
    pub(crate) osm_deadline: Option<Instant>,

    /// The tap/hold key which is not decided yet
    pub(crate) pending_tap_hold: Option<PendingTapHold>,

    /// Events received while a tap/hold key is undecided
    pub(crate) tap_hold_buffer: Deque<KeyboardEvent, TAP_HOLD_BUFFER_SIZE>,

    /// Reports and delays waiting to be sent
    outputs: Deque<KeyboardOutput, OUTPUT_QUEUE_SIZE>,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> Keyboard<'a, ROW, COL, NUM_LAYER> {
    pub fn new(keymap: &'a RefCell<KeyMap<'a, ROW, COL, NUM_LAYER>>) -> Self {
        Keyboard {
            keymap,
            macros: None,
            hid: HidState::new(),
            osm_state: OneShotState::default(),
            osm_deadline: None,
            pending_tap_hold: None,
            tap_hold_buffer: Deque::new(),
            outputs: Deque::new(),
        }
    }

    /// Use `handler` for `Action::TriggerMacro` keys
    pub fn with_macro_handler(mut self, handler: &'a dyn MacroHandler) -> Self {
        self.macros = Some(handler);
        self
    }

    /// Main keyboard processing task.
    ///
    /// It receives key events from [`KEY_EVENT_CHANNEL`], stamps them with the current time and
    /// sends the resulting reports to [`KEYBOARD_REPORT_CHANNEL`].
    pub async fn run(&mut self) {
        loop {
            let event = match self.next_deadline() {
                Some(deadline) => match select(KEY_EVENT_CHANNEL.receive(), Timer::at(deadline)).await {
                    Either::First(e) => Some(e),
                    Either::Second(_) => None,
                },
                None => Some(KEY_EVENT_CHANNEL.receive().await),
            };

            match event {
                Some(mut e) => {
                    e.time = Instant::now();
                    self.process(e);
                }
                None => self.tick(Instant::now()),
            }

            while let Some(output) = self.next_output() {
                match output {
                    KeyboardOutput::Report(report) => KEYBOARD_REPORT_CHANNEL.send(report).await,
                    KeyboardOutput::Delay(d) => Timer::after(d).await,
                }
            }
        }
    }

    /// Process a key event. Timers which elapsed before the event are handled first.
    pub fn process(&mut self, event: KeyboardEvent) {
        self.tick(event.time);

        if let Some(pending) = self.pending_tap_hold {
            self.process_pending_tap_hold(pending, event);
            return;
        }

        let key_action = self.keymap.borrow_mut().get_action_with_layer_cache(event);
        debug!("Process key action {:?}, {:?}", key_action, event);
        self.process_key_action(key_action, event);
    }

    /// Handle timers: tapping term of an undecided tap/hold key and one shot timeout
    pub fn tick(&mut self, now: Instant) {
        self.expire_tap_hold(now);
        self.expire_osm(now);
    }

    /// The next time [`Keyboard::tick`] has something to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pending_tap_hold.map(|p| p.deadline), self.osm_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn next_output(&mut self) -> Option<KeyboardOutput> {
        self.outputs.pop_front()
    }

    /// Take all pending outputs
    pub fn drain(&mut self) -> impl Iterator<Item = KeyboardOutput> + '_ {
        core::iter::from_fn(move || self.outputs.pop_front())
    }

    /// Modifiers currently registered, without one shot modifiers
    pub fn modifiers(&self) -> crate::modifier::HidModifiers {
        self.hid.modifiers()
    }

    fn push_output(&mut self, output: KeyboardOutput) {
        if self.outputs.is_full() {
            warn!("Output queue is full, dropping the oldest output");
            self.outputs.pop_front();
        }
        // Can't fail after making room
        let _ = self.outputs.push_back(output);
    }

    pub(crate) fn send_keyboard_report(&mut self) {
        let report = self.hid.report(self.resolved_osm_modifiers());
        self.consume_osm(&report);
        trace!("Sending report {:?}", report);
        self.push_output(KeyboardOutput::Report(report));
    }

    fn process_key_action(&mut self, key_action: KeyAction, event: KeyboardEvent) {
        match key_action {
            KeyAction::No | KeyAction::Transparent => (),
            KeyAction::Single(a) => {
                self.update_osm(event);
                self.process_action(a, event);
            }
            KeyAction::WithModifier(a, m) => {
                self.update_osm(event);
                self.process_action_with_modifier(a, m, event);
            }
            KeyAction::TapHold(tap, hold) => self.process_action_tap_hold(tap, hold, event),
            KeyAction::OneShot(Action::Modifier(m)) => self.process_action_osm(m, event),
            KeyAction::OneShot(a) => {
                warn!("One shot is only supported for modifiers, {:?} is used as a normal action", a);
                self.update_osm(event);
                self.process_action(a, event);
            }
        }
    }

    pub(crate) fn process_action(&mut self, action: Action, event: KeyboardEvent) {
        match action {
            Action::No | Action::Transparent => (),
            Action::Key(key) => {
                if event.pressed {
                    self.hid.register_key(key);
                } else {
                    self.hid.unregister_key(key);
                }
                self.send_keyboard_report();
            }
            Action::Modifier(modifiers) => {
                if event.pressed {
                    self.hid.register_mods(modifiers.to_hid_modifiers());
                } else {
                    self.hid.unregister_mods(modifiers.to_hid_modifiers());
                }
                // Report the modifier press/release in its own hid report
                self.send_keyboard_report();
            }
            Action::LayerOn(layer_num) => {
                // Activate a layer while the key is held
                if event.pressed {
                    self.keymap.borrow_mut().activate_layer(layer_num);
                } else {
                    self.keymap.borrow_mut().deactivate_layer(layer_num);
                }
            }
            Action::TriggerMacro(id) => self.process_action_macro(id, event),
        }
    }

    fn process_action_with_modifier(&mut self, action: Action, modifiers: ModifierCombination, event: KeyboardEvent) {
        // The modifiers are pressed and released in the same report as the key
        if event.pressed {
            self.hid.register_key_modifiers(modifiers.to_hid_modifiers());
        } else {
            self.hid.unregister_key_modifiers(modifiers.to_hid_modifiers());
        }
        self.process_action(action, event);
    }

    fn process_action_macro(&mut self, id: u8, event: KeyboardEvent) {
        let Some(handler) = self.macros else {
            warn!("No macro handler for macro {}", id);
            return;
        };

        let before = self.hid.modifiers();
        match handler.action_get_macro(id, event.pressed, &mut self.hid) {
            Some(sequence) => self.execute_macro(&sequence),
            None => {
                // The handler may have changed modifiers directly
                if self.hid.modifiers() != before {
                    self.send_keyboard_report();
                }
            }
        }
    }

    /// Play a macro sequence into the output queue
    pub(crate) fn execute_macro(&mut self, sequence: &[MacroOperation]) {
        let tap_interval = self.keymap.borrow().behavior.keyboard_macros.tap_interval;
        let mut interval: Option<Duration> = None;
        for op in sequence {
            match *op {
                MacroOperation::Press(k) => {
                    self.hid.register_key(k);
                    self.send_keyboard_report();
                }
                MacroOperation::Release(k) => {
                    self.hid.unregister_key(k);
                    self.send_keyboard_report();
                }
                MacroOperation::Tap(k) => self.tap_key(k, interval.unwrap_or(tap_interval)),
                MacroOperation::Delay(ms) => self.push_output(KeyboardOutput::Delay(Duration::from_millis(ms as u64))),
                MacroOperation::Interval(ms) => {
                    interval = Some(Duration::from_millis(ms as u64));
                    continue;
                }
            }
            if let Some(d) = interval {
                self.push_output(KeyboardOutput::Delay(d));
            }
        }
    }

    fn tap_key(&mut self, key: KeyCode, gap: Duration) {
        self.hid.register_key(key);
        self.send_keyboard_report();
        if gap.as_ticks() > 0 {
            self.push_output(KeyboardOutput::Delay(gap));
        }
        self.hid.unregister_key(key);
        self.send_keyboard_report();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::BehaviorConfig;
    use crate::keyboard_macros::{MacroSequence, define_macro_sequence};
    use crate::modifier::{HidModifiers, LCTRL, LSHIFT};
    use crate::{a, k, lt, m, mt, osm, shifted};

    struct TestMacros;

    impl MacroHandler for TestMacros {
        fn action_get_macro(&self, id: u8, pressed: bool, mods: &mut dyn ModifierService) -> Option<MacroSequence> {
            if !pressed {
                mods.unregister_mods(HidModifiers::LEFT_CTRL);
                return None;
            }
            match id {
                0 => define_macro_sequence(&[
                    MacroOperation::Interval(10),
                    MacroOperation::Press(KeyCode::LAlt),
                    MacroOperation::Tap(KeyCode::Kp1),
                    MacroOperation::Release(KeyCode::LAlt),
                ]),
                _ => None,
            }
        }
    }

    fn keymap() -> [[[KeyAction; 4]; 2]; 2] {
        [
            [
                [k!(A), lt!(1, T), mt!(H, LSHIFT), osm!(LCTRL)],
                [m!(0), m!(1), shifted!(Kc9), a!(No)],
            ],
            [
                [k!(Kp1), a!(Transparent), a!(Transparent), a!(Transparent)],
                [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            ],
        ]
    }

    fn create_test_keyboard() -> Keyboard<'static, 2, 4, 2> {
        let layers = Box::leak(Box::new(keymap()));
        let keymap = Box::leak(Box::new(RefCell::new(KeyMap::new(layers, BehaviorConfig::default()))));
        Keyboard::new(keymap).with_macro_handler(&TestMacros)
    }

    fn key_event(row: u8, col: u8, pressed: bool, ms: u64) -> KeyboardEvent {
        KeyboardEvent::key_at(row, col, pressed, Instant::from_millis(ms))
    }

    fn reports(keyboard: &mut Keyboard<'static, 2, 4, 2>) -> Vec<KeyboardReport> {
        keyboard
            .drain()
            .filter_map(|o| match o {
                KeyboardOutput::Report(r) => Some(r),
                KeyboardOutput::Delay(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_basic_key_press_release() {
        let mut keyboard = create_test_keyboard();
        keyboard.process(key_event(0, 0, true, 0));
        keyboard.process(key_event(0, 0, false, 10));
        let r = reports(&mut keyboard);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].keycodes[0], KeyCode::A as u8);
        assert_eq!(r[1], KeyboardReport::default());
    }

    #[test]
    fn test_layer_tap_hold_and_tap() {
        let mut keyboard = create_test_keyboard();
        keyboard.process(key_event(0, 1, true, 0));
        assert_eq!(keyboard.next_deadline(), Some(Instant::from_millis(200)));
        keyboard.tick(Instant::from_millis(250));
        assert!(keyboard.keymap.borrow().is_layer_active(1));
        keyboard.process(key_event(0, 0, true, 260));
        keyboard.process(key_event(0, 0, false, 270));
        keyboard.process(key_event(0, 1, false, 280));
        assert!(!keyboard.keymap.borrow().is_layer_active(1));
        let r = reports(&mut keyboard);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].keycodes[0], KeyCode::Kp1 as u8);

        keyboard.process(key_event(0, 1, true, 1000));
        keyboard.process(key_event(0, 1, false, 1100));
        let r = reports(&mut keyboard);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].keycodes[0], KeyCode::T as u8);
        assert!(!keyboard.keymap.borrow().is_layer_active(1));
    }

    #[test]
    fn test_shifted_symbol() {
        let mut keyboard = create_test_keyboard();
        keyboard.process(key_event(1, 2, true, 0));
        keyboard.process(key_event(1, 2, false, 10));
        let r = reports(&mut keyboard);
        assert_eq!(r[0].modifier, HidModifiers::LEFT_SHIFT.into_bits());
        assert_eq!(r[0].keycodes[0], KeyCode::Kc9 as u8);
        assert_eq!(r[1], KeyboardReport::default());
    }

    #[test]
    fn test_macro_interval() {
        let mut keyboard = create_test_keyboard();
        keyboard.process(key_event(1, 0, true, 0));
        let outputs: Vec<KeyboardOutput> = keyboard.drain().collect();
        let d = KeyboardOutput::Delay(Duration::from_millis(10));
        // Press alt, tap kp1 (press, release), release alt, with an interval after each step
        assert_eq!(outputs.len(), 8);
        assert_eq!(outputs[1], d);
        assert_eq!(outputs[3], d);
        assert_eq!(outputs[5], d);
        assert_eq!(outputs[7], d);
        assert!(matches!(outputs[2], KeyboardOutput::Report(r) if r.contains(KeyCode::Kp1) && r.modifier == 0x04));
        assert!(matches!(outputs[6], KeyboardOutput::Report(r) if r == KeyboardReport::default()));
    }

    #[test]
    fn test_macro_release_drops_left_ctrl() {
        let mut keyboard = create_test_keyboard();
        keyboard.hid.register_mods(HidModifiers::LEFT_CTRL | HidModifiers::LEFT_ALT);
        keyboard.process(key_event(1, 1, true, 0));
        assert_eq!(reports(&mut keyboard).len(), 0);
        keyboard.process(key_event(1, 1, false, 10));
        assert_eq!(keyboard.modifiers(), HidModifiers::LEFT_ALT);
        let r = reports(&mut keyboard);
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].modifier, HidModifiers::LEFT_ALT.into_bits());
    }

    #[test]
    fn test_one_shot_timeout() {
        let mut keyboard = create_test_keyboard();
        keyboard.process(key_event(0, 3, true, 0));
        keyboard.process(key_event(0, 3, false, 10));
        assert_eq!(keyboard.next_deadline(), Some(Instant::from_millis(1010)));
        keyboard.process(key_event(0, 0, true, 2000));
        keyboard.process(key_event(0, 0, false, 2010));
        let r = reports(&mut keyboard);
        assert_eq!(r[0].modifier, 0);
    }

    #[test]
    fn test_output_queue_keeps_newest() {
        let mut keyboard = create_test_keyboard();
        for i in 0..(OUTPUT_QUEUE_SIZE as u64) {
            keyboard.process(key_event(0, 0, true, i * 2));
            keyboard.process(key_event(0, 0, false, i * 2 + 1));
        }
        let r = reports(&mut keyboard);
        assert_eq!(r.len(), OUTPUT_QUEUE_SIZE);
        assert_eq!(*r.last().unwrap(), KeyboardReport::default());
    }
}
