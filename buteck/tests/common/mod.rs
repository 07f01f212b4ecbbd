pub mod test_macro;

use core::cell::RefCell;

use buteck::config::BehaviorConfig;
use buteck::ergodox::{COL, ROW, pos};
use buteck::event::KeyboardEvent;
use buteck::hid::KeyboardReport;
use buteck::keyboard::{Keyboard, KeyboardOutput};
use buteck::keymap::KeyMap;
use buteck::keymaps::variants::Variant;
use buteck::keymaps::zutatensuppe::{NUM_LAYER, UmlautMacros};
use embassy_time::{Duration, Instant};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub(crate) const KC_LCTRL: u8 = 1;
pub(crate) const KC_LSHIFT: u8 = 1 << 1;
pub(crate) const KC_LALT: u8 = 1 << 2;
pub(crate) const KC_LGUI: u8 = 1 << 3;

pub type TestKeyboard = Keyboard<'static, ROW, COL, NUM_LAYER>;

#[derive(Debug, Clone)]
pub struct TestKeyPress {
    /// Ergodox key name `0xXY`, see [`buteck::ergodox::pos`]
    pub key: u8,
    pub pressed: bool,
    pub delay: u64, // Delay before this key event in milliseconds
}

pub fn create_test_keyboard_with_config(variant: Variant, config: BehaviorConfig) -> TestKeyboard {
    // Box::leak is acceptable in tests
    let layers = Box::leak(Box::new(variant.keymap().expect("shipped variants are valid")));
    let keymap = Box::leak(Box::new(RefCell::new(KeyMap::new(layers, config))));
    let macros: &'static UmlautMacros = Box::leak(Box::new(UmlautMacros::default()));
    Keyboard::new(keymap).with_macro_handler(macros)
}

pub fn create_test_keyboard() -> TestKeyboard {
    create_test_keyboard_with_config(Variant::Classic, BehaviorConfig::default())
}

/// Feed the key sequence into the keyboard, return everything it wants to send.
///
/// Time starts at 0 and advances by each key's delay. After the last key, timers are given 5s to fire.
pub fn run_key_sequence(keyboard: &mut TestKeyboard, key_sequence: &[TestKeyPress]) -> Vec<KeyboardOutput> {
    let mut now = 0;
    for key in key_sequence {
        now += key.delay;
        let p = pos(key.key);
        keyboard.process(KeyboardEvent::key_at(p.row, p.col, key.pressed, Instant::from_millis(now)));
    }
    keyboard.tick(Instant::from_millis(now) + Duration::from_secs(5));
    keyboard.drain().collect()
}

pub fn reports(outputs: &[KeyboardOutput]) -> Vec<KeyboardReport> {
    outputs
        .iter()
        .filter_map(|o| match o {
            KeyboardOutput::Report(r) => Some(*r),
            KeyboardOutput::Delay(_) => None,
        })
        .collect()
}

// run a keyboard test, input is a seq of key events with delay, the expected reports are verified in order
pub fn run_key_sequence_test(keyboard: &mut TestKeyboard, key_sequence: &[TestKeyPress], expected_reports: &[KeyboardReport]) {
    let reports = reports(&run_key_sequence(keyboard, key_sequence));
    for (i, (expected, report)) in expected_reports.iter().zip(reports.iter()).enumerate() {
        assert_eq!(expected, report, "on #{} reports, expected left but actually right", i);
    }
    assert_eq!(
        expected_reports.len(),
        reports.len(),
        "expected {} reports, got {:?}",
        expected_reports.len(),
        reports
    );
}
