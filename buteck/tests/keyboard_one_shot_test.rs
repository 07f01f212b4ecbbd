pub mod common;

use crate::common::{KC_LCTRL, KC_LSHIFT, create_test_keyboard};

// 0x30 is the left one shot shift, 0x44 the left one shot ctrl

#[test]
fn test_one_shot_applies_to_next_key_only() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            [0x30, true, 0],
            [0x30, false, 50],
            [0x31, true, 50],
            [0x31, false, 50],
            [0x31, true, 50],
            [0x31, false, 50],
        ],
        expected_reports: [
            [KC_LSHIFT, [kc8!(Z), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [0, [kc8!(Z), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_one_shot_held_is_a_modifier() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            [0x44, true, 0],
            [0x28, true, 50],
            [0x28, false, 50],
            [0x44, false, 50],
            [0x28, true, 50],
            [0x28, false, 50],
        ],
        expected_reports: [
            [KC_LCTRL, [kc8!(Y), 0, 0, 0, 0, 0]],
            [KC_LCTRL, [0, 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [0, [kc8!(Y), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_one_shot_timeout() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            [0x30, true, 0],
            [0x30, false, 50],
            [0x31, true, 1500],
            [0x31, false, 50],
        ],
        expected_reports: [
            [0, [kc8!(Z), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_one_shot_with_mod_tap_tapped() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            [0x30, true, 0],
            [0x30, false, 50],
            [0x23, true, 50],
            [0x23, false, 50],
        ],
        expected_reports: [
            [KC_LSHIFT, [kc8!(H), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_one_shot_stacking() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            // Right hand ctrl, then left shift
            [0x49, true, 0],
            [0x49, false, 20],
            [0x30, true, 20],
            [0x30, false, 20],
            [0x31, true, 20],
            [0x31, false, 20],
        ],
        expected_reports: [
            [KC_LCTRL | KC_LSHIFT, [kc8!(Z), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_one_shot_expires_after_layer_hold() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            [0x44, true, 0],
            [0x44, false, 20],
            // I held alone, only its layer is used
            [0x2C, true, 20],
            [0x2C, false, 300],
            [0x28, true, 5000],
            [0x28, false, 20],
        ],
        expected_reports: [
            [0, [kc8!(Y), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_one_shot_survives_rolling_release() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            // Y goes down before ctrl and is released while ctrl is down
            [0x28, true, 0],
            [0x44, true, 20],
            [0x28, false, 20],
            [0x44, false, 20],
            [0x32, true, 20],
            [0x32, false, 20],
        ],
        expected_reports: [
            [0, [kc8!(Y), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [KC_LCTRL, [kc8!(X), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_one_shot_used_by_first_key_report() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            [0x30, true, 0],
            [0x30, false, 20],
            [0x31, true, 20],
            // X while Z is still down is not shifted
            [0x32, true, 20],
            [0x32, false, 20],
            [0x31, false, 20],
        ],
        expected_reports: [
            [KC_LSHIFT, [kc8!(Z), 0, 0, 0, 0, 0]],
            [0, [kc8!(Z), kc8!(X), 0, 0, 0, 0]],
            [0, [kc8!(Z), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}
