//! Exposed channels which connect the matrix, the keyboard and the HID writer

pub use embassy_sync::{blocking_mutex, channel};
use embassy_sync::channel::Channel;

use crate::event::KeyboardEvent;
use crate::hid::KeyboardReport;
use crate::{EVENT_CHANNEL_SIZE, REPORT_CHANNEL_SIZE, RawMutex};

/// Channel for key events only
pub static KEY_EVENT_CHANNEL: Channel<RawMutex, KeyboardEvent, EVENT_CHANNEL_SIZE> = Channel::new();
/// Channel for keyboard reports
pub static KEYBOARD_REPORT_CHANNEL: Channel<RawMutex, KeyboardReport, REPORT_CHANNEL_SIZE> = Channel::new();
