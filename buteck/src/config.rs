use embassy_time::Duration;

/// Config for configurable action behavior
#[derive(Clone, Copy, Debug, Default)]
pub struct BehaviorConfig {
    pub tap_hold: TapHoldConfig,
    pub one_shot: OneShotConfig,
    pub keyboard_macros: MacroConfig,
}

/// How a tap/hold key decides early, before the tapping term has elapsed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapHoldMode {
    /// The decision is made on timeout only
    Normal,
    /// Same as QMK's permissive hold: another key pressed and released while the tap/hold key is down
    /// triggers the hold action
    #[default]
    PermissiveHold,
    /// Any other key pressed while the tap/hold key is down triggers the hold action
    HoldOnOtherPress,
}

/// Configurations for tap hold behavior
#[derive(Clone, Copy, Debug)]
pub struct TapHoldConfig {
    /// Tapping term. Released before it: tap, still down after it: hold
    pub hold_timeout: Duration,
    pub mode: TapHoldMode,
}

impl Default for TapHoldConfig {
    fn default() -> Self {
        Self {
            hold_timeout: Duration::from_millis(200),
            mode: TapHoldMode::default(),
        }
    }
}

/// Config for one shot behavior
#[derive(Clone, Copy, Debug)]
pub struct OneShotConfig {
    /// An armed one-shot modifier is dropped if no key follows within this time
    pub timeout: Duration,
}

impl Default for OneShotConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }
}

/// Config for macro playback
#[derive(Clone, Copy, Debug)]
pub struct MacroConfig {
    /// Time between the press and release report of a tapped key, zero sends them back to back
    pub tap_interval: Duration,
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            tap_interval: Duration::from_ticks(0),
        }
    }
}
