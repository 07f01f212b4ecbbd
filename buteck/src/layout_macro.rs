/// Create a normal key. For example, `k!(A)` represents `KeyAction::Single(Action::Key(KeyCode::A))`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::action::KeyAction::Single($crate::action::Action::Key($crate::keycode::KeyCode::$k))
    };
}

/// Create a normal key with modifier action
#[macro_export]
macro_rules! wm {
    ($x: ident, $m: expr) => {
        $crate::action::KeyAction::WithModifier($crate::action::Action::Key($crate::keycode::KeyCode::$x), $m)
    };
}

/// Create a shifted key, e.g. `shifted!(Kc1)` is `!` on a US layout
#[macro_export]
macro_rules! shifted {
    ($x: ident) => {
        $crate::wm!($x, $crate::modifier::LSHIFT)
    };
}

/// Create a normal action: `KeyAction`
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::action::KeyAction::$a
    };
}

/// Create a layer activate action or tap key(tap/hold)
#[macro_export]
macro_rules! lt {
    ($x: expr, $k: ident) => {
        $crate::action::KeyAction::TapHold(
            $crate::action::Action::Key($crate::keycode::KeyCode::$k),
            $crate::action::Action::LayerOn($x),
        )
    };
}

/// Create a modifier-tap-hold action
#[macro_export]
macro_rules! mt {
    ($k: ident, $m: expr) => {
        $crate::action::KeyAction::TapHold(
            $crate::action::Action::Key($crate::keycode::KeyCode::$k),
            $crate::action::Action::Modifier($m),
        )
    };
}

/// Create an oneshot modifier key in keymap
#[macro_export]
macro_rules! osm {
    ($m: expr) => {
        $crate::action::KeyAction::OneShot($crate::action::Action::Modifier($m))
    };
}

/// Create a macro key, the argument is converted to the macro id
#[macro_export]
macro_rules! m {
    ($id: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::TriggerMacro($id as u8))
    };
}

/// Create a key from a function slot, the argument is anything with a `const fn function()`
#[macro_export]
macro_rules! f {
    ($slot: expr) => {
        $slot.function().to_key_action()
    };
}

/// Create an ErgoDox layer from the 76 keys in physical order, like QMK's `KEYMAP` for ergodox.
///
/// Left hand first, top row to bottom row, then the left thumb cluster. The right hand follows the same way.
/// Unwired matrix positions are `KeyAction::No`.
#[macro_export]
macro_rules! ergodox_layer {
    (
        // left hand
        $k00:expr, $k01:expr, $k02:expr, $k03:expr, $k04:expr, $k05:expr, $k06:expr,
        $k10:expr, $k11:expr, $k12:expr, $k13:expr, $k14:expr, $k15:expr, $k16:expr,
        $k20:expr, $k21:expr, $k22:expr, $k23:expr, $k24:expr, $k25:expr,
        $k30:expr, $k31:expr, $k32:expr, $k33:expr, $k34:expr, $k35:expr, $k36:expr,
        $k40:expr, $k41:expr, $k42:expr, $k43:expr, $k44:expr,
                                                        $k55:expr, $k56:expr,
                                                                   $k54:expr,
                                             $k53:expr, $k52:expr, $k51:expr,
        // right hand
        $k07:expr, $k08:expr, $k09:expr, $k0A:expr, $k0B:expr, $k0C:expr, $k0D:expr,
        $k17:expr, $k18:expr, $k19:expr, $k1A:expr, $k1B:expr, $k1C:expr, $k1D:expr,
                   $k28:expr, $k29:expr, $k2A:expr, $k2B:expr, $k2C:expr, $k2D:expr,
        $k37:expr, $k38:expr, $k39:expr, $k3A:expr, $k3B:expr, $k3C:expr, $k3D:expr,
                              $k49:expr, $k4A:expr, $k4B:expr, $k4C:expr, $k4D:expr,
        $k57:expr, $k58:expr,
        $k59:expr,
        $k5C:expr, $k5B:expr, $k5A:expr $(,)?
    ) => {
        [
            // left hand, matrix rows are the physical columns
            [$k00, $k10, $k20, $k30, $k40, $crate::action::KeyAction::No],
            [$k01, $k11, $k21, $k31, $k41, $k51],
            [$k02, $k12, $k22, $k32, $k42, $k52],
            [$k03, $k13, $k23, $k33, $k43, $k53],
            [$k04, $k14, $k24, $k34, $k44, $k54],
            [$k05, $k15, $k25, $k35, $crate::action::KeyAction::No, $k55],
            [$k06, $k16, $crate::action::KeyAction::No, $k36, $crate::action::KeyAction::No, $k56],
            // right hand
            [$k07, $k17, $crate::action::KeyAction::No, $k37, $crate::action::KeyAction::No, $k57],
            [$k08, $k18, $k28, $k38, $crate::action::KeyAction::No, $k58],
            [$k09, $k19, $k29, $k39, $k49, $k59],
            [$k0A, $k1A, $k2A, $k3A, $k4A, $k5A],
            [$k0B, $k1B, $k2B, $k3B, $k4B, $k5B],
            [$k0C, $k1C, $k2C, $k3C, $k4C, $k5C],
            [$k0D, $k1D, $k2D, $k3D, $k4D, $crate::action::KeyAction::No],
        ]
    };
}
