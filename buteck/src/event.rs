use embassy_time::Instant;

/// Electrical position of a key in the matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// A key press or release, stamped with the time it happened
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardEvent {
    pub pos: KeyPos,
    pub pressed: bool,
    pub time: Instant,
}

impl KeyboardEvent {
    pub const fn key(row: u8, col: u8, pressed: bool) -> Self {
        Self {
            pos: KeyPos::new(row, col),
            pressed,
            time: Instant::from_ticks(0),
        }
    }

    pub const fn key_at(row: u8, col: u8, pressed: bool, time: Instant) -> Self {
        Self {
            pos: KeyPos::new(row, col),
            pressed,
            time,
        }
    }

    pub(crate) fn row(&self) -> usize {
        self.pos.row as usize
    }

    pub(crate) fn col(&self) -> usize {
        self.pos.col as usize
    }
}
