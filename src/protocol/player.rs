//! Player definitions
//!
//! Identifies the two seats in a match and the per-player state that
//! travels over the wire.

/// Seat of a player within a relayed pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    /// The opposing seat
    pub fn other(self) -> PlayerSlot {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    /// Zero-based index (One = 0, Two = 1)
    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    /// 1-based seat number as sent on the wire
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Parse a 1-based seat number
    pub fn from_number(n: u8) -> Option<PlayerSlot> {
        match n {
            1 => Some(PlayerSlot::One),
            2 => Some(PlayerSlot::Two),
            _ => None,
        }
    }
}

/// What one player reports each exchange iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerState {
    /// Whether the player is currently in a run
    pub active: bool,

    /// Lane / cursor position
    pub position: i16,

    /// Current score
    pub score: i16,
}

impl PlayerState {
    pub fn new(active: bool, position: i16, score: i16) -> Self {
        Self {
            active,
            position,
            score,
        }
    }
}
