//! Score message
//!
//! The single fixed-size record exchanged between game clients and the relay.
//!
//! ## Wire Format (little-endian, 8 bytes, no framing)
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┐
//! │ P1 act(1)│ P1 pos(2)│ P2 act(1)│ P2 pos(2)│ Score (2)│
//! └──────────┴──────────┴──────────┴──────────┴──────────┘
//!   bool       i16        bool       i16        i16
//! ```

use std::io::{Read, Write};

use crate::codec::{field, pack_into, unpack_from, Kind, Record, Value};
use crate::error::{LinkError, Result};
use super::{PlayerSlot, PlayerState};

/// Format string for `ScoreMessage`
pub const MESSAGE_FORMAT: &str = "<?h?hh";

/// Encoded size of a `ScoreMessage` in bytes
pub const MESSAGE_SIZE: usize = 8;

/// Format string for the seat assignment the relay sends on pairing
pub const SEAT_FORMAT: &str = "<B";

/// One exchange record
///
/// Clients fill their own slot and put their own score in
/// `opponent_score`; the relay rewrites `opponent_score` so each recipient
/// gets the other player's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreMessage {
    pub peer1_active: bool,
    pub peer1_position: i16,
    pub peer2_active: bool,
    pub peer2_position: i16,
    pub opponent_score: i16,
}

impl Record for ScoreMessage {
    const FORMAT: &'static str = MESSAGE_FORMAT;
    const KINDS: &'static [Kind] = &[Kind::Bool, Kind::I16, Kind::Bool, Kind::I16, Kind::I16];

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Bool(self.peer1_active),
            Value::I16(self.peer1_position),
            Value::Bool(self.peer2_active),
            Value::I16(self.peer2_position),
            Value::I16(self.opponent_score),
        ]
    }

    fn from_values(values: &[Value]) -> Result<Self> {
        Ok(Self {
            peer1_active: field(values, 0)?,
            peer1_position: field(values, 1)?,
            peer2_active: field(values, 2)?,
            peer2_position: field(values, 3)?,
            opponent_score: field(values, 4)?,
        })
    }
}

impl ScoreMessage {
    /// Build the message a client sends for its own seat
    pub fn report(slot: PlayerSlot, state: PlayerState) -> Self {
        let mut msg = Self {
            opponent_score: state.score,
            ..Self::default()
        };
        msg.set_slot(slot, state.active, state.position);
        msg
    }

    /// Build what the relay sends to `recipient` after collecting one report
    /// from each seat
    pub fn relayed(from_p1: &ScoreMessage, from_p2: &ScoreMessage, recipient: PlayerSlot) -> Self {
        let opponent_score = match recipient {
            PlayerSlot::One => from_p2.opponent_score,
            PlayerSlot::Two => from_p1.opponent_score,
        };
        Self {
            peer1_active: from_p1.peer1_active,
            peer1_position: from_p1.peer1_position,
            peer2_active: from_p2.peer2_active,
            peer2_position: from_p2.peer2_position,
            opponent_score,
        }
    }

    /// Active flag and position carried for `slot`; `score` is
    /// `opponent_score` as received
    pub fn state_of(&self, slot: PlayerSlot) -> PlayerState {
        let (active, position) = match slot {
            PlayerSlot::One => (self.peer1_active, self.peer1_position),
            PlayerSlot::Two => (self.peer2_active, self.peer2_position),
        };
        PlayerState::new(active, position, self.opponent_score)
    }

    fn set_slot(&mut self, slot: PlayerSlot, active: bool, position: i16) {
        match slot {
            PlayerSlot::One => {
                self.peer1_active = active;
                self.peer1_position = position;
            }
            PlayerSlot::Two => {
                self.peer2_active = active;
                self.peer2_position = position;
            }
        }
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read exactly one message from a stream
///
/// Blocks until all 8 bytes arrive or an error occurs
pub fn read_message<R: Read>(reader: &mut R) -> Result<ScoreMessage> {
    ScoreMessage::read_from(reader)
}

/// Write one message to a stream and flush
pub fn write_message<W: Write>(writer: &mut W, message: &ScoreMessage) -> Result<()> {
    message.write_to(writer)
}

/// Read the seat assignment that precedes the first exchange round
pub fn read_seat<R: Read>(reader: &mut R) -> Result<PlayerSlot> {
    let values = unpack_from(reader, SEAT_FORMAT, &[Kind::U8])?;
    let number: u8 = field(&values, 0)?;
    PlayerSlot::from_number(number)
        .ok_or_else(|| LinkError::Protocol(format!("Invalid seat number {}", number)))
}

/// Write a seat assignment and flush
pub fn write_seat<W: Write>(writer: &mut W, slot: PlayerSlot) -> Result<()> {
    pack_into(writer, SEAT_FORMAT, &[Value::U8(slot.number())])
}
