//! Protocol Module
//!
//! Defines the score exchange protocol between game clients and the relay.
//!
//! ## Exchange Round
//! ```text
//!  client 1            relay            client 2
//!     │◄─── seat(1) ───  │  ─── seat(1) ───►│   once, on pairing
//!     │── report(8) ──►  │  ◄── report(8) ──│
//!     │◄─ relayed(8) ──  │  ── relayed(8) ─►│
//! ```
//!
//! Clients send nothing until the relay has told them their seat. After that
//! every message is exactly `MESSAGE_SIZE` bytes with no length prefix.

mod player;
mod message;

pub use player::{PlayerSlot, PlayerState};
pub use message::{
    read_message, read_seat, write_message, write_seat, ScoreMessage, MESSAGE_FORMAT,
    MESSAGE_SIZE, SEAT_FORMAT,
};
