//! # ScoreLink
//!
//! Binary struct packing and two-player score exchange:
//! - Format-string codec for fixed-width integers and booleans
//! - Fixed 8-byte score message (`"<?h?hh"`)
//! - Thread-safe score board shared by game and network threads
//! - Blocking TCP relay that pairs two clients
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐   reads    ┌──────────────┐   writes   ┌──────────────┐
//! │ Game Thread  │ ─────────► │  ScoreBoard  │ ◄───────── │   Exchange   │
//! │              │ ◄───────── │  (RwLock)    │ ─────────► │   Thread     │
//! └──────────────┘   writes   └──────────────┘   reads    └──────┬───────┘
//!                                                                │ 8 bytes
//!                                                                ▼
//!                                                         ┌──────────────┐
//!                                                         │    Relay     │
//!                                                         │ (pairs of 2) │
//!                                                         └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod protocol;
pub mod board;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LinkError, Result};
pub use config::Config;
pub use codec::{pack, unpack, unpack_one, Format, Kind, Record, Value};
pub use protocol::{PlayerSlot, PlayerState, ScoreMessage};
pub use board::ScoreBoard;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ScoreLink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
