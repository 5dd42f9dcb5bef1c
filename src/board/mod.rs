//! Board Module
//!
//! Shared score state between the game thread and the network thread.
//!
//! ## Ownership
//! - Game thread writes `local`, network thread reads it before each send
//! - Network thread writes `remote`, game thread reads it every frame
//!
//! Both halves are whole-record snapshots behind `RwLock`, so a reader never
//! observes a half-updated record.

mod shared;

pub use shared::ScoreBoard;

use crate::protocol::PlayerState;

/// Latest opponent state received from the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoteSnapshot {
    /// Opponent's active flag, position and score
    pub opponent: PlayerState,

    /// Number of messages applied so far (0 = nothing received yet)
    pub sequence: u64,
}
