//! ScoreBoard implementation
//!
//! Two RwLock-protected snapshots behind a cloneable handle.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::protocol::{PlayerSlot, PlayerState, ScoreMessage};
use super::RemoteSnapshot;

/// Cloneable handle to shared score state
///
/// ## Concurrency:
/// - `local`: written by the game thread, read by the network thread
/// - `remote`: written by the network thread, read by the game thread
/// - Each write replaces the whole snapshot under the write lock
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    local: RwLock<PlayerState>,
    remote: RwLock<RemoteSnapshot>,
}

impl ScoreBoard {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Local player (game thread writes)
    // =========================================================================

    /// Replace the local player's state
    pub fn set_local(&self, state: PlayerState) {
        *self.inner.local.write() = state;
    }

    /// Modify the local player's state in place
    pub fn update_local<F: FnOnce(&mut PlayerState)>(&self, f: F) {
        let mut guard = self.inner.local.write();
        f(&mut *guard);
    }

    /// Snapshot of the local player's state
    pub fn local(&self) -> PlayerState {
        *self.inner.local.read()
    }

    // =========================================================================
    // Remote player (network thread writes)
    // =========================================================================

    /// Record a message received from the relay
    ///
    /// `my_slot` is the local player's seat; the opponent's fields are taken
    /// from the other seat. Returns the snapshot that was stored.
    pub fn apply_remote(&self, message: &ScoreMessage, my_slot: PlayerSlot) -> RemoteSnapshot {
        let opponent = message.state_of(my_slot.other());
        let mut guard = self.inner.remote.write();
        guard.opponent = opponent;
        guard.sequence += 1;
        *guard
    }

    /// Snapshot of the latest opponent state
    pub fn remote(&self) -> RemoteSnapshot {
        *self.inner.remote.read()
    }

    /// Number of remote messages applied so far
    pub fn sequence(&self) -> u64 {
        self.inner.remote.read().sequence
    }
}
