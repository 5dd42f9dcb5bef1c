//! ScoreBoard Tests
//!
//! Tests verify:
//! - Local state set/update/read
//! - Remote snapshot application and sequencing
//! - Snapshots are never torn under concurrent access

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use scorelink::board::{RemoteSnapshot, ScoreBoard};
use scorelink::protocol::{PlayerSlot, PlayerState, ScoreMessage};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_board_is_empty() {
    let board = ScoreBoard::new();
    assert_eq!(board.local(), PlayerState::default());
    assert_eq!(board.remote(), RemoteSnapshot::default());
    assert_eq!(board.sequence(), 0);
}

#[test]
fn test_set_and_update_local() {
    let board = ScoreBoard::new();
    board.set_local(PlayerState::new(true, 4, 10));
    board.update_local(|s| {
        s.score += 5;
        s.position = -1;
    });

    assert_eq!(board.local(), PlayerState::new(true, -1, 15));
}

#[test]
fn test_clones_share_state() {
    let board = ScoreBoard::new();
    let other = board.clone();

    other.set_local(PlayerState::new(true, 2, 3));
    assert_eq!(board.local(), PlayerState::new(true, 2, 3));
}

#[test]
fn test_apply_remote_takes_opponent_slot() {
    let board = ScoreBoard::new();
    let msg = ScoreMessage {
        peer1_active: true,
        peer1_position: 1,
        peer2_active: false,
        peer2_position: 7,
        opponent_score: 99,
    };

    let as_one = board.apply_remote(&msg, PlayerSlot::One);
    assert_eq!(as_one.opponent, PlayerState::new(false, 7, 99));
    assert_eq!(as_one.sequence, 1);

    let as_two = board.apply_remote(&msg, PlayerSlot::Two);
    assert_eq!(as_two.opponent, PlayerState::new(true, 1, 99));
    assert_eq!(as_two.sequence, 2);

    assert_eq!(board.remote(), as_two);
}

#[test]
fn test_remote_does_not_touch_local() {
    let board = ScoreBoard::new();
    board.set_local(PlayerState::new(true, 5, 50));
    board.apply_remote(&ScoreMessage::default(), PlayerSlot::One);

    assert_eq!(board.local(), PlayerState::new(true, 5, 50));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_snapshots_are_consistent() {
    let board = ScoreBoard::new();
    let done = Arc::new(AtomicBool::new(false));

    // Writer keeps position == score in every message it applies
    let writer_board = board.clone();
    let writer = thread::spawn(move || {
        for i in 0..10_000i32 {
            let v = (i % i16::MAX as i32) as i16;
            let msg = ScoreMessage {
                peer2_active: i % 2 == 0,
                peer2_position: v,
                opponent_score: v,
                ..ScoreMessage::default()
            };
            writer_board.apply_remote(&msg, PlayerSlot::One);
        }
    });

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let board = board.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_sequence = 0;
                while !done.load(Ordering::Acquire) {
                    let snapshot = board.remote();
                    assert_eq!(snapshot.opponent.position, snapshot.opponent.score);
                    assert!(snapshot.sequence >= last_sequence);
                    last_sequence = snapshot.sequence;
                }
            })
        })
        .collect();

    writer.join().unwrap();
    done.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(board.sequence(), 10_000);
}

#[test]
fn test_concurrent_local_updates_are_not_lost() {
    let board = ScoreBoard::new();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let board = board.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    board.update_local(|s| s.score += 1);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(board.local().score, 800);
}
