//! Tests for the relay and exchange client
//!
//! These tests verify:
//! - Relay pairing, seat assignment and message merging over loopback TCP
//! - Partner teardown when one player leaves
//! - Session limit enforcement
//! - Exchange client rounds and the threaded event loop
//! - Event queue bounds and stopping an unpaired client

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use scorelink::network::{
    ExchangeClient, ExchangeEvent, PeerConnection, Relay, EVENT_QUEUE_CAPACITY,
};
use scorelink::protocol::{PlayerSlot, PlayerState, ScoreMessage};
use scorelink::{Config, Result, ScoreBoard};

// =============================================================================
// Helper Functions
// =============================================================================

fn start_relay(max_sessions: usize) -> (Arc<Relay>, SocketAddr, JoinHandle<Result<()>>) {
    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .max_sessions(max_sessions)
        .build();
    let relay = Arc::new(Relay::bind(config).unwrap());
    let addr = relay.local_addr().unwrap();

    let runner = Arc::clone(&relay);
    let handle = thread::spawn(move || runner.run());
    (relay, addr, handle)
}

fn stop_relay(relay: Arc<Relay>, handle: JoinHandle<Result<()>>) {
    relay.shutdown();
    handle.join().unwrap().unwrap();
}

fn client_config(addr: SocketAddr) -> Config {
    Config::builder()
        .relay_addr(addr.to_string())
        .exchange_interval_ms(0)
        .read_timeout_ms(5_000)
        .write_timeout_ms(5_000)
        .build()
}

fn connect(addr: SocketAddr) -> PeerConnection {
    let mut conn = PeerConnection::connect(&addr.to_string()).unwrap();
    conn.set_timeouts(5_000, 5_000).unwrap();
    conn
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

// =============================================================================
// Relay Tests
// =============================================================================

#[test]
fn test_relay_forwards_merged_states() {
    let (relay, addr, handle) = start_relay(4);

    let mut c1 = connect(addr);
    let mut c2 = connect(addr);
    assert_eq!(c1.recv_seat().unwrap(), PlayerSlot::One);
    assert_eq!(c2.recv_seat().unwrap(), PlayerSlot::Two);

    c1.send(&ScoreMessage::report(PlayerSlot::One, PlayerState::new(true, 3, 10)))
        .unwrap();
    c2.send(&ScoreMessage::report(PlayerSlot::Two, PlayerState::new(true, -4, 20)))
        .unwrap();

    let to_c1 = c1.recv().unwrap();
    let to_c2 = c2.recv().unwrap();

    assert_eq!(to_c1.state_of(PlayerSlot::Two), PlayerState::new(true, -4, 20));
    assert_eq!(to_c2.state_of(PlayerSlot::One), PlayerState::new(true, 3, 10));
    assert_eq!(to_c1.peer1_position, to_c2.peer1_position);
    assert_eq!(to_c1.peer2_position, to_c2.peer2_position);

    drop(c1);
    drop(c2);
    stop_relay(relay, handle);
}

#[test]
fn test_relay_runs_many_rounds() {
    let (relay, addr, handle) = start_relay(4);

    let mut c1 = connect(addr);
    let mut c2 = connect(addr);
    c1.recv_seat().unwrap();
    c2.recv_seat().unwrap();

    for round in 0..50i16 {
        c1.send(&ScoreMessage::report(PlayerSlot::One, PlayerState::new(true, round, round)))
            .unwrap();
        c2.send(&ScoreMessage::report(PlayerSlot::Two, PlayerState::new(true, -round, 2 * round)))
            .unwrap();

        assert_eq!(c1.recv().unwrap().opponent_score, 2 * round);
        assert_eq!(c2.recv().unwrap().opponent_score, round);
    }

    drop(c1);
    drop(c2);
    stop_relay(relay, handle);
}

#[test]
fn test_partner_disconnect_closes_session() {
    let (relay, addr, handle) = start_relay(4);

    let c1 = connect(addr);
    let mut c2 = connect(addr);
    assert_eq!(c2.recv_seat().unwrap(), PlayerSlot::Two);
    assert_eq!(relay.active_sessions(), 1);

    drop(c1);

    let err = c2.recv().unwrap_err();
    assert!(err.is_disconnect(), "unexpected error: {}", err);
    assert!(wait_for(|| relay.active_sessions() == 0));

    stop_relay(relay, handle);
}

#[test]
fn test_session_limit_drops_extra_clients() {
    let (relay, addr, handle) = start_relay(1);

    let a1 = connect(addr);
    let a2 = connect(addr);
    assert!(wait_for(|| relay.active_sessions() == 1));

    let mut b1 = connect(addr);
    let err = b1.recv_seat().unwrap_err();
    assert!(err.is_disconnect(), "unexpected error: {}", err);

    drop(a1);
    drop(a2);
    assert!(wait_for(|| relay.active_sessions() == 0));
    stop_relay(relay, handle);
}

#[test]
fn test_waiting_client_that_left_is_not_paired() {
    let (relay, addr, handle) = start_relay(4);

    let quitter = connect(addr);
    thread::sleep(Duration::from_millis(50));
    drop(quitter);
    thread::sleep(Duration::from_millis(50));

    // The next two arrivals form the pair
    let mut c1 = connect(addr);
    let mut c2 = connect(addr);
    assert_eq!(c1.recv_seat().unwrap(), PlayerSlot::One);
    assert_eq!(c2.recv_seat().unwrap(), PlayerSlot::Two);

    c1.send(&ScoreMessage::report(PlayerSlot::One, PlayerState::new(true, 1, 7)))
        .unwrap();
    c2.send(&ScoreMessage::report(PlayerSlot::Two, PlayerState::new(true, 2, 8)))
        .unwrap();
    assert_eq!(c1.recv().unwrap().state_of(PlayerSlot::Two), PlayerState::new(true, 2, 8));
    assert_eq!(c2.recv().unwrap().state_of(PlayerSlot::One), PlayerState::new(true, 1, 7));
    assert_eq!(relay.active_sessions(), 1);

    drop(c1);
    drop(c2);
    assert!(wait_for(|| relay.active_sessions() == 0));
    stop_relay(relay, handle);
}

// =============================================================================
// Exchange Client Tests
// =============================================================================

#[test]
fn test_exchange_clients_run_rounds() {
    let (relay, addr, handle) = start_relay(4);
    let config = client_config(addr);

    let board1 = ScoreBoard::new();
    board1.set_local(PlayerState::new(true, 5, 100));
    let board2 = ScoreBoard::new();
    board2.set_local(PlayerState::new(false, 7, 200));

    let mut client1 = ExchangeClient::connect(&config, board1.clone()).unwrap();
    let mut client2 = ExchangeClient::connect(&config, board2.clone()).unwrap();

    let t1 = thread::spawn(move || client1.run_rounds(3));
    let t2 = thread::spawn(move || client2.run_rounds(3));

    let snaps1 = t1.join().unwrap().unwrap();
    let snaps2 = t2.join().unwrap().unwrap();

    assert_eq!(snaps1.len(), 3);
    assert_eq!(snaps2.len(), 3);
    assert_eq!(board1.remote().opponent, PlayerState::new(false, 7, 200));
    assert_eq!(board2.remote().opponent, PlayerState::new(true, 5, 100));
    assert_eq!(board1.sequence(), 3);
    assert_eq!(board2.sequence(), 3);

    stop_relay(relay, handle);
}

#[test]
fn test_relay_seats_clients_in_arrival_order() {
    let (relay, addr, handle) = start_relay(4);
    let config = client_config(addr);

    let board_a = ScoreBoard::new();
    board_a.set_local(PlayerState::new(true, 9, 99));
    let board_b = ScoreBoard::new();
    board_b.set_local(PlayerState::new(true, 4, 44));

    let mut a = ExchangeClient::connect(&config, board_a.clone()).unwrap();
    let mut b = ExchangeClient::connect(&config, board_b.clone()).unwrap();
    assert_eq!(a.slot(), None);
    assert_eq!(b.slot(), None);

    // Run b's thread first; the seat still follows connection order
    let tb = thread::spawn(move || b.run_rounds(1).map(|_| b.slot()));
    let ta = thread::spawn(move || a.run_rounds(1).map(|_| a.slot()));

    assert_eq!(ta.join().unwrap().unwrap(), Some(PlayerSlot::One));
    assert_eq!(tb.join().unwrap().unwrap(), Some(PlayerSlot::Two));

    // Both sides see the full opponent state, not an empty seat
    assert_eq!(board_b.remote().opponent, PlayerState::new(true, 9, 99));
    assert_eq!(board_a.remote().opponent, PlayerState::new(true, 4, 44));

    stop_relay(relay, handle);
}

#[test]
fn test_spawned_exchange_reports_events() {
    let (relay, addr, handle) = start_relay(4);
    let config = client_config(addr);

    let board1 = ScoreBoard::new();
    board1.set_local(PlayerState::new(true, 1, 11));
    let board2 = ScoreBoard::new();
    board2.set_local(PlayerState::new(true, 2, 22));

    let h1 = ExchangeClient::connect(&config, board1.clone())
        .unwrap()
        .spawn()
        .unwrap();
    let h2 = ExchangeClient::connect(&config, board2.clone())
        .unwrap()
        .spawn()
        .unwrap();

    let first = h1.events().recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(first, ExchangeEvent::Seated(PlayerSlot::One));

    for _ in 0..3 {
        match h1.events().recv_timeout(Duration::from_secs(5)).unwrap() {
            ExchangeEvent::Received(snapshot) => {
                assert_eq!(snapshot.opponent, PlayerState::new(true, 2, 22));
            }
            other => panic!("Expected Received, got {:?}", other),
        }
    }

    h1.stop();
    h2.stop();

    let last = h1
        .events()
        .iter()
        .find(|e| !matches!(e, ExchangeEvent::Received(_)));
    assert_eq!(last, Some(ExchangeEvent::Closed));

    h1.join().unwrap();
    h2.join().unwrap();
    assert!(board2.sequence() >= 1);
    assert_eq!(board2.remote().opponent.score, 11);

    stop_relay(relay, handle);
}

#[test]
fn test_undrained_events_stay_bounded() {
    let (relay, addr, handle) = start_relay(4);
    let config = client_config(addr);

    let board1 = ScoreBoard::new();
    let board2 = ScoreBoard::new();
    let h1 = ExchangeClient::connect(&config, board1.clone())
        .unwrap()
        .spawn()
        .unwrap();
    let h2 = ExchangeClient::connect(&config, board2.clone())
        .unwrap()
        .spawn()
        .unwrap();

    // Nobody reads events while many rounds go by
    let target = 10 * EVENT_QUEUE_CAPACITY as u64;
    assert!(wait_for(|| board1.sequence() > target));
    assert_eq!(h1.events().capacity(), Some(EVENT_QUEUE_CAPACITY));
    assert!(h1.events().len() <= EVENT_QUEUE_CAPACITY);

    h1.stop();
    h2.stop();

    // The closing event still gets through a full queue
    let events: Vec<ExchangeEvent> = h1.events().iter().collect();
    assert!(events.len() <= EVENT_QUEUE_CAPACITY);
    assert_eq!(events.first(), Some(&ExchangeEvent::Seated(PlayerSlot::One)));
    assert_eq!(events.last(), Some(&ExchangeEvent::Closed));

    h1.join().unwrap();
    h2.join().unwrap();
    stop_relay(relay, handle);
}

#[test]
fn test_stop_unblocks_client_waiting_for_partner() {
    let (relay, addr, handle) = start_relay(4);

    // No timeouts: only stop() can end the pending read
    let config = Config::builder().relay_addr(addr.to_string()).build();
    let h = ExchangeClient::connect(&config, ScoreBoard::new())
        .unwrap()
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(20));
    h.stop();

    let event = h.events().recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(event, ExchangeEvent::Closed);
    h.join().unwrap();

    stop_relay(relay, handle);
}

#[test]
fn test_connect_to_missing_relay_fails() {
    // Bind then drop to get a port with nothing listening
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let result = ExchangeClient::connect(&client_config(addr), ScoreBoard::new());
    assert!(result.is_err());
}
