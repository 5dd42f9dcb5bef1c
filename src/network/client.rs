//! Exchange Client
//!
//! Runs the blocking send/receive loop on a dedicated thread so the game
//! thread never waits on the network.

use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};

use crate::board::{RemoteSnapshot, ScoreBoard};
use crate::config::Config;
use crate::error::{LinkError, Result};
use crate::protocol::{PlayerSlot, ScoreMessage};
use super::PeerConnection;

/// Capacity of the event queue handed out by `ExchangeHandle::events`
///
/// When nobody drains the queue, `Received` events are dropped once it is
/// nearly full. The board always holds the latest state, and one slot stays
/// free for the closing event.
pub const EVENT_QUEUE_CAPACITY: usize = 64;

/// Progress reported by the exchange thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeEvent {
    /// The relay paired this client and assigned its seat
    Seated(PlayerSlot),

    /// A relay message was applied to the board
    Received(RemoteSnapshot),

    /// Peer or relay went away, or the loop was stopped
    Closed,

    /// The loop ended on an error
    Failed(String),
}

/// A connected client that has not started its loop yet
///
/// The relay decides the seat. It is read from the connection before the
/// first exchange, which blocks until a partner has joined.
pub struct ExchangeClient {
    conn: PeerConnection,
    slot: Option<PlayerSlot>,
    board: ScoreBoard,
    interval: Duration,
}

impl ExchangeClient {
    /// Connect to `config.relay_addr`
    pub fn connect(config: &Config, board: ScoreBoard) -> Result<Self> {
        config.validate()?;

        let mut conn = PeerConnection::connect(&config.relay_addr)?;
        conn.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;

        tracing::debug!("Connected to relay {}", conn.peer_addr());

        Ok(Self {
            conn,
            slot: None,
            board,
            interval: Duration::from_millis(config.exchange_interval_ms),
        })
    }

    /// Seat assigned by the relay, once known
    pub fn slot(&self) -> Option<PlayerSlot> {
        self.slot
    }

    /// Block until the relay pairs this client and assigns its seat
    pub fn wait_for_seat(&mut self) -> Result<PlayerSlot> {
        if let Some(slot) = self.slot {
            return Ok(slot);
        }

        let slot = self.conn.recv_seat()?;
        tracing::debug!("Seated as {:?} by {}", slot, self.conn.peer_addr());
        self.slot = Some(slot);
        Ok(slot)
    }

    /// One iteration: send the local state, wait for the relay's reply,
    /// store it on the board
    pub fn exchange_once(&mut self) -> Result<RemoteSnapshot> {
        let slot = self.wait_for_seat()?;

        let report = ScoreMessage::report(slot, self.board.local());
        self.conn.send(&report)?;

        let reply = self.conn.recv()?;
        Ok(self.board.apply_remote(&reply, slot))
    }

    /// Run `rounds` iterations on the calling thread
    pub fn run_rounds(&mut self, rounds: usize) -> Result<Vec<RemoteSnapshot>> {
        let mut snapshots = Vec::with_capacity(rounds);
        for _ in 0..rounds {
            snapshots.push(self.exchange_once()?);
        }
        Ok(snapshots)
    }

    /// Move the loop onto its own thread
    pub fn spawn(self) -> Result<ExchangeHandle> {
        let (tx, rx) = channel::bounded(EVENT_QUEUE_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stream = self.conn.try_clone_stream()?;

        let thread_stop = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("scorelink-exchange".to_string())
            .spawn(move || self.run_loop(tx, thread_stop))?;

        Ok(ExchangeHandle {
            events: rx,
            stop,
            stream,
            thread: Some(thread),
        })
    }

    fn run_loop(mut self, events: Sender<ExchangeEvent>, stop: Arc<AtomicBool>) {
        let last = self.exchange_until_done(&events, &stop);
        // A slot is always left for this one
        let _ = events.try_send(last);
    }

    fn exchange_until_done(
        &mut self,
        events: &Sender<ExchangeEvent>,
        stop: &AtomicBool,
    ) -> ExchangeEvent {
        match self.wait_for_seat() {
            Ok(slot) => {
                let _ = events.try_send(ExchangeEvent::Seated(slot));
            }
            Err(e) => return self.closing_event(e, stop),
        }

        while !stop.load(Ordering::Acquire) {
            match self.exchange_once() {
                Ok(snapshot) => {
                    if events.len() + 1 < EVENT_QUEUE_CAPACITY {
                        let _ = events.try_send(ExchangeEvent::Received(snapshot));
                    } else {
                        tracing::trace!("Event queue full, dropped #{}", snapshot.sequence);
                    }
                }
                Err(e) => return self.closing_event(e, stop),
            }

            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }

        tracing::debug!("Exchange loop stopped for {:?}", self.slot);
        ExchangeEvent::Closed
    }

    fn closing_event(&self, e: LinkError, stop: &AtomicBool) -> ExchangeEvent {
        if e.is_disconnect() || stop.load(Ordering::Acquire) {
            tracing::debug!("Exchange with {} closed: {}", self.conn.peer_addr(), e);
            ExchangeEvent::Closed
        } else {
            tracing::warn!("Exchange with {} failed: {}", self.conn.peer_addr(), e);
            ExchangeEvent::Failed(e.to_string())
        }
    }
}

/// Handle to a running exchange thread
pub struct ExchangeHandle {
    events: Receiver<ExchangeEvent>,
    stop: Arc<AtomicBool>,
    stream: TcpStream,
    thread: Option<JoinHandle<()>>,
}

impl ExchangeHandle {
    /// Event stream from the exchange thread
    pub fn events(&self) -> &Receiver<ExchangeEvent> {
        &self.events
    }

    /// Ask the loop to stop
    ///
    /// Also shuts the socket down, so a receive blocked on the relay returns
    /// at once and the loop ends with `ExchangeEvent::Closed`.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
        let _ = self.stream.shutdown(Shutdown::Both);
    }

    /// Wait for the exchange thread to exit
    pub fn join(mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| LinkError::Network("exchange thread panicked".to_string())),
            None => Ok(()),
        }
    }
}
