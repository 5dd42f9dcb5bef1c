//! Relay Server
//!
//! Accepts clients in pairs and forwards each player's state to the other.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{PlayerSlot, ScoreMessage};
use super::PeerConnection;

/// How long the accept loop sleeps when no client is pending
const ACCEPT_POLL: Duration = Duration::from_millis(10);

/// TCP relay for two-player score exchange
///
/// Seats are assigned in connection order: the first client of a pair is
/// `PlayerSlot::One`, the second `PlayerSlot::Two`, and each is told its seat
/// before the first round. `run` takes `&self`, so wrap the relay in an `Arc`
/// to call `shutdown` from another thread.
pub struct Relay {
    config: Config,
    listener: TcpListener,
    shutdown: AtomicBool,
    active_sessions: Arc<AtomicUsize>,
}

impl Relay {
    /// Bind the listener described by `config.listen_addr`
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        // Non-blocking accept so `run` can notice shutdown
        listener.set_nonblocking(true)?;

        tracing::info!("Relay listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            listener,
            shutdown: AtomicBool::new(false),
            active_sessions: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Signal the accept loop to exit
    ///
    /// Pairs already being served keep running until a player leaves.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Number of pairs currently being relayed
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::Acquire)
    }

    /// Accept and pair clients until shutdown (blocking)
    pub fn run(&self) -> Result<()> {
        let mut waiting: Option<PeerConnection> = None;

        while !self.shutdown.load(Ordering::Acquire) {
            let stream = match self.listener.accept() {
                Ok((stream, _)) => stream,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL);
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };

            let conn = match self.prepare(stream) {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!("Dropping client: {}", e);
                    continue;
                }
            };

            // A client that gave up while waiting is replaced by the newcomer
            let first = waiting.take().filter(|first| {
                let alive = !first.is_closed();
                if !alive {
                    tracing::debug!("{} left before a partner arrived", first.peer_addr());
                }
                alive
            });

            match first {
                None => {
                    if self.active_sessions() >= self.config.max_sessions {
                        tracing::warn!(
                            "Session limit {} reached, dropping {}",
                            self.config.max_sessions,
                            conn.peer_addr()
                        );
                        conn.shutdown();
                        continue;
                    }
                    tracing::debug!("{} waiting for a partner", conn.peer_addr());
                    waiting = Some(conn);
                }
                Some(first) => {
                    if let Err(e) = self.start_session(first, conn) {
                        tracing::warn!("Dropping pair: {}", e);
                    }
                }
            }
        }

        if let Some(conn) = waiting {
            conn.shutdown();
        }
        tracing::info!("Relay stopped accepting");
        Ok(())
    }

    fn prepare(&self, stream: TcpStream) -> Result<PeerConnection> {
        // Some platforms hand back sockets inheriting the listener's mode
        stream.set_nonblocking(false)?;
        let mut conn = PeerConnection::new(stream)?;
        conn.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;
        Ok(conn)
    }

    fn start_session(&self, p1: PeerConnection, p2: PeerConnection) -> Result<()> {
        tracing::info!("Pairing {} (P1) with {} (P2)", p1.peer_addr(), p2.peer_addr());

        let sessions = Arc::clone(&self.active_sessions);
        sessions.fetch_add(1, Ordering::AcqRel);

        let spawned = thread::Builder::new()
            .name("scorelink-session".to_string())
            .spawn(move || {
                let _guard = SessionGuard(sessions);
                let (mut p1, mut p2) = (p1, p2);
                match serve_pair(&mut p1, &mut p2) {
                    Ok(rounds) => tracing::info!("Session ended after {} rounds", rounds),
                    Err(e) => tracing::warn!("Session failed: {}", e),
                }
            });

        if let Err(e) = spawned {
            self.active_sessions.fetch_sub(1, Ordering::AcqRel);
            return Err(e.into());
        }
        Ok(())
    }
}

/// Decrements the session count when a session thread exits
struct SessionGuard(Arc<AtomicUsize>);

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Seat two players and relay rounds between them until one leaves
///
/// `p1` is told it holds `PlayerSlot::One` and `p2` `PlayerSlot::Two`. Each
/// round then reads one report from each player and sends each the merged
/// message. Returns the number of completed rounds. Both connections are
/// shut down on exit so the remaining player's pending read returns.
pub fn serve_pair(p1: &mut PeerConnection, p2: &mut PeerConnection) -> Result<u64> {
    let result = relay_rounds(p1, p2);
    p1.shutdown();
    p2.shutdown();
    result
}

fn relay_rounds(p1: &mut PeerConnection, p2: &mut PeerConnection) -> Result<u64> {
    let mut rounds = 0u64;

    let err = match seat_players(p1, p2) {
        Ok(()) => loop {
            match relay_round(p1, p2) {
                Ok(()) => rounds += 1,
                Err(e) => break e,
            }
        },
        Err(e) => e,
    };

    if err.is_disconnect() {
        tracing::debug!("Player left after {} rounds: {}", rounds, err);
        Ok(rounds)
    } else if err.is_timeout() {
        tracing::debug!("Player timed out after {} rounds", rounds);
        Ok(rounds)
    } else {
        Err(err)
    }
}

fn seat_players(p1: &mut PeerConnection, p2: &mut PeerConnection) -> Result<()> {
    p1.send_seat(PlayerSlot::One)?;
    p2.send_seat(PlayerSlot::Two)
}

fn relay_round(p1: &mut PeerConnection, p2: &mut PeerConnection) -> Result<()> {
    let from_p1 = p1.recv()?;
    let from_p2 = p2.recv()?;

    p1.send(&ScoreMessage::relayed(&from_p1, &from_p2, PlayerSlot::One))?;
    p2.send(&ScoreMessage::relayed(&from_p1, &from_p2, PlayerSlot::Two))?;
    Ok(())
}
