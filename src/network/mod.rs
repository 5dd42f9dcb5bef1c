//! Network Module
//!
//! TCP relay and exchange client.
//!
//! ## Architecture
//! - Relay: single acceptor thread, one thread per player pair
//! - Client: one dedicated thread doing a blocking send + receive per iteration
//! - Relay assigns seats in arrival order and tells each client its seat
//! - No retry; a stalled peer stalls its pair

mod connection;
mod client;
mod server;

pub use connection::PeerConnection;
pub use client::{ExchangeClient, ExchangeEvent, ExchangeHandle, EVENT_QUEUE_CAPACITY};
pub use server::{serve_pair, Relay};
