//! Peer Connection
//!
//! Buffered, blocking message I/O over a single TCP stream.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::error::{LinkError, Result};
use crate::protocol::{read_message, read_seat, write_message, write_seat, PlayerSlot, ScoreMessage};

/// One end of a score exchange connection
pub struct PeerConnection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl PeerConnection {
    /// Wrap an established stream
    ///
    /// Sets up buffered I/O and disables Nagle
    pub fn new(stream: TcpStream) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Tiny fixed-size messages: don't let Nagle hold them back
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
        })
    }

    /// Connect to `addr` and wrap the stream
    pub fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| LinkError::Network(format!("Failed to connect to {}: {}", addr, e)))?;
        Self::new(stream)
    }

    /// Configure connection timeouts (0 leaves the direction fully blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Send one message (blocks until flushed)
    pub fn send(&mut self, message: &ScoreMessage) -> Result<()> {
        tracing::trace!("Sending to {}: {:?}", self.peer_addr, message);
        write_message(&mut self.writer, message)
    }

    /// Receive one message (blocks until all bytes arrive)
    pub fn recv(&mut self) -> Result<ScoreMessage> {
        let message = read_message(&mut self.reader)?;
        tracing::trace!("Received from {}: {:?}", self.peer_addr, message);
        Ok(message)
    }

    /// Tell the peer which seat it has been given
    pub fn send_seat(&mut self, slot: PlayerSlot) -> Result<()> {
        tracing::trace!("Seating {} as {:?}", self.peer_addr, slot);
        write_seat(&mut self.writer, slot)
    }

    /// Wait for the relay's seat assignment
    pub fn recv_seat(&mut self) -> Result<PlayerSlot> {
        read_seat(&mut self.reader)
    }

    /// Check without blocking whether the peer has closed its end
    ///
    /// Only reliable while the peer has no unread data in flight, which holds
    /// for a client still waiting to be seated.
    pub fn is_closed(&self) -> bool {
        let stream = self.reader.get_ref();
        if stream.set_nonblocking(true).is_err() {
            return true;
        }

        let mut buf = [0u8; 1];
        let closed = match stream.peek(&mut buf) {
            Ok(0) => true,
            Ok(_) => false,
            Err(e) => e.kind() != io::ErrorKind::WouldBlock,
        };

        stream.set_nonblocking(false).is_err() || closed
    }

    /// Independent handle to the underlying socket
    ///
    /// Lets another thread call `shutdown` to unblock a pending `recv`.
    pub fn try_clone_stream(&self) -> Result<TcpStream> {
        Ok(self.writer.get_ref().try_clone()?)
    }

    /// Close both directions; pending reads on either side return EOF
    pub fn shutdown(&self) {
        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Both) {
            tracing::trace!("Shutdown of {} failed: {}", self.peer_addr, e);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
