//! Error types for ScoreLink
//!
//! Provides a unified error type for codec, protocol and network operations.

use thiserror::Error;

use crate::codec::Kind;

/// Result type alias using LinkError
pub type Result<T> = std::result::Result<T, LinkError>;

/// Unified error type for ScoreLink operations
#[derive(Debug, Error)]
pub enum LinkError {
    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    /// Type-directive count disagrees with the supplied value/slot count
    #[error("Usage error: format has {directives} type directives but {supplied} values were supplied")]
    Usage { directives: usize, supplied: usize },

    #[error("Unsupported type directive: {0:?}")]
    UnsupportedType(char),

    #[error("Buffer too short: format needs {needed} bytes, got {available}")]
    BufferTooShort { needed: usize, available: usize },

    #[error("Value {value} does not fit in {kind}")]
    ValueOutOfRange { value: i128, kind: Kind },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LinkError {
    /// True for I/O failures that mean the peer went away
    /// (EOF, reset, abort, broken pipe) rather than a real fault.
    pub fn is_disconnect(&self) -> bool {
        match self {
            LinkError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// True for read/write timeouts (WouldBlock on Unix, TimedOut on Windows)
    pub fn is_timeout(&self) -> bool {
        match self {
            LinkError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
