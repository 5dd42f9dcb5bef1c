//! Configuration for ScoreLink
//!
//! Centralized configuration with sensible defaults.

use crate::error::{LinkError, Result};

/// Main configuration for a relay or exchange client
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Client Configuration
    // -------------------------------------------------------------------------
    /// Relay address the exchange client connects to
    pub relay_addr: String,

    /// Pause between exchange iterations (milliseconds, 0 = back-to-back)
    pub exchange_interval_ms: u64,

    // -------------------------------------------------------------------------
    // Relay Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address for the relay
    pub listen_addr: String,

    /// Max concurrent player pairs served by the relay
    pub max_sessions: usize,

    // -------------------------------------------------------------------------
    // Socket Configuration
    // -------------------------------------------------------------------------
    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_addr: "127.0.0.1:7777".to_string(),
            exchange_interval_ms: 16, // ~one frame at 60 fps
            listen_addr: "127.0.0.1:7777".to_string(),
            max_sessions: 64,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the config for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.relay_addr.is_empty() {
            return Err(LinkError::Config("relay_addr must not be empty".to_string()));
        }
        if self.listen_addr.is_empty() {
            return Err(LinkError::Config("listen_addr must not be empty".to_string()));
        }
        if self.max_sessions == 0 {
            return Err(LinkError::Config(
                "max_sessions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the relay address clients connect to
    pub fn relay_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.relay_addr = addr.into();
        self
    }

    /// Set the pause between exchange iterations (in milliseconds)
    pub fn exchange_interval_ms(mut self, ms: u64) -> Self {
        self.config.exchange_interval_ms = ms;
        self
    }

    /// Set the relay listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent player pairs
    pub fn max_sessions(mut self, count: usize) -> Self {
        self.config.max_sessions = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
