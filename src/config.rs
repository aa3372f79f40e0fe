//! Configuration for reservd
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Default number of worker threads (and queue capacity)
pub const MAX_SESSION_COUNT: usize = 8;

/// Default simulated state-access delay applied on each event lookup
pub const STATE_ACCESS_DELAY: Duration = Duration::from_millis(500);

/// Main configuration for a reservd server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Channel Configuration
    // -------------------------------------------------------------------------
    /// Path of the well-known registration FIFO
    pub registration_path: PathBuf,

    /// How long a worker waits for a client to open its session channels
    /// before abandoning the session
    pub channel_open_timeout: Duration,

    // -------------------------------------------------------------------------
    // Worker Configuration
    // -------------------------------------------------------------------------
    /// Number of worker threads (bounds concurrently serviced sessions)
    pub worker_count: usize,

    /// Capacity of the pending-session queue
    pub max_sessions: usize,

    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Simulated delay applied on each event lookup
    pub state_access_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registration_path: PathBuf::from("/tmp/reservd.fifo"),
            channel_open_timeout: Duration::from_secs(5),
            worker_count: MAX_SESSION_COUNT,
            max_sessions: MAX_SESSION_COUNT,
            state_access_delay: STATE_ACCESS_DELAY,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the registration FIFO path
    pub fn registration_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.registration_path = path.into();
        self
    }

    /// Set the session channel open timeout
    pub fn channel_open_timeout(mut self, timeout: Duration) -> Self {
        self.config.channel_open_timeout = timeout;
        self
    }

    /// Set the number of worker threads
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// Set the pending-session queue capacity
    pub fn max_sessions(mut self, count: usize) -> Self {
        self.config.max_sessions = count;
        self
    }

    /// Set the simulated state-access delay
    pub fn state_access_delay(mut self, delay: Duration) -> Self {
        self.config.state_access_delay = delay;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
