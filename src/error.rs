//! Error types for reservd
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ReservdError
pub type Result<T> = std::result::Result<T, ReservdError>;

/// Unified error type for reservd operations
#[derive(Debug, Error)]
pub enum ReservdError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("Event {0} already exists")]
    DuplicateEvent(u32),

    #[error("Event {0} not found")]
    EventNotFound(u32),

    #[error("Invalid event dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: u64, cols: u64 },

    #[error("Seat ({row},{col}) is out of bounds")]
    SeatOutOfBounds { row: u64, col: u64 },

    #[error("Seat ({row},{col}) is already reserved")]
    SeatAlreadyReserved { row: u64, col: u64 },

    #[error("Reservation of {requested} seats exceeds the maximum of {max}")]
    ReservationTooLarge { requested: u64, max: u64 },

    // -------------------------------------------------------------------------
    // Channel Errors
    // -------------------------------------------------------------------------
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReservdError {
    /// Whether this error is a recoverable, per-request store failure.
    ///
    /// Recoverable errors become a failure status on the wire; everything
    /// else tears down the session that produced it.
    pub fn is_operation_failure(&self) -> bool {
        matches!(
            self,
            ReservdError::DuplicateEvent(_)
                | ReservdError::EventNotFound(_)
                | ReservdError::InvalidDimensions { .. }
                | ReservdError::SeatOutOfBounds { .. }
                | ReservdError::SeatAlreadyReserved { .. }
                | ReservdError::ReservationTooLarge { .. }
        )
    }
}
