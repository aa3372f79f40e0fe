//! # reservd
//!
//! A concurrent seat/event reservation server with:
//! - A shared in-memory event store under fine-grained locking
//! - Atomic multi-seat reservation (validate fully, then commit)
//! - A bounded producer/consumer session queue with backpressure
//! - A fixed worker-thread pool, one session per worker at a time
//! - A fixed-layout binary protocol over named FIFOs
//!
//! ## Architecture Overview
//!
//! ```text
//! client ──> registration FIFO ──> Dispatcher ──> BoundedQueue
//!                                                     │
//!                                              ┌──────┴──────┐
//!                                              ▼             ▼
//!                                          Worker 0  ...  Worker N
//!                                              │
//!                                  per-session FIFO pair + codec
//!                                              │
//!                                              ▼
//!                                    EventStore ──> Event (own mutex)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod channel;
pub mod client;
pub mod protocol;
pub mod queue;
pub mod server;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use client::Client;
pub use config::Config;
pub use error::{ReservdError, Result};
pub use server::Server;
pub use store::EventStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of reservd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
