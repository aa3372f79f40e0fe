//! Protocol Module
//!
//! Defines the wire protocol for client-server communication over the
//! session FIFOs. All messages are fixed-layout binary; integers are
//! little-endian.
//!
//! ## Op Tags
//!
//! Every request starts with a 9-byte ASCII tag:
//! ```text
//! ┌───────────────────┐
//! │ "OP_CODE=N" (9)   │
//! └───────────────────┘
//! ```
//! - N=1: SETUP    (registration channel only)
//! - N=2: QUIT
//! - N=3: CREATE
//! - N=4: RESERVE
//! - N=5: SHOW
//! - N=6: LIST
//!
//! ## Request Payloads
//! - SETUP:   request FIFO name (40, NUL-padded) + response FIFO name (40)
//! - CREATE:  event_id (u32) + rows (u64) + cols (u64)
//! - RESERVE: event_id (u32) + count (u64) + count x row (u64) + count x col (u64)
//! - SHOW:    event_id (u32)
//! - QUIT/LIST: empty
//!
//! ## Response Payloads
//! Status first (i32, 0 = success, 1 = failure), then any result:
//! - SETUP:   session_id (u32), sent as the first message on the response FIFO
//! - CREATE/RESERVE: status
//! - SHOW:    status + rows (u64) + cols (u64) + rows*cols seat values (u32)
//! - LIST:    status + count (u32) + count event ids (u32)
//!
//! Variable-length fields are validated against [`MAX_RESERVATION_SIZE`] and
//! [`MAX_GRID_SEATS`] before any buffer is allocated.

mod codec;
mod command;
mod response;

/// Length of the leading ASCII op tag
pub const OP_CODE_LEN: usize = 9;

/// Fixed width of a FIFO name field in the setup message
pub const CHANNEL_NAME_LEN: usize = 40;

/// Maximum number of seats in a single reservation
pub const MAX_RESERVATION_SIZE: u64 = 256;

/// Maximum number of seats in one event grid
pub const MAX_GRID_SEATS: u64 = 1 << 20;

pub use command::{OpCode, RegistrationRequest, Request};
pub use response::{Seating, Status};

pub use codec::{
    read_list_response, read_op_code, read_registration_body, read_request_body,
    read_session_id, read_show_response, read_status, write_list_response,
    write_registration, write_request, write_session_id, write_show_response,
    write_status,
};
