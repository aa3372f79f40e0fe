//! Request definitions
//!
//! Represents requests from clients.

use crate::error::{ReservdError, Result};
use super::OP_CODE_LEN;

/// Operation codes carried in the leading ASCII tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    Setup = 1,
    Quit = 2,
    Create = 3,
    Reserve = 4,
    Show = 5,
    List = 6,
}

impl OpCode {
    /// The 9-byte ASCII tag for this op code
    pub fn tag(self) -> [u8; OP_CODE_LEN] {
        let mut tag = *b"OP_CODE=0";
        tag[OP_CODE_LEN - 1] = b'0' + self as u8;
        tag
    }

    /// Parse a 9-byte tag
    pub fn from_tag(tag: &[u8; OP_CODE_LEN]) -> Result<Self> {
        if &tag[..OP_CODE_LEN - 1] != b"OP_CODE=" {
            return Err(ReservdError::Protocol(format!(
                "malformed op tag: {:?}",
                String::from_utf8_lossy(tag)
            )));
        }
        match tag[OP_CODE_LEN - 1] {
            b'1' => Ok(OpCode::Setup),
            b'2' => Ok(OpCode::Quit),
            b'3' => Ok(OpCode::Create),
            b'4' => Ok(OpCode::Reserve),
            b'5' => Ok(OpCode::Show),
            b'6' => Ok(OpCode::List),
            other => Err(ReservdError::Protocol(format!(
                "unknown op code: {}",
                other as char
            ))),
        }
    }
}

/// A new-session request read from the registration channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    /// Name of the FIFO the client sends requests on
    pub request_path: String,

    /// Name of the FIFO the client reads responses from
    pub response_path: String,
}

/// A parsed per-session request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// End the session
    Quit,

    /// Create an event with the given grid dimensions
    Create { event_id: u32, rows: u64, cols: u64 },

    /// Atomically reserve a set of (row, col) seats
    Reserve {
        event_id: u32,
        seats: Vec<(u64, u64)>,
    },

    /// Snapshot an event's seat grid
    Show { event_id: u32 },

    /// List the ids of all events
    List,
}

impl Request {
    /// Get the op code for this request
    pub fn op_code(&self) -> OpCode {
        match self {
            Request::Quit => OpCode::Quit,
            Request::Create { .. } => OpCode::Create,
            Request::Reserve { .. } => OpCode::Reserve,
            Request::Show { .. } => OpCode::Show,
            Request::List => OpCode::List,
        }
    }
}
