//! Response definitions
//!
//! Represents responses to clients.

use std::fmt;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Failure,
}

impl Status {
    /// Wire representation (original int convention: 0 ok, 1 failure)
    pub fn as_i32(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Failure => 1,
        }
    }

    /// Parse the wire representation; any non-zero value is a failure.
    pub fn from_i32(value: i32) -> Self {
        if value == 0 {
            Status::Ok
        } else {
            Status::Failure
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }
}

/// A consistent snapshot of one event's seat grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seating {
    pub rows: u64,
    pub cols: u64,

    /// Row-major reservation markers, 0 = free
    pub seats: Vec<u32>,
}

impl Seating {
    /// The marker at 1-based (row, col), or `None` when out of bounds
    pub fn seat(&self, row: u64, col: u64) -> Option<u32> {
        if row == 0 || row > self.rows || col == 0 || col > self.cols {
            return None;
        }
        let index = (row - 1) * self.cols + (col - 1);
        self.seats.get(index as usize).copied()
    }
}

impl fmt::Display for Seating {
    /// Renders row-major, space-separated within a row, newline per row.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.seats[(row * self.cols + col) as usize])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
