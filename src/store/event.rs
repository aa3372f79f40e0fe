//! Event and seat grid
//!
//! One event owns a fixed-size seat grid behind its own mutex, so
//! reservations on distinct events never contend with each other.

use parking_lot::Mutex;

use crate::error::{ReservdError, Result};
use crate::protocol::{Seating, MAX_GRID_SEATS};

/// Mutable seat state, guarded by the event's mutex
struct SeatGrid {
    /// Monotonically increasing reservation counter, starts at 0
    reservations: u32,

    /// Row-major markers, 0 = free, else the reservation id that claimed it
    seats: Vec<u32>,
}

/// A reservable seat grid identified by a numeric id
pub struct Event {
    id: u32,
    rows: u64,
    cols: u64,
    grid: Mutex<SeatGrid>,
}

impl Event {
    /// Create an event with an all-free grid.
    ///
    /// Grids must be non-empty and no larger than `MAX_GRID_SEATS`.
    pub(super) fn new(id: u32, rows: u64, cols: u64) -> Result<Self> {
        let total = rows
            .checked_mul(cols)
            .filter(|&n| n > 0 && n <= MAX_GRID_SEATS)
            .ok_or(ReservdError::InvalidDimensions { rows, cols })?;
        Ok(Self {
            id,
            rows,
            cols,
            grid: Mutex::new(SeatGrid {
                reservations: 0,
                seats: vec![0; total as usize],
            }),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn cols(&self) -> u64 {
        self.cols
    }

    /// Row-major index of a 1-based (row, col) pair.
    ///
    /// Assumes the pair has already been bounds-checked.
    fn seat_index(&self, row: u64, col: u64) -> usize {
        ((row - 1) * self.cols + (col - 1)) as usize
    }

    /// Atomically reserve every seat in `seats`, returning the reservation id.
    ///
    /// Every pair is validated as in-bounds and free before any seat is
    /// written; an invalid pair fails the whole call with the grid untouched.
    pub fn reserve(&self, seats: &[(u64, u64)]) -> Result<u32> {
        let mut grid = self.grid.lock();

        for &(row, col) in seats {
            if row == 0 || row > self.rows || col == 0 || col > self.cols {
                return Err(ReservdError::SeatOutOfBounds { row, col });
            }
        }
        for &(row, col) in seats {
            if grid.seats[self.seat_index(row, col)] != 0 {
                return Err(ReservdError::SeatAlreadyReserved { row, col });
            }
        }

        grid.reservations += 1;
        let reservation_id = grid.reservations;
        for &(row, col) in seats {
            let index = self.seat_index(row, col);
            grid.seats[index] = reservation_id;
        }

        Ok(reservation_id)
    }

    /// Take a consistent snapshot of the grid.
    pub fn snapshot(&self) -> Seating {
        let grid = self.grid.lock();
        Seating {
            rows: self.rows,
            cols: self.cols,
            seats: grid.seats.clone(),
        }
    }
}
