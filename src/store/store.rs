//! Event store
//!
//! Insertion-ordered collection of events behind a single reader/writer
//! lock. The lock guards membership and lookup only; seat mutations go
//! through each event's own mutex, so operations on distinct events run in
//! parallel.
//!
//! The store is an explicit context object shared via `Arc`; there is no
//! process-global state.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::error::{ReservdError, Result};
use crate::protocol::Seating;
use super::event::Event;

struct Inner {
    /// Events in insertion order
    events: Vec<Arc<Event>>,

    /// id -> index into `events`
    index: HashMap<u32, usize>,
}

/// Shared in-memory store of events
pub struct EventStore {
    inner: RwLock<Inner>,

    /// Simulated cost of touching the shared state, applied per lookup
    state_access_delay: Duration,
}

impl EventStore {
    /// Create an empty store with the given simulated access delay.
    pub fn new(state_access_delay: Duration) -> Self {
        Self {
            inner: RwLock::new(Inner {
                events: Vec::new(),
                index: HashMap::new(),
            }),
            state_access_delay,
        }
    }

    /// Sleep for the configured state-access delay.
    fn delay(&self) {
        if !self.state_access_delay.is_zero() {
            std::thread::sleep(self.state_access_delay);
        }
    }

    /// Look up an event, simulating costly state access.
    ///
    /// Takes the read lock only for the lookup itself; callers then operate
    /// on the event through its own mutex.
    fn get_event(&self, event_id: u32) -> Result<Arc<Event>> {
        self.delay();
        let inner = self.inner.read();
        inner
            .index
            .get(&event_id)
            .map(|&i| Arc::clone(&inner.events[i]))
            .ok_or(ReservdError::EventNotFound(event_id))
    }

    /// Create a new event with an all-free `rows` x `cols` grid.
    ///
    /// All-or-nothing: a failed creation is never visible in the store.
    pub fn create(&self, event_id: u32, rows: u64, cols: u64) -> Result<()> {
        let mut inner = self.inner.write();

        self.delay();
        if inner.index.contains_key(&event_id) {
            return Err(ReservdError::DuplicateEvent(event_id));
        }

        let event = Arc::new(Event::new(event_id, rows, cols)?);
        let index = inner.events.len();
        inner.events.push(event);
        inner.index.insert(event_id, index);
        Ok(())
    }

    /// Atomically reserve seats on an event, returning the reservation id.
    pub fn reserve(&self, event_id: u32, seats: &[(u64, u64)]) -> Result<u32> {
        let event = self.get_event(event_id)?;
        event.reserve(seats)
    }

    /// Take a consistent snapshot of an event's grid.
    pub fn show(&self, event_id: u32) -> Result<Seating> {
        let event = self.get_event(event_id)?;
        Ok(event.snapshot())
    }

    /// Ids of all events, in insertion order.
    pub fn list(&self) -> Vec<u32> {
        let inner = self.inner.read();
        inner.events.iter().map(|e| e.id()).collect()
    }

    /// Suspend the calling thread for `delay`.
    ///
    /// Simulates slow command processing; affects only the caller.
    pub fn wait(&self, delay: Duration) {
        std::thread::sleep(delay);
    }

    /// Write a full listing (each event id and its grid) to `out`.
    ///
    /// An empty store reports `No events` rather than an error.
    pub fn dump<W: Write>(&self, out: &mut W) -> Result<()> {
        // Snapshot membership first, then render each grid under its own lock
        let events: Vec<Arc<Event>> = {
            let inner = self.inner.read();
            inner.events.iter().map(Arc::clone).collect()
        };

        if events.is_empty() {
            writeln!(out, "No events")?;
            return Ok(());
        }

        for event in events {
            writeln!(out, "Event: {}", event.id())?;
            write!(out, "{}", event.snapshot())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> EventStore {
        EventStore::new(Duration::ZERO)
    }

    #[test]
    fn test_create_then_show_is_all_zero() {
        let store = store();
        store.create(1, 2, 3).unwrap();

        let seating = store.show(1).unwrap();
        assert_eq!(seating.rows, 2);
        assert_eq!(seating.cols, 3);
        assert_eq!(seating.seats, vec![0; 6]);
    }

    #[test]
    fn test_duplicate_event_rejected() {
        let store = store();
        store.create(1, 2, 2).unwrap();
        assert!(matches!(
            store.create(1, 5, 5),
            Err(ReservdError::DuplicateEvent(1))
        ));

        // The original grid survives
        assert_eq!(store.show(1).unwrap().rows, 2);
    }

    #[test]
    fn test_missing_event_not_found() {
        let store = store();
        assert!(matches!(
            store.show(9),
            Err(ReservdError::EventNotFound(9))
        ));
        assert!(matches!(
            store.reserve(9, &[(1, 1)]),
            Err(ReservdError::EventNotFound(9))
        ));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = store();
        store.create(5, 1, 1).unwrap();
        store.create(2, 1, 1).unwrap();
        store.create(9, 1, 1).unwrap();

        assert_eq!(store.list(), vec![5, 2, 9]);
    }

    #[test]
    fn test_list_empty() {
        assert!(store().list().is_empty());
    }

    #[test]
    fn test_concurrent_disjoint_reserves_all_succeed() {
        let store = store();
        store.create(1, 8, 8).unwrap();

        crossbeam::thread::scope(|s| {
            for row in 1..=8u64 {
                let store = &store;
                s.spawn(move |_| {
                    let seats: Vec<_> = (1..=8).map(|col| (row, col)).collect();
                    store.reserve(1, &seats).unwrap();
                });
            }
        })
        .unwrap();

        // Union of all claims: every seat taken, each row by one reservation
        let seating = store.show(1).unwrap();
        assert!(seating.seats.iter().all(|&s| s != 0));
        for row in 1..=8 {
            let first = seating.seat(row, 1).unwrap();
            for col in 2..=8 {
                assert_eq!(seating.seat(row, col), Some(first));
            }
        }
    }

    #[test]
    fn test_concurrent_overlapping_reserves_one_winner() {
        for _ in 0..20 {
            let store = store();
            store.create(1, 2, 2).unwrap();

            let outcomes: Vec<bool> = crossbeam::thread::scope(|s| {
                let h1 = {
                    let store = &store;
                    s.spawn(move |_| store.reserve(1, &[(1, 1), (1, 2)]).is_ok())
                };
                let h2 = {
                    let store = &store;
                    s.spawn(move |_| store.reserve(1, &[(1, 1), (2, 1)]).is_ok())
                };
                vec![h1.join().unwrap(), h2.join().unwrap()]
            })
            .unwrap();

            // Exactly one call wins and the loser left no partial writes
            assert_eq!(outcomes.iter().filter(|&&ok| ok).count(), 1);

            let seating = store.show(1).unwrap();
            let taken = seating.seats.iter().filter(|&&s| s != 0).count();
            assert_eq!(taken, 2);
        }
    }

    #[test]
    fn test_reserves_on_distinct_events_in_parallel() {
        let store = store();
        store.create(1, 4, 4).unwrap();
        store.create(2, 4, 4).unwrap();

        crossbeam::thread::scope(|s| {
            for id in [1u32, 2u32] {
                let store = &store;
                s.spawn(move |_| {
                    for row in 1..=4u64 {
                        for col in 1..=4u64 {
                            store.reserve(id, &[(row, col)]).unwrap();
                        }
                    }
                });
            }
        })
        .unwrap();

        for id in [1, 2] {
            let seating = store.show(id).unwrap();
            assert!(seating.seats.iter().all(|&s| s != 0));
        }
    }

    #[test]
    fn test_wait_suspends_only_the_caller() {
        let store = store();
        store.create(1, 1, 1).unwrap();

        crossbeam::thread::scope(|s| {
            let waiter = {
                let store = &store;
                s.spawn(move |_| {
                    let start = std::time::Instant::now();
                    store.wait(Duration::from_millis(100));
                    start.elapsed()
                })
            };

            // Other threads keep operating on the store meanwhile
            store.reserve(1, &[(1, 1)]).unwrap();
            assert_eq!(store.show(1).unwrap().seat(1, 1), Some(1));

            assert!(waiter.join().unwrap() >= Duration::from_millis(100));
        })
        .unwrap();
    }

    #[test]
    fn test_dump_listing() {
        let store = store();
        let mut out = Vec::new();
        store.dump(&mut out).unwrap();
        assert_eq!(out, b"No events\n");

        store.create(1, 1, 2).unwrap();
        store.reserve(1, &[(1, 1)]).unwrap();

        let mut out = Vec::new();
        store.dump(&mut out).unwrap();
        assert_eq!(out, b"Event: 1\n1 0\n");
    }
}
