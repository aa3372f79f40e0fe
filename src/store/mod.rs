//! Store Module
//!
//! The shared in-memory reservation state.
//!
//! ## Locking discipline
//! - The store's reader/writer lock guards structural membership
//!   (create, lookup-by-id) only.
//! - Each event's own mutex guards its seat grid, so reserve/show on one
//!   event serialize against each other but never against other events.

mod event;
mod store;

pub use event::Event;
pub use store::EventStore;
