//! Bounded session queue
//!
//! Fixed-capacity FIFO hand-off between the dispatcher (single producer) and
//! the worker pool (many consumers). `push` blocks while the queue is full,
//! `pop` blocks while it is empty, so a full queue exerts backpressure on the
//! accept loop instead of dropping sessions.
//!
//! Ordering is strict FIFO: sessions are serviced in registration order.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A blocking, bounded, multi-producer/multi-consumer FIFO queue.
pub struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    capacity: usize,

    /// Signaled when an item is removed (space available)
    not_full: Condvar,

    /// Signaled when an item is added (work available)
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            capacity,
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Insert an item, blocking while the queue is full.
    ///
    /// Returns the item back if the queue has been closed.
    pub fn push(&self, item: T) -> std::result::Result<(), T> {
        let mut inner = self.inner.lock();
        while inner.items.len() == self.capacity && !inner.closed {
            self.not_full.wait(&mut inner);
        }
        if inner.closed {
            return Err(item);
        }
        inner.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Remove the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` only after the queue has been closed and drained.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        while inner.items.is_empty() && !inner.closed {
            self.not_empty.wait(&mut inner);
        }
        match inner.items.pop_front() {
            Some(item) => {
                self.not_full.notify_one();
                Some(item)
            }
            None => None, // closed and drained
        }
    }

    /// Close the queue, waking all blocked producers and consumers.
    ///
    /// Items already queued are still handed out by `pop`.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Current number of queued items.
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Whether the queue currently holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of queued items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = BoundedQueue::new(4);
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.push(3).unwrap();

        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_blocks_when_full() {
        let queue = BoundedQueue::new(2);
        queue.push(1).unwrap();
        queue.push(2).unwrap();

        let inserted = AtomicBool::new(false);
        crossbeam::thread::scope(|s| {
            s.spawn(|_| {
                queue.push(3).unwrap();
                inserted.store(true, Ordering::SeqCst);
            });

            // Producer must still be blocked while the queue is full
            std::thread::sleep(Duration::from_millis(100));
            assert!(!inserted.load(Ordering::SeqCst));

            // Draining one item unblocks it
            assert_eq!(queue.pop(), Some(1));
            std::thread::sleep(Duration::from_millis(100));
            assert!(inserted.load(Ordering::SeqCst));
        })
        .unwrap();

        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue = BoundedQueue::new(2);

        crossbeam::thread::scope(|s| {
            let handle = s.spawn(|_| queue.pop());

            std::thread::sleep(Duration::from_millis(50));
            queue.push(42).unwrap();

            assert_eq!(handle.join().unwrap(), Some(42));
        })
        .unwrap();
    }

    #[test]
    fn test_close_wakes_consumers() {
        let queue: BoundedQueue<u32> = BoundedQueue::new(2);

        crossbeam::thread::scope(|s| {
            let h1 = s.spawn(|_| queue.pop());
            let h2 = s.spawn(|_| queue.pop());

            std::thread::sleep(Duration::from_millis(50));
            queue.close();

            assert_eq!(h1.join().unwrap(), None);
            assert_eq!(h2.join().unwrap(), None);
        })
        .unwrap();
    }

    #[test]
    fn test_close_drains_pending_items() {
        let queue = BoundedQueue::new(4);
        queue.push(7).unwrap();
        queue.close();

        assert_eq!(queue.pop(), Some(7));
        assert_eq!(queue.pop(), None);
        assert!(queue.push(8).is_err());
    }

    #[test]
    fn test_many_producers_many_consumers() {
        let queue = BoundedQueue::new(3);
        let produced: usize = 4 * 25;

        crossbeam::thread::scope(|s| {
            for t in 0..4 {
                let queue = &queue;
                s.spawn(move |_| {
                    for i in 0..25 {
                        queue.push(t * 100 + i).unwrap();
                    }
                });
            }

            let mut handles = Vec::new();
            for _ in 0..4 {
                let queue = &queue;
                handles.push(s.spawn(move |_| {
                    let mut seen = Vec::new();
                    for _ in 0..25 {
                        seen.push(queue.pop().unwrap());
                    }
                    seen
                }));
            }

            let mut all: Vec<_> = handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect();
            all.sort_unstable();
            all.dedup();
            assert_eq!(all.len(), produced);
        })
        .unwrap();
    }
}
