//! Server Module
//!
//! FIFO server for reservd.
//!
//! ## Architecture
//! - Single dispatcher thread on the registration FIFO
//! - Bounded session queue between dispatcher and workers
//! - Fixed worker pool, one session per worker at a time
//! - A watcher thread turns SIGUSR1 into a store dump on stdout

mod dispatcher;
mod worker;

pub use worker::{process_request, Session, WorkerPool};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{bounded, Sender};

use crate::config::Config;
use crate::error::Result;
use crate::queue::BoundedQueue;
use crate::store::EventStore;

/// Set by the SIGUSR1 handler, consumed by the dump watcher thread
static DUMP_REQUESTED: AtomicBool = AtomicBool::new(false);

/// How often the dump watcher polls the request flag
const DUMP_POLL_INTERVAL: Duration = Duration::from_millis(50);

extern "C" fn handle_sigusr1(_signum: libc::c_int) {
    // Only async-signal-safe work here; the watcher thread does the dump
    DUMP_REQUESTED.store(true, Ordering::Relaxed);
}

/// Install the SIGUSR1 handler that requests a store dump.
pub fn install_dump_signal_handler() {
    let handler: extern "C" fn(libc::c_int) = handle_sigusr1;
    // SAFETY: the handler only stores to an atomic flag
    unsafe {
        libc::signal(libc::SIGUSR1, handler as libc::sighandler_t);
    }
}

/// Request a store dump as if SIGUSR1 had been delivered.
pub fn request_dump() {
    DUMP_REQUESTED.store(true, Ordering::Relaxed);
}

/// FIFO server: owns the dispatcher, queue, worker pool and dump watcher.
pub struct Server {
    config: Config,
    store: Arc<EventStore>,
}

impl Server {
    /// Create a server over an existing store.
    pub fn new(config: Config, store: Arc<EventStore>) -> Self {
        Self { config, store }
    }

    /// Create a server with a fresh store built from the config.
    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(EventStore::new(config.state_access_delay));
        Self::new(config, store)
    }

    /// The shared event store.
    pub fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// Run the server until a shutdown request arrives on the registration
    /// channel (blocking).
    ///
    /// Creates the registration FIFO on entry and removes it on exit.
    /// Startup failures (FIFO creation, worker spawn) abort with an error;
    /// per-session failures never reach this level.
    pub fn run(&self) -> Result<()> {
        crate::channel::create(&self.config.registration_path)?;
        tracing::info!(
            "listening on {}",
            self.config.registration_path.display()
        );

        let queue = Arc::new(BoundedQueue::new(self.config.max_sessions));
        let pool = WorkerPool::spawn(
            self.config.worker_count,
            Arc::clone(&queue),
            Arc::clone(&self.store),
            self.config.channel_open_timeout,
        )?;
        let watcher = DumpWatcher::spawn(Arc::clone(&self.store));

        let result = dispatcher::run(&self.config.registration_path, &queue);

        // Drain-free shutdown: wake everyone, then wait for them
        queue.close();
        pool.join();
        watcher.stop();
        crate::channel::remove(&self.config.registration_path)?;

        tracing::info!("server stopped");
        result
    }
}

/// Watcher thread that performs requested store dumps outside signal context.
struct DumpWatcher {
    stop_tx: Sender<()>,
    handle: std::thread::JoinHandle<()>,
}

impl DumpWatcher {
    fn spawn(store: Arc<EventStore>) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = std::thread::spawn(move || loop {
            match stop_rx.recv_timeout(DUMP_POLL_INTERVAL) {
                Ok(()) | Err(crossbeam::channel::RecvTimeoutError::Disconnected) => return,
                Err(crossbeam::channel::RecvTimeoutError::Timeout) => {
                    if DUMP_REQUESTED.swap(false, Ordering::Relaxed) {
                        let mut stdout = std::io::stdout().lock();
                        if let Err(e) = store.dump(&mut stdout) {
                            tracing::warn!("event dump failed: {}", e);
                        }
                    }
                }
            }
        });
        Self { stop_tx, handle }
    }

    fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.handle.join();
    }
}
