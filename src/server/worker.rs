//! Worker pool and per-session request processing
//!
//! A fixed number of long-lived threads each pull one pending session from
//! the queue, establish the session's private channel pair, and serve
//! requests until the client quits or disconnects. A worker never services
//! two sessions at once, so the pool size bounds concurrent clients.

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::channel;
use crate::error::{ReservdError, Result};
use crate::protocol::{
    read_op_code, read_request_body, write_list_response, write_session_id,
    write_show_response, write_status, OpCode, Request, Status,
};
use crate::queue::BoundedQueue;
use crate::store::EventStore;

/// A pending client session handed from the dispatcher to a worker
#[derive(Debug, Clone)]
pub struct Session {
    /// Server-assigned, strictly increasing
    pub session_id: u32,

    /// FIFO the client sends requests on
    pub request_path: PathBuf,

    /// FIFO the client reads responses from
    pub response_path: PathBuf,
}

/// Fixed pool of session-serving threads
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `count` workers consuming from `queue`.
    pub fn spawn(
        count: usize,
        queue: Arc<BoundedQueue<Session>>,
        store: Arc<EventStore>,
        open_timeout: Duration,
    ) -> Result<Self> {
        let mut handles = Vec::with_capacity(count);
        for worker_id in 0..count {
            let queue = Arc::clone(&queue);
            let store = Arc::clone(&store);
            let handle = thread::Builder::new()
                .name(format!("worker-{}", worker_id))
                .spawn(move || worker_loop(worker_id, &queue, &store, open_timeout))?;
            handles.push(handle);
        }
        Ok(Self { handles })
    }

    /// Wait for all workers to exit (the queue must be closed first).
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

/// Pull sessions until the queue is closed and drained.
fn worker_loop(
    worker_id: usize,
    queue: &BoundedQueue<Session>,
    store: &EventStore,
    open_timeout: Duration,
) {
    while let Some(session) = queue.pop() {
        let session_id = session.session_id;
        tracing::debug!("worker {} picked up session {}", worker_id, session_id);

        match serve_session(store, &session, open_timeout) {
            Ok(()) => tracing::debug!("session {} ended", session_id),
            Err(e) => tracing::warn!("session {} aborted: {}", session_id, e),
        }

        // The session's channels are server-owned; reclaim them however the
        // session ended. Removal is idempotent, so a client that already
        // cleaned up is fine.
        for path in [&session.request_path, &session.response_path] {
            if let Err(e) = channel::remove(path) {
                tracing::debug!("session {} channel cleanup failed: {}", session_id, e);
            }
        }
    }
    tracing::debug!("worker {} exiting", worker_id);
}

/// Serve one session end-to-end.
///
/// The request FIFO's read side is opened first so the client's own write
/// open can complete; the response write side is then opened with a deadline
/// so a vanished client cannot wedge the worker. Once the response side is
/// attached the client is known to hold the request write side, and blocking
/// reads become safe.
fn serve_session(store: &EventStore, session: &Session, open_timeout: Duration) -> Result<()> {
    let request = channel::open_read_nonblocking(&session.request_path)?;
    let response = channel::open_write_timeout(&session.response_path, open_timeout)?;
    channel::make_blocking(&request)?;

    let mut reader = BufReader::new(request);
    let mut writer = BufWriter::new(response);

    // First response message: the assigned session id
    write_session_id(&mut writer, session.session_id)?;

    loop {
        let op = match read_op_code(&mut reader) {
            Ok(op) => op,
            Err(ReservdError::Io(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                tracing::debug!("session {} disconnected", session.session_id);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if !process_request(store, op, &mut reader, &mut writer)? {
            return Ok(());
        }
    }
}

/// Decode one request, execute it against the store, and encode the response.
///
/// Returns whether the session should continue. Store failures become a
/// failure status on the wire; channel errors propagate and end the session.
pub fn process_request<R: Read, W: Write>(
    store: &EventStore,
    op: OpCode,
    reader: &mut R,
    writer: &mut W,
) -> Result<bool> {
    let request = match read_request_body(reader, op) {
        Ok(request) => request,
        Err(ReservdError::ReservationTooLarge { requested, .. }) => {
            // The payload length is known, so drain it and report a failed
            // operation instead of tearing the session down
            drain(reader, requested as usize * 16)?;
            write_status(writer, Status::Failure)?;
            return Ok(true);
        }
        Err(e) => return Err(e),
    };

    match request {
        Request::Quit => Ok(false),
        Request::Create {
            event_id,
            rows,
            cols,
        } => {
            let status = to_status(store.create(event_id, rows, cols))?;
            write_status(writer, status)?;
            Ok(true)
        }
        Request::Reserve { event_id, seats } => {
            let status = to_status(store.reserve(event_id, &seats).map(|_| ()))?;
            write_status(writer, status)?;
            Ok(true)
        }
        Request::Show { event_id } => {
            match store.show(event_id) {
                Ok(seating) => write_show_response(writer, Status::Ok, Some(&seating))?,
                Err(e) if e.is_operation_failure() => {
                    tracing::debug!("show failed: {}", e);
                    write_show_response(writer, Status::Failure, None)?;
                }
                Err(e) => return Err(e),
            }
            Ok(true)
        }
        Request::List => {
            let ids = store.list();
            write_list_response(writer, Status::Ok, &ids)?;
            Ok(true)
        }
    }
}

/// Map a store outcome to a wire status, propagating non-operation errors.
fn to_status(result: Result<()>) -> Result<Status> {
    match result {
        Ok(()) => Ok(Status::Ok),
        Err(e) if e.is_operation_failure() => {
            tracing::debug!("operation failed: {}", e);
            Ok(Status::Failure)
        }
        Err(e) => Err(e),
    }
}

/// Discard exactly `len` bytes from the stream.
fn drain<R: Read>(reader: &mut R, len: usize) -> Result<()> {
    std::io::copy(&mut reader.by_ref().take(len as u64), &mut std::io::sink())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        read_list_response, read_show_response, read_status, write_request,
    };
    use std::io::Cursor;
    use std::time::Duration;

    fn run_one(store: &EventStore, request: Request) -> (bool, Vec<u8>) {
        let mut wire = Vec::new();
        write_request(&mut wire, &request).unwrap();

        let mut reader = Cursor::new(wire);
        let op = read_op_code(&mut reader).unwrap();
        let mut response = Vec::new();
        let keep_going = process_request(store, op, &mut reader, &mut response).unwrap();
        (keep_going, response)
    }

    #[test]
    fn test_create_and_reserve_statuses() {
        let store = EventStore::new(Duration::ZERO);

        let (cont, response) = run_one(
            &store,
            Request::Create {
                event_id: 1,
                rows: 2,
                cols: 2,
            },
        );
        assert!(cont);
        assert!(read_status(&mut Cursor::new(response)).unwrap().is_ok());

        let (_, response) = run_one(
            &store,
            Request::Reserve {
                event_id: 1,
                seats: vec![(1, 1), (2, 2)],
            },
        );
        assert!(read_status(&mut Cursor::new(response)).unwrap().is_ok());

        // Same seat again fails as a status, not a session teardown
        let (cont, response) = run_one(
            &store,
            Request::Reserve {
                event_id: 1,
                seats: vec![(1, 1)],
            },
        );
        assert!(cont);
        assert!(!read_status(&mut Cursor::new(response)).unwrap().is_ok());
    }

    #[test]
    fn test_show_round_trip() {
        let store = EventStore::new(Duration::ZERO);
        store.create(1, 2, 2).unwrap();
        store.reserve(1, &[(1, 1)]).unwrap();

        let (_, response) = run_one(&store, Request::Show { event_id: 1 });
        let (status, seating) = read_show_response(&mut Cursor::new(response)).unwrap();
        assert!(status.is_ok());
        assert_eq!(seating.unwrap().to_string(), "1 0\n0 0\n");
    }

    #[test]
    fn test_show_missing_event() {
        let store = EventStore::new(Duration::ZERO);

        let (cont, response) = run_one(&store, Request::Show { event_id: 4 });
        assert!(cont);
        let (status, seating) = read_show_response(&mut Cursor::new(response)).unwrap();
        assert!(!status.is_ok());
        assert!(seating.is_none());
    }

    #[test]
    fn test_list() {
        let store = EventStore::new(Duration::ZERO);
        store.create(3, 1, 1).unwrap();
        store.create(1, 1, 1).unwrap();

        let (_, response) = run_one(&store, Request::List);
        let (status, ids) = read_list_response(&mut Cursor::new(response)).unwrap();
        assert!(status.is_ok());
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_quit_ends_session() {
        let store = EventStore::new(Duration::ZERO);
        let (cont, response) = run_one(&store, Request::Quit);
        assert!(!cont);
        assert!(response.is_empty());
    }

    #[test]
    fn test_oversized_create_fails_without_teardown() {
        let store = EventStore::new(Duration::ZERO);

        let (cont, response) = run_one(
            &store,
            Request::Create {
                event_id: 1,
                rows: crate::protocol::MAX_GRID_SEATS + 1,
                cols: 1,
            },
        );
        assert!(cont);
        assert!(!read_status(&mut Cursor::new(response)).unwrap().is_ok());

        // The session keeps working and the event was never created
        let (_, response) = run_one(&store, Request::List);
        let (status, ids) = read_list_response(&mut Cursor::new(response)).unwrap();
        assert!(status.is_ok());
        assert!(ids.is_empty());
    }

    #[test]
    fn test_oversized_reserve_is_drained_and_rejected() {
        let store = EventStore::new(Duration::ZERO);
        store.create(1, 2, 2).unwrap();

        let count = crate::protocol::MAX_RESERVATION_SIZE + 1;
        let mut wire = Vec::new();
        wire.extend_from_slice(&OpCode::Reserve.tag());
        wire.extend_from_slice(&1u32.to_le_bytes());
        wire.extend_from_slice(&count.to_le_bytes());
        for _ in 0..count * 2 {
            wire.extend_from_slice(&1u64.to_le_bytes());
        }
        // A well-formed quit right behind it must still be readable
        wire.extend_from_slice(&OpCode::Quit.tag());

        let mut reader = Cursor::new(wire);
        let op = read_op_code(&mut reader).unwrap();
        let mut response = Vec::new();
        assert!(process_request(&store, op, &mut reader, &mut response).unwrap());
        assert!(!read_status(&mut Cursor::new(response)).unwrap().is_ok());

        // Stream is still aligned on the next op tag
        assert_eq!(read_op_code(&mut reader).unwrap(), OpCode::Quit);
        assert!(store.show(1).unwrap().seats.iter().all(|&s| s == 0));
    }
}
