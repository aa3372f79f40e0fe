//! Accept/dispatch loop
//!
//! The single thread that reads new-session requests from the well-known
//! registration FIFO, assigns sequential session ids, and hands sessions to
//! the worker pool through the bounded queue. Concurrency starts only after
//! that hand-off; registrations themselves are strictly sequential.

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use crate::channel;
use crate::error::{ReservdError, Result};
use crate::protocol::{read_op_code, read_registration_body, OpCode};
use crate::queue::BoundedQueue;
use super::worker::Session;

/// Run the dispatch loop until a shutdown request or a hard channel error.
///
/// A FIFO reports EOF whenever its last writer closes, so between clients
/// the registration channel is simply reopened. Any leading tag other than
/// setup is the shutdown request and ends the loop cleanly.
pub fn run(registration_path: &Path, queue: &Arc<BoundedQueue<Session>>) -> Result<()> {
    let mut next_session_id: u32 = 0;

    loop {
        let file = channel::open_read_blocking(registration_path)?;
        let mut reader = BufReader::new(file);

        loop {
            let op = match read_op_code(&mut reader) {
                Ok(op) => op,
                Err(ReservdError::Io(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    // Last registering client went away; wait for the next one
                    break;
                }
                Err(ReservdError::Protocol(e)) => {
                    tracing::info!("shutdown requested on registration channel ({})", e);
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            match op {
                OpCode::Setup => {
                    let reg = read_registration_body(&mut reader)?;
                    let session = Session {
                        session_id: next_session_id,
                        request_path: reg.request_path.into(),
                        response_path: reg.response_path.into(),
                    };
                    next_session_id += 1;

                    tracing::debug!(
                        "registered session {} ({} / {})",
                        session.session_id,
                        session.request_path.display(),
                        session.response_path.display()
                    );

                    if queue.push(session).is_err() {
                        // Queue closed underneath us; the server is stopping
                        return Ok(());
                    }
                }
                other => {
                    tracing::info!("shutdown requested (op {:?})", other);
                    return Ok(());
                }
            }
        }
    }
}
