//! Client-side session API
//!
//! Drives one session against a running server: creates the private channel
//! pair, registers over the well-known FIFO, and exchanges one fixed-layout
//! request/response per call. Used by the CLI binary and integration tests.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::channel;
use crate::error::{ReservdError, Result};
use crate::protocol::{
    read_list_response, read_session_id, read_show_response, read_status,
    write_registration, write_request, RegistrationRequest, Request, Seating,
    Status, CHANNEL_NAME_LEN,
};

/// One client session over a private FIFO pair
pub struct Client {
    session_id: u32,
    request_path: PathBuf,
    response_path: PathBuf,
    writer: BufWriter<File>,
    reader: BufReader<File>,
}

fn channel_name(path: &Path) -> Result<String> {
    let name = path
        .to_str()
        .ok_or_else(|| ReservdError::Channel("channel path is not valid UTF-8".to_string()))?;
    if name.len() > CHANNEL_NAME_LEN {
        return Err(ReservdError::Channel(format!(
            "channel path longer than {} bytes: {}",
            CHANNEL_NAME_LEN, name
        )));
    }
    Ok(name.to_string())
}

impl Client {
    /// Register a new session and wait for the server-assigned id.
    ///
    /// The client owns both FIFOs: they are created here and removed when
    /// the session ends.
    pub fn connect(
        registration_path: &Path,
        request_path: impl Into<PathBuf>,
        response_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let request_path = request_path.into();
        let response_path = response_path.into();

        let registration = RegistrationRequest {
            request_path: channel_name(&request_path)?,
            response_path: channel_name(&response_path)?,
        };

        channel::create(&request_path)?;
        if let Err(e) = channel::create(&response_path) {
            let _ = channel::remove(&request_path);
            return Err(e);
        }

        let connect = || -> Result<(BufWriter<File>, BufReader<File>, u32)> {
            // Buffered so the whole registration lands in one pipe write;
            // concurrent registrations must not interleave
            let mut registration_channel =
                BufWriter::new(channel::open_write_blocking(registration_path)?);
            write_registration(&mut registration_channel, &registration)?;
            drop(registration_channel);

            // Mirror the worker's open order: it takes our request read side
            // first, then our response write side
            let writer = BufWriter::new(channel::open_write_blocking(&request_path)?);
            let mut reader = BufReader::new(channel::open_read_blocking(&response_path)?);

            let session_id = read_session_id(&mut reader)?;
            Ok((writer, reader, session_id))
        };

        match connect() {
            Ok((writer, reader, session_id)) => {
                tracing::debug!("session {} established", session_id);
                Ok(Self {
                    session_id,
                    request_path,
                    response_path,
                    writer,
                    reader,
                })
            }
            Err(e) => {
                let _ = channel::remove(&request_path);
                let _ = channel::remove(&response_path);
                Err(e)
            }
        }
    }

    /// The server-assigned session id.
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Create an event; a failure status means the server rejected it.
    pub fn create(&mut self, event_id: u32, rows: u64, cols: u64) -> Result<Status> {
        write_request(
            &mut self.writer,
            &Request::Create {
                event_id,
                rows,
                cols,
            },
        )?;
        read_status(&mut self.reader)
    }

    /// Atomically reserve a set of 1-based (row, col) seats.
    pub fn reserve(&mut self, event_id: u32, seats: &[(u64, u64)]) -> Result<Status> {
        write_request(
            &mut self.writer,
            &Request::Reserve {
                event_id,
                seats: seats.to_vec(),
            },
        )?;
        read_status(&mut self.reader)
    }

    /// Fetch a consistent snapshot of an event's grid.
    pub fn show(&mut self, event_id: u32) -> Result<(Status, Option<Seating>)> {
        write_request(&mut self.writer, &Request::Show { event_id })?;
        read_show_response(&mut self.reader)
    }

    /// Fetch the ids of all events, in creation order.
    pub fn list(&mut self) -> Result<(Status, Vec<u32>)> {
        write_request(&mut self.writer, &Request::List)?;
        read_list_response(&mut self.reader)
    }

    /// End the session explicitly.
    pub fn quit(mut self) -> Result<()> {
        write_request(&mut self.writer, &Request::Quit)?;
        Ok(())
        // Drop removes the FIFOs
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        let _ = channel::remove(&self.request_path);
        let _ = channel::remove(&self.response_path);
    }
}
