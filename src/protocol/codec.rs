//! Protocol codec
//!
//! Fixed-width encode/decode over `Read`/`Write` streams. Every field is
//! little-endian; see the module docs in `protocol` for the exact layout of
//! each message.
//!
//! Counts read off the wire are validated against their maximum before any
//! buffer is allocated, so a malformed client cannot force an unbounded
//! allocation.

use std::io::{Read, Write};

use crate::error::{ReservdError, Result};
use super::{
    OpCode, RegistrationRequest, Request, Seating, Status, CHANNEL_NAME_LEN,
    MAX_GRID_SEATS, MAX_RESERVATION_SIZE, OP_CODE_LEN,
};

// =============================================================================
// Primitive field helpers
// =============================================================================

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Encode a FIFO name into a fixed-width NUL-padded field.
///
/// Names longer than the field are truncated.
fn encode_channel_name(name: &str) -> [u8; CHANNEL_NAME_LEN] {
    let mut field = [0u8; CHANNEL_NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(CHANNEL_NAME_LEN);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Decode a fixed-width NUL-padded FIFO name field.
fn decode_channel_name(field: &[u8; CHANNEL_NAME_LEN]) -> Result<String> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(CHANNEL_NAME_LEN);
    std::str::from_utf8(&field[..end])
        .map(str::to_owned)
        .map_err(|_| ReservdError::Protocol("channel name is not valid UTF-8".to_string()))
}

// =============================================================================
// Op tags
// =============================================================================

/// Read and parse the leading 9-byte op tag.
///
/// An EOF before the first byte surfaces as an `Io(UnexpectedEof)` error, which
/// session loops treat as a clean disconnect.
pub fn read_op_code<R: Read>(reader: &mut R) -> Result<OpCode> {
    let mut tag = [0u8; OP_CODE_LEN];
    reader.read_exact(&mut tag)?;
    OpCode::from_tag(&tag)
}

// =============================================================================
// Registration channel
// =============================================================================

/// Write a full registration message (tag + both FIFO names).
pub fn write_registration<W: Write>(writer: &mut W, reg: &RegistrationRequest) -> Result<()> {
    writer.write_all(&OpCode::Setup.tag())?;
    writer.write_all(&encode_channel_name(&reg.request_path))?;
    writer.write_all(&encode_channel_name(&reg.response_path))?;
    writer.flush()?;
    Ok(())
}

/// Read the body of a registration message (the tag has already been consumed).
pub fn read_registration_body<R: Read>(reader: &mut R) -> Result<RegistrationRequest> {
    let mut request_field = [0u8; CHANNEL_NAME_LEN];
    let mut response_field = [0u8; CHANNEL_NAME_LEN];
    reader.read_exact(&mut request_field)?;
    reader.read_exact(&mut response_field)?;

    let request_path = decode_channel_name(&request_field)?;
    let response_path = decode_channel_name(&response_field)?;
    if request_path.is_empty() || response_path.is_empty() {
        return Err(ReservdError::Protocol(
            "registration with empty channel name".to_string(),
        ));
    }

    Ok(RegistrationRequest {
        request_path,
        response_path,
    })
}

/// Write the session id sent as the first response message.
pub fn write_session_id<W: Write>(writer: &mut W, session_id: u32) -> Result<()> {
    writer.write_all(&session_id.to_le_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read the session id from the response channel.
pub fn read_session_id<R: Read>(reader: &mut R) -> Result<u32> {
    read_u32(reader)
}

// =============================================================================
// Per-session requests
// =============================================================================

/// Write a full request (tag + payload).
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    writer.write_all(&request.op_code().tag())?;

    match request {
        Request::Quit | Request::List => {}
        Request::Create {
            event_id,
            rows,
            cols,
        } => {
            writer.write_all(&event_id.to_le_bytes())?;
            writer.write_all(&rows.to_le_bytes())?;
            writer.write_all(&cols.to_le_bytes())?;
        }
        Request::Reserve { event_id, seats } => {
            writer.write_all(&event_id.to_le_bytes())?;
            writer.write_all(&(seats.len() as u64).to_le_bytes())?;
            for (row, _) in seats {
                writer.write_all(&row.to_le_bytes())?;
            }
            for (_, col) in seats {
                writer.write_all(&col.to_le_bytes())?;
            }
        }
        Request::Show { event_id } => {
            writer.write_all(&event_id.to_le_bytes())?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Read the payload of a request whose op tag has already been consumed.
pub fn read_request_body<R: Read>(reader: &mut R, op: OpCode) -> Result<Request> {
    match op {
        OpCode::Setup => Err(ReservdError::Protocol(
            "setup is only valid on the registration channel".to_string(),
        )),
        OpCode::Quit => Ok(Request::Quit),
        OpCode::List => Ok(Request::List),
        OpCode::Show => Ok(Request::Show {
            event_id: read_u32(reader)?,
        }),
        OpCode::Create => {
            // Fixed-width payload; the store validates the grid size before
            // allocating anything
            Ok(Request::Create {
                event_id: read_u32(reader)?,
                rows: read_u64(reader)?,
                cols: read_u64(reader)?,
            })
        }
        OpCode::Reserve => {
            let event_id = read_u32(reader)?;
            let count = read_u64(reader)?;
            if count > MAX_RESERVATION_SIZE {
                return Err(ReservdError::ReservationTooLarge {
                    requested: count,
                    max: MAX_RESERVATION_SIZE,
                });
            }

            let mut rows = Vec::with_capacity(count as usize);
            for _ in 0..count {
                rows.push(read_u64(reader)?);
            }
            let mut seats = Vec::with_capacity(count as usize);
            for row in rows {
                seats.push((row, read_u64(reader)?));
            }
            Ok(Request::Reserve { event_id, seats })
        }
    }
}

// =============================================================================
// Per-session responses
// =============================================================================

/// Write a bare status response (create/reserve).
pub fn write_status<W: Write>(writer: &mut W, status: Status) -> Result<()> {
    writer.write_all(&status.as_i32().to_le_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Read a bare status response.
pub fn read_status<R: Read>(reader: &mut R) -> Result<Status> {
    Ok(Status::from_i32(read_i32(reader)?))
}

/// Write a show response.
///
/// On failure the dimensions are written as zero and no grid follows.
pub fn write_show_response<W: Write>(
    writer: &mut W,
    status: Status,
    seating: Option<&Seating>,
) -> Result<()> {
    writer.write_all(&status.as_i32().to_le_bytes())?;
    match seating {
        Some(seating) if status.is_ok() => {
            writer.write_all(&seating.rows.to_le_bytes())?;
            writer.write_all(&seating.cols.to_le_bytes())?;
            for seat in &seating.seats {
                writer.write_all(&seat.to_le_bytes())?;
            }
        }
        _ => {
            writer.write_all(&0u64.to_le_bytes())?;
            writer.write_all(&0u64.to_le_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read a show response.
pub fn read_show_response<R: Read>(reader: &mut R) -> Result<(Status, Option<Seating>)> {
    let status = Status::from_i32(read_i32(reader)?);
    let rows = read_u64(reader)?;
    let cols = read_u64(reader)?;

    if !status.is_ok() || rows == 0 || cols == 0 {
        return Ok((status, None));
    }

    let total = rows.checked_mul(cols).ok_or_else(|| {
        ReservdError::Protocol(format!("grid {}x{} overflows", rows, cols))
    })?;
    if total > MAX_GRID_SEATS {
        return Err(ReservdError::Protocol(format!(
            "grid {}x{} exceeds {} seats",
            rows, cols, MAX_GRID_SEATS
        )));
    }

    let mut seats = Vec::with_capacity(total as usize);
    for _ in 0..total {
        seats.push(read_u32(reader)?);
    }

    Ok((status, Some(Seating { rows, cols, seats })))
}

/// Write a list response.
pub fn write_list_response<W: Write>(writer: &mut W, status: Status, ids: &[u32]) -> Result<()> {
    writer.write_all(&status.as_i32().to_le_bytes())?;
    writer.write_all(&(ids.len() as u32).to_le_bytes())?;
    for id in ids {
        writer.write_all(&id.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a list response.
pub fn read_list_response<R: Read>(reader: &mut R) -> Result<(Status, Vec<u32>)> {
    let status = Status::from_i32(read_i32(reader)?);
    let count = read_u32(reader)?;

    let mut ids = Vec::with_capacity(count as usize);
    for _ in 0..count {
        ids.push(read_u32(reader)?);
    }

    Ok((status, ids))
}
