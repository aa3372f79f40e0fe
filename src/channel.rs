//! Named channel endpoints
//!
//! Sessions talk to the server over named FIFOs. This module wraps FIFO
//! creation/removal and the open paths the server needs:
//!
//! - a plain blocking open for the registration channel (the dispatcher is
//!   happy to wait indefinitely for the next client),
//! - time-bounded opens for per-session channels, so a client that registered
//!   and then vanished cannot wedge a worker forever.
//!
//! The time-bounded write open retries `O_NONBLOCK` opens while the FIFO has
//! no reader (`ENXIO`) until the deadline. The read open succeeds immediately
//! with `O_NONBLOCK` and the flag is cleared once the peer is known to be
//! attached, so subsequent reads block normally.

use std::ffi::CString;
use std::fs::File;
use std::io;
use std::os::fd::FromRawFd;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::{ReservdError, Result};

/// Polling interval while waiting for a FIFO peer
const OPEN_RETRY_INTERVAL: Duration = Duration::from_millis(10);

fn path_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| ReservdError::Channel(format!("path contains NUL: {}", path.display())))
}

/// Create a FIFO at `path`, replacing any stale one left by a previous run.
pub fn create(path: &Path) -> Result<()> {
    let _ = std::fs::remove_file(path);

    let cpath = path_cstring(path)?;
    // SAFETY: cpath is a valid NUL-terminated string
    let ret = unsafe { libc::mkfifo(cpath.as_ptr(), 0o666) };
    if ret < 0 {
        return Err(io::Error::last_os_error().into());
    }
    Ok(())
}

/// Remove a FIFO. Missing files are not an error.
pub fn remove(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Open the read side of a FIFO, blocking until a writer attaches.
pub fn open_read_blocking(path: &Path) -> Result<File> {
    Ok(File::open(path)?)
}

/// Open the write side of a FIFO, blocking until a reader attaches.
pub fn open_write_blocking(path: &Path) -> Result<File> {
    use std::fs::OpenOptions;
    Ok(OpenOptions::new().write(true).open(path)?)
}

/// Open the read side of a FIFO without waiting for a writer.
///
/// The returned file is still in non-blocking mode; call
/// [`clear_nonblocking`] once the peer is known to have opened its write
/// side, otherwise reads race against the peer's open and can report a
/// spurious EOF.
pub fn open_read_nonblocking(path: &Path) -> Result<File> {
    let cpath = path_cstring(path)?;
    // SAFETY: cpath is a valid NUL-terminated string
    let fd = unsafe { libc::open(cpath.as_ptr(), libc::O_RDONLY | libc::O_NONBLOCK) };
    if fd < 0 {
        return Err(io::Error::last_os_error().into());
    }
    // SAFETY: open succeeded, fd is valid and owned by the File from here on
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// Open the write side of a FIFO, waiting up to `timeout` for a reader.
///
/// A FIFO with no reader fails a non-blocking write open with `ENXIO`, so
/// this retries until the peer shows up or the deadline passes.
pub fn open_write_timeout(path: &Path, timeout: Duration) -> Result<File> {
    let cpath = path_cstring(path)?;
    let deadline = Instant::now() + timeout;

    loop {
        // SAFETY: cpath is a valid NUL-terminated string
        let fd = unsafe { libc::open(cpath.as_ptr(), libc::O_WRONLY | libc::O_NONBLOCK) };
        if fd >= 0 {
            clear_nonblocking(fd)?;
            // SAFETY: open succeeded, fd is valid and owned by the File
            return Ok(unsafe { File::from_raw_fd(fd) });
        }

        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ENXIO) {
            return Err(err.into());
        }
        if Instant::now() >= deadline {
            return Err(ReservdError::Channel(format!(
                "timed out waiting for a reader on {}",
                path.display()
            )));
        }
        std::thread::sleep(OPEN_RETRY_INTERVAL);
    }
}

/// Switch a descriptor back to blocking mode.
pub fn clear_nonblocking(fd: RawFd) -> Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error().into());
    }
    let ret = unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) };
    if ret < 0 {
        return Err(io::Error::last_os_error().into());
    }
    Ok(())
}

/// Convenience wrapper for [`clear_nonblocking`] on a `File`.
pub fn make_blocking(file: &File) -> Result<()> {
    clear_nonblocking(file.as_raw_fd())
}
