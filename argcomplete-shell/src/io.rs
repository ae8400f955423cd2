//! The file-descriptor surface the shell wrapper opens for us.
//!
//! Per spec, fd 8 receives the candidate blob (or, when
//! `ARGCOMPLETE_USE_TEMPFILES=1`, the path to a temp file holding it), and
//! the optional fd 9 receives debug text, falling back to stderr when the
//! wrapper didn't open it. Every exit path flushes and closes both; this
//! module centralizes that discipline so `main` doesn't have to re-derive
//! it per branch.

use std::fs::File;
use std::io::Write as _;
#[cfg(unix)]
use std::os::fd::FromRawFd;

/// The shell's output file descriptor, per the invocation contract.
const OUTPUT_FD: i32 = 8;
/// The shell's optional debug file descriptor.
const DEBUG_FD: i32 = 9;

/// Opens the shell's output file descriptor (fd 8).
///
/// # Errors
///
/// Returns an error if fd 8 isn't a valid, writable descriptor.
#[cfg(unix)]
pub fn open_output() -> std::io::Result<File> {
    // SAFETY: fd 8 is the output descriptor the invocation contract
    // guarantees the shell wrapper has opened for us; we take ownership of
    // it for the remainder of the process and never use it after closing.
    let file = unsafe { File::from_raw_fd(OUTPUT_FD) };
    // Validate it's actually usable before handing it back, so a missing fd
    // surfaces as an IO error rather than a SIGPIPE/EBADF deep in a write.
    file.try_clone()?;
    Ok(file)
}

/// Opens the shell's debug file descriptor (fd 9), if available.
#[cfg(unix)]
#[must_use]
pub fn open_debug() -> Option<File> {
    // SAFETY: see `open_output`; fd 9 is optional, so an invalid descriptor
    // here is an expected condition, not a usage error, and `try_clone`
    // lets us detect that before anyone attempts a write.
    let file = unsafe { File::from_raw_fd(DEBUG_FD) };
    file.try_clone().ok().map(|_| file)
}

/// The invocation contract's raw-fd handoff is POSIX-specific; non-Unix
/// targets have no fd 8/9 to inherit.
#[cfg(not(unix))]
pub fn open_output() -> std::io::Result<File> {
    Err(std::io::Error::other(
        "raw file descriptor inheritance is only supported on Unix",
    ))
}

/// See [`open_output`]'s non-Unix note.
#[cfg(not(unix))]
#[must_use]
pub fn open_debug() -> Option<File> {
    None
}

/// Writes the rendered candidate blob to the shell's output, either
/// directly or via a temp file whose path is written instead, per
/// `ARGCOMPLETE_USE_TEMPFILES`.
///
/// # Errors
///
/// Returns an error if the write (or the temp file creation/write) fails.
pub fn write_output(mut out: impl std::io::Write, blob: &[u8], use_tempfiles: bool) -> std::io::Result<()> {
    if use_tempfiles {
        let mut tmp = tempfile::NamedTempFile::new()?;
        tmp.write_all(blob)?;
        tmp.flush()?;
        let (_, path) = tmp.keep().map_err(|e| e.error)?;
        write!(out, "{}", path.display())?;
    } else {
        out.write_all(blob)?;
    }
    out.flush()
}

/// Writes a debug line, preferring `debug_fd` and falling back to stderr.
pub fn write_debug(debug_fd: Option<&mut File>, message: &str) {
    match debug_fd {
        Some(file) => {
            let _ = writeln!(file, "{message}");
            let _ = file.flush();
        }
        None => {
            eprintln!("{message}");
        }
    }
}
