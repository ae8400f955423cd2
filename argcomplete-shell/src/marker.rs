//! The marker check: confirms a script opts into completion before the
//! shellcode emitter wires it up.
//!
//! Grounded on `original_source/argcomplete/_check_console_script.py`: the
//! check reads only the first kibibyte of the file and looks for a literal
//! marker string, so that a shell wrapper can cheaply decide whether a
//! script is completion-aware without executing it.

use std::io::Read as _;
use std::path::Path;

/// Number of leading bytes inspected for the marker.
const SCAN_WINDOW: usize = 1024;

/// The literal marker a script must contain in its first
/// [`SCAN_WINDOW`] bytes to opt into completion.
pub const MARKER: &str = "PYTHON_ARGCOMPLETE_OK";

/// Returns whether the script at `path` opts into completion.
///
/// Unreadable paths (missing file, permission denied, a directory) are
/// treated as "does not opt in" rather than an error: the shell wrapper
/// calling this is deciding whether to wire up completion at all, and a
/// script it can't even read certainly isn't one it should complete.
#[must_use]
pub fn script_opts_in(path: &Path) -> bool {
    let Ok(mut file) = std::fs::File::open(path) else {
        return false;
    };

    let mut buf = vec![0u8; SCAN_WINDOW];
    let mut total = 0;
    loop {
        match file.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(_) => return false,
        }
        if total >= buf.len() {
            break;
        }
    }

    String::from_utf8_lossy(&buf[..total]).contains(MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn script_with_marker_opts_in() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "#!/usr/bin/env python\n# {MARKER}").unwrap();
        assert!(script_opts_in(file.path()));
    }

    #[test]
    fn script_without_marker_does_not_opt_in() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "#!/usr/bin/env python\nprint('hi')").unwrap();
        assert!(!script_opts_in(file.path()));
    }

    #[test]
    fn marker_past_scan_window_is_not_found() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let padding = "x".repeat(SCAN_WINDOW + 10);
        writeln!(file, "{padding}\n# {MARKER}").unwrap();
        assert!(!script_opts_in(file.path()));
    }

    #[test]
    fn nonexistent_file_does_not_opt_in() {
        assert!(!script_opts_in(Path::new("/nonexistent/path/to/script")));
    }
}
