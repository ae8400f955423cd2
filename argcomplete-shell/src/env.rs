//! Reads the shell-wrapper environment contract: the set of variables a
//! Bash/Zsh/Fish/Tcsh completion hook exports before invoking the responder.
//!
//! Grounded on `original_source/argcomplete/__init__.py`'s `IFS`/`COMP_LINE`/
//! `COMP_POINT` handling; encapsulated here as a single value type rather
//! than scattered `std::env::var` calls, per the ambient-stack rule against
//! unencapsulated global/environment state.

use argcomplete_core::quote::ShellDialect;
use argcomplete_core::ErrorKind;
use argcomplete_parser::require_single_byte;

/// The parsed shell-wrapper environment contract for one completion request.
#[derive(Clone, Debug)]
pub struct ResponderEnv {
    /// Whether the first word of `COMP_LINE` is an interpreter and must be
    /// dropped (`_ARGCOMPLETE=2`).
    pub drop_first_word: bool,
    /// The invoking shell.
    pub shell: ShellDialect,
    /// The full command line as seen by the shell.
    pub comp_line: String,
    /// Cursor offset in bytes into `comp_line`.
    pub comp_point: usize,
    /// The shell's word-break character set.
    pub wordbreaks: String,
    /// The one-byte separator used in the output blob.
    pub ifs: u8,
    /// The one-byte help separator (fish/zsh), if configured.
    pub dfs: Option<u8>,
    /// Whether a trailing space should never be appended.
    pub suppress_space: bool,
    /// Whether debug output should be written (to fd 9, or stderr if
    /// unavailable).
    pub debug: bool,
    /// Whether the output should be written to a temp file whose path is
    /// echoed to fd 8, instead of the blob directly.
    pub use_tempfiles: bool,
}

/// Returns `true` when `_ARGCOMPLETE` is set, i.e. this invocation is a
/// completion request rather than a normal program run.
#[must_use]
pub fn is_completion_request() -> bool {
    std::env::var_os("_ARGCOMPLETE").is_some()
}

/// Reads the full environment contract.
///
/// # Errors
///
/// Returns a fatal [`ErrorKind::Usage`] error if a required variable is
/// missing, or if `_ARGCOMPLETE_IFS`/`_ARGCOMPLETE_DFS` are present but not
/// exactly one byte.
pub fn read() -> Result<ResponderEnv, ErrorKind> {
    let flag = require_var("_ARGCOMPLETE")?;
    let drop_first_word = flag == "2";

    let shell = match require_var("_ARGCOMPLETE_SHELL")?.as_str() {
        "bash" => ShellDialect::Bash,
        "zsh" => ShellDialect::Zsh,
        "fish" => ShellDialect::Fish,
        "tcsh" => ShellDialect::Tcsh,
        other => {
            return Err(ErrorKind::Usage(format!(
                "unrecognized _ARGCOMPLETE_SHELL value: {other}"
            )));
        }
    };

    let comp_line = require_var("COMP_LINE")?;
    let comp_point: usize = require_var("COMP_POINT")?
        .parse()
        .map_err(|_| ErrorKind::Usage("COMP_POINT is not a valid byte offset".to_string()))?;

    let wordbreaks = std::env::var("_ARGCOMPLETE_COMP_WORDBREAKS")
        .unwrap_or_else(|_| argcomplete_parser::DEFAULT_WORDBREAKS.to_string());

    let ifs = match std::env::var("_ARGCOMPLETE_IFS") {
        Ok(s) => require_single_byte(&s)
            .map_err(|e| ErrorKind::Usage(format!("_ARGCOMPLETE_IFS: {e}")))?,
        Err(_) => b'\x0b',
    };

    let dfs = match std::env::var("_ARGCOMPLETE_DFS") {
        Ok(s) => Some(
            require_single_byte(&s).map_err(|e| ErrorKind::Usage(format!("_ARGCOMPLETE_DFS: {e}")))?,
        ),
        Err(_) => None,
    };

    let suppress_space = std::env::var("_ARGCOMPLETE_SUPPRESS_SPACE").as_deref() == Ok("1");
    let debug = std::env::var_os("_ARC_DEBUG").is_some();
    let use_tempfiles = std::env::var("ARGCOMPLETE_USE_TEMPFILES").as_deref() == Ok("1");

    Ok(ResponderEnv {
        drop_first_word,
        shell,
        comp_line,
        comp_point,
        wordbreaks,
        ifs,
        dfs,
        suppress_space,
        debug,
        use_tempfiles,
    })
}

fn require_var(name: &str) -> Result<String, ErrorKind> {
    std::env::var(name).map_err(|_| ErrorKind::Usage(format!("missing required env var {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Environment variables are process-global; serialize tests that touch
    // them so they don't stomp on each other when the test binary runs
    // multi-threaded.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_all() {
        for var in [
            "_ARGCOMPLETE",
            "_ARGCOMPLETE_SHELL",
            "COMP_LINE",
            "COMP_POINT",
            "_ARGCOMPLETE_COMP_WORDBREAKS",
            "_ARGCOMPLETE_IFS",
            "_ARGCOMPLETE_DFS",
            "_ARGCOMPLETE_SUPPRESS_SPACE",
            "_ARC_DEBUG",
            "ARGCOMPLETE_USE_TEMPFILES",
        ] {
            // SAFETY: single-threaded under ENV_LOCK for the duration of the test.
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn missing_comp_line_is_usage_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        // SAFETY: single-threaded under ENV_LOCK for the duration of the test.
        unsafe {
            std::env::set_var("_ARGCOMPLETE", "1");
            std::env::set_var("_ARGCOMPLETE_SHELL", "bash");
        }
        let err = read().unwrap_err();
        assert!(matches!(err, ErrorKind::Usage(_)));
        clear_all();
    }

    #[test]
    fn full_contract_parses() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        // SAFETY: single-threaded under ENV_LOCK for the duration of the test.
        unsafe {
            std::env::set_var("_ARGCOMPLETE", "1");
            std::env::set_var("_ARGCOMPLETE_SHELL", "bash");
            std::env::set_var("COMP_LINE", "prog --foo");
            std::env::set_var("COMP_POINT", "10");
        }
        let env = read().unwrap();
        assert!(!env.drop_first_word);
        assert_eq!(env.shell, ShellDialect::Bash);
        assert_eq!(env.comp_point, 10);
        assert_eq!(env.ifs, b'\x0b');
        clear_all();
    }

    #[test]
    fn invalid_ifs_is_usage_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        // SAFETY: single-threaded under ENV_LOCK for the duration of the test.
        unsafe {
            std::env::set_var("_ARGCOMPLETE", "1");
            std::env::set_var("_ARGCOMPLETE_SHELL", "bash");
            std::env::set_var("COMP_LINE", "prog");
            std::env::set_var("COMP_POINT", "4");
            std::env::set_var("_ARGCOMPLETE_IFS", "ab");
        }
        let err = read().unwrap_err();
        assert!(matches!(err, ErrorKind::Usage(_)));
        clear_all();
    }

    #[test]
    fn drop_first_word_flag_recognized() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all();
        // SAFETY: single-threaded under ENV_LOCK for the duration of the test.
        unsafe {
            std::env::set_var("_ARGCOMPLETE", "2");
            std::env::set_var("_ARGCOMPLETE_SHELL", "zsh");
            std::env::set_var("COMP_LINE", "python prog --foo");
            std::env::set_var("COMP_POINT", "18");
        }
        let env = read().unwrap();
        assert!(env.drop_first_word);
        assert_eq!(env.shell, ShellDialect::Zsh);
        clear_all();
    }
}
