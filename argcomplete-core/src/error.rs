//! Error facilities.
//!
//! Grounded on `brush-core`'s monolithic-enum-wrapped-in-a-struct pattern:
//! a thin [`Error`] carries an [`ErrorKind`], and the fatal/swallowed split
//! the completion path needs is type-checked via [`ErrorKind::is_fatal`]
//! rather than left to convention.

/// Unified error type for this crate.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// The kind of error this wraps.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Whether this error should abort the process with a non-zero exit
    /// code, as opposed to being logged and swallowed so the engine can
    /// still emit zero candidates and exit successfully.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

/// The error taxonomy the completion engine distinguishes.
#[derive(thiserror::Error, Debug)]
pub enum ErrorKind {
    /// A required environment variable was missing, or a value that must
    /// be exactly one byte (`_ARGCOMPLETE_IFS`, `_ARGCOMPLETE_DFS`) was
    /// not. Fatal: exit non-zero, no output.
    #[error("usage error: {0}")]
    Usage(String),

    /// An unrecognized action class or malformed subparser map was
    /// encountered while reflecting over the grammar. Recovered from by
    /// marking the action inert; never fatal.
    #[error("grammar error: {0}")]
    Grammar(String),

    /// The partial command line could not be split (unterminated
    /// metacharacter, bare operator before the cursor). Recovered from by
    /// returning an empty context; never fatal.
    #[error("lexer error: {0}")]
    Lexer(String),

    /// A user-supplied completer callback failed. Swallowed: logged to the
    /// debug stream, treated as yielding no candidates.
    #[error("completer failed: {0}")]
    CompleterFailure(String),

    /// Writing or flushing the output (or debug) file descriptor failed.
    /// Fatal: exit non-zero.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorKind {
    /// See [`Error::is_fatal`].
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_are_fatal() {
        let err: Error = ErrorKind::Usage("missing COMP_LINE".to_string()).into();
        assert!(err.is_fatal());
    }

    #[test]
    fn lexer_errors_are_not_fatal() {
        let err: Error = ErrorKind::Lexer("unterminated quote".to_string()).into();
        assert!(!err.is_fatal());
    }

    #[test]
    fn completer_failures_are_not_fatal() {
        let err: Error = ErrorKind::CompleterFailure("callback panicked".to_string()).into();
        assert!(!err.is_fatal());
    }
}
