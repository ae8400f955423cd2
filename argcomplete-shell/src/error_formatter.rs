//! Formats an [`argcomplete_core::Error`] for the debug stream.
//!
//! Grounded on `brush-shell/src/error_formatter.rs`'s small formatter
//! trait/struct, used instead of printing a raw `Display` implementation so
//! callers can later add structure (color, JSON) without touching call
//! sites.

use argcomplete_core::Error;

/// Renders an [`Error`] as one line of debug text.
#[derive(Debug, Default, Clone)]
pub struct Formatter {
    /// Whether to colorize the `error:`/`fatal:` prefix.
    pub use_color: bool,
}

impl Formatter {
    /// Formats `err` as a single line, prefixed `fatal:` or `error:`
    /// depending on [`Error::is_fatal`].
    #[must_use]
    pub fn format(&self, err: &Error) -> String {
        let label = if err.is_fatal() { "fatal" } else { "error" };
        let prefix = if self.use_color {
            format!("\u{1b}[31m{label}:\u{1b}[0m ")
        } else {
            format!("{label}: ")
        };
        format!("{prefix}{err}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argcomplete_core::ErrorKind;

    #[test]
    fn fatal_errors_are_labeled_fatal() {
        let err: Error = ErrorKind::Usage("missing COMP_LINE".to_string()).into();
        let formatter = Formatter::default();
        assert!(formatter.format(&err).starts_with("fatal: "));
    }

    #[test]
    fn swallowed_errors_are_labeled_error() {
        let err: Error = ErrorKind::Lexer("unterminated quote".to_string()).into();
        let formatter = Formatter::default();
        assert!(formatter.format(&err).starts_with("error: "));
    }
}
