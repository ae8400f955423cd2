//! Splits a partial, possibly-unterminated shell command line into the
//! token under the cursor and the tokens preceding it.
//!
//! This crate has no dependency on the rest of the workspace, mirroring how
//! `brush-parser` stands apart from `brush-core`: it only knows about bytes
//! and quoting, not about argument grammars or completion candidates.

#![deny(missing_docs)]

mod error;
mod line;

pub use error::{require_single_byte, LexError};
pub use line::{split_line, LineContext, Prequote, DEFAULT_WORDBREAKS};
