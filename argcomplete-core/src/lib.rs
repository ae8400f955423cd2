//! The completion engine: grammar model, parse simulator, completion
//! finder, and shell quoter.
//!
//! Data flow (driven by `argcomplete-shell`): a [`argcomplete_parser::LineContext`]
//! plus a [`grammar::GrammarModel`] feed [`simulate::walk`], whose
//! [`simulate::ParseState`] feeds [`completion::get_completions`], whose
//! candidates feed [`quote::render`].

#![deny(missing_docs)]

pub mod completion;
mod error;
pub mod grammar;
pub mod quote;
pub mod simulate;
pub mod trace_categories;

pub use error::{Error, ErrorKind};
