//! Library surface for `argcomplete-shell`.
//!
//! A clap-based CLI embeds the responder by checking
//! [`env::is_completion_request`] near the top of its own `main` and, when
//! it's set, calling [`respond::respond`] and exiting, the same way the
//! source project's `argcomplete.autocomplete(parser)` call sits at the top
//! of a Python script: if the shell-wrapper environment contract
//! (`_ARGCOMPLETE`) isn't present, the program's real `main` keeps running
//! unmodified.
//!
//! The `argcomplete` and `argcomplete-shellcode` binaries built from this
//! crate are thin wrappers around the same library surface: the former
//! demonstrates the responder against a bundled sample grammar (used by this
//! workspace's own integration tests), the latter exposes the shellcode
//! emitter and marker check as a standalone tool for shells that can't embed
//! a Rust program directly.

#![deny(missing_docs)]

pub mod args;
pub mod config;
pub mod demo;
pub mod env;
mod error_formatter;
pub mod events;
pub mod io;
pub mod marker;
mod productinfo;
pub mod respond;
pub mod shellcode;

pub use error_formatter::Formatter;
pub use productinfo::{PRODUCT_NAME, PRODUCT_VERSION};
