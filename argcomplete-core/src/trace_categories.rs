//! Trace category names, used as the `target` of `tracing` events so a
//! `--debug EVENT` filter can select one stage of the pipeline.

/// Trace category for the lexer.
pub const LEXER: &str = "lexer";
/// Trace category for grammar reflection.
pub const GRAMMAR: &str = "grammar";
/// Trace category for the parse simulator.
pub const SIMULATE: &str = "simulate";
/// Trace category for candidate assembly.
pub const COMPLETION: &str = "completion";
/// Trace category for shell quoting/escaping.
pub const QUOTE: &str = "quote";
