//! A bundled sample grammar exercising every data-model feature named in
//! the completion engine's spec: plain flags, a mutually exclusive pair, a
//! choices-constrained positional, a subparser with aliases, and a
//! `REMAINDER` positional. The `argcomplete` binary completes this grammar
//! when run outside of a shell-wrapper invocation's environment, and the
//! workspace's integration tests drive it end-to-end via `assert_cmd`.
//!
//! Grounded on the literal scenarios enumerated in spec.md's testable
//! properties section (ship/speedboat, eggs/on a boat, `--email`, the
//! `--bar`/`--no-bar` mutex pair, and the `--` `REMAINDER`).

use clap::{Arg, ArgAction, ArgGroup, Command};

use argcomplete_core::grammar::GrammarModel;

/// Builds the `clap::Command` tree for the bundled demo grammar.
#[must_use]
pub fn command() -> Command {
    Command::new("prog")
        .disable_help_subcommand(true)
        .arg(
            Arg::new("foo")
                .long("foo")
                .action(ArgAction::SetTrue)
                .help("a plain flag"),
        )
        .arg(
            Arg::new("bar")
                .long("bar")
                .action(ArgAction::SetTrue)
                .help("the affirmative half of a mutually exclusive pair"),
        )
        .arg(
            Arg::new("no_bar")
                .long("no-bar")
                .action(ArgAction::SetTrue)
                .help("the negative half of a mutually exclusive pair"),
        )
        .group(
            ArgGroup::new("bar")
                .args(["bar", "no_bar"])
                .multiple(false),
        )
        .arg(
            Arg::new("ship")
                .long("ship")
                .value_parser(["submarine", "speedboat"])
                .action(ArgAction::Set)
                .help("vessel choice"),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .value_parser(["a@b.c", "a@b.d"])
                .action(ArgAction::Set)
                .help("demonstrates bash word-break trimming"),
        )
        .arg(
            Arg::new("rest")
                .action(ArgAction::Append)
                .num_args(0..)
                .trailing_var_arg(true)
                .value_parser(["--opt", "--other"])
                .help("everything after `--`"),
        )
        .subcommand(
            Command::new("eggs").visible_alias("huevos").arg(
                Arg::new("type")
                    .value_parser([
                        "on a boat",
                        "on a train",
                        "with a goat",
                        "in the rain",
                    ])
                    .action(ArgAction::Set)
                    .help("where you'd eat them"),
            ),
        )
}

/// Builds the [`GrammarModel`] for the bundled demo grammar. No explicit
/// completer callbacks are attached: every active action in this grammar
/// has `choices`, so the synthesized choices-completer (spec.md §4.4 step
/// 3) is exercised instead.
#[must_use]
pub fn grammar() -> GrammarModel {
    GrammarModel::from_command(&command())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_panicking() {
        let model = grammar();
        assert!(!model.root.optionals.is_empty());
        assert!(model.root.subparsers.is_some());
    }
}
