//! In-memory representation of a parser tree: parsers, actions, subparser
//! maps, nargs, choices, completers, and mutually exclusive groups.
//!
//! Rather than reinventing an argument-declaration DSL, `GrammarModel` wraps
//! a [`clap::Command`] tree directly: `clap::Command` already *is* a
//! declarative parser specification, and it's the dependency the rest of
//! this workspace leans on for its own CLI surfaces. The one gap is a slot
//! for an executable completion callback, which `clap::Arg` has no room
//! for; `GrammarModel` keeps those in a side table keyed by [`clap::Id`]
//! instead of monkey-patching anything onto `Arg`.

use std::collections::HashMap;
use std::sync::Arc;

use clap::{Arg, ArgAction, Command};
use indexmap::IndexMap;

/// Number of operands a single occurrence of an action consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nargs {
    /// Exactly one operand (a plain `store`-style option or positional).
    One,
    /// Exactly `n` operands.
    Exact(usize),
    /// Zero or one operand (`?`).
    Optional,
    /// Zero or more operands (`*`).
    ZeroOrMore,
    /// One or more operands (`+`).
    OneOrMore,
    /// Swallows every remaining token, including ones that look like
    /// options; no further option parsing happens once this is active.
    Remainder,
}

impl Nargs {
    /// Whether this action can still absorb another operand, given how many
    /// it has consumed so far.
    #[must_use]
    pub fn accepts_more(self, consumed: usize) -> bool {
        match self {
            Self::One => consumed < 1,
            Self::Exact(n) => consumed < n,
            Self::Optional => consumed < 1,
            Self::ZeroOrMore | Self::OneOrMore | Self::Remainder => true,
        }
    }

    /// Whether `consumed` operands satisfy this action's contract (for
    /// `+`, at least one is required).
    #[must_use]
    pub fn is_satisfied(self, consumed: usize) -> bool {
        match self {
            Self::One => consumed >= 1,
            Self::Exact(n) => consumed >= n,
            Self::Optional | Self::ZeroOrMore | Self::Remainder => true,
            Self::OneOrMore => consumed >= 1,
        }
    }
}

/// The class of action, mirroring the source system's action classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// Stores a single value (or several, for repeated `nargs`).
    Store,
    /// Stores a fixed constant when the option is present.
    StoreConst,
    /// Stores `true` when the option is present.
    StoreTrue,
    /// Stores `false` when the option is present.
    StoreFalse,
    /// Appends each occurrence's value to a list.
    Append,
    /// Appends a fixed constant on each occurrence.
    AppendConst,
    /// Counts occurrences.
    Count,
    /// Selects a subparser by name.
    Subparsers,
    /// Prints help and exits.
    Help,
    /// Prints a version string and exits.
    Version,
    /// Anything else; never simulated.
    Custom,
}

impl Kind {
    /// Safe actions are side-effect-free to simulate: only these update the
    /// namespace during a simulated parse. `help`/`version` are recognized
    /// but never invoked.
    #[must_use]
    pub fn is_safe(self) -> bool {
        matches!(
            self,
            Self::Store
                | Self::StoreConst
                | Self::StoreTrue
                | Self::StoreFalse
                | Self::Append
                | Self::AppendConst
                | Self::Count
        )
    }
}

/// A declarative argument slot: an option or a positional.
#[derive(Clone, Debug)]
pub struct Action {
    /// Identity shared with the owning `clap::Arg`/`clap::Command`; the key
    /// used to look up a completer in [`GrammarModel`]'s side table.
    pub id: clap::Id,
    /// Option strings (`--foo`, `-f`); empty for positionals.
    pub option_strings: Vec<String>,
    /// The namespace key this action's value(s) are recorded under.
    pub dest: String,
    /// How many operands a single occurrence consumes.
    pub nargs: Nargs,
    /// Fixed set of acceptable values, if any.
    pub choices: Option<Vec<String>>,
    /// Whether the action must appear at least once.
    pub required: bool,
    /// The action's class.
    pub kind: Kind,
    /// The mutually exclusive group this action belongs to, if any.
    pub group_id: Option<String>,
}

impl Action {
    /// An action is *safe* to simulate (see [`Kind::is_safe`]).
    #[must_use]
    pub fn is_safe(&self) -> bool {
        self.kind.is_safe()
    }
}

/// Child parsers reachable from a subparsers action, keyed by name and
/// alias; aliases resolve to the same child.
#[derive(Clone, Debug, Default)]
pub struct Subparsers {
    /// The namespace key the chosen subcommand name is recorded under.
    pub dest: String,
    /// Name/alias to child parser.
    pub children: IndexMap<String, Arc<Parser>>,
}

/// A node of the parser tree: a command or subcommand's own declared
/// options, positionals, and mutex groups.
///
/// Invariant: every option string is unique within a parser and begins with
/// a character from `prefix_chars`.
#[derive(Clone, Debug)]
pub struct Parser {
    /// Characters that mark a token as an option rather than a positional.
    pub prefix_chars: String,
    /// Declared positional actions, in declaration order.
    pub positionals: Vec<Action>,
    /// Declared optional actions, in declaration order.
    pub optionals: Vec<Action>,
    /// Sets of action ids that are mutually exclusive.
    pub mutex_groups: Vec<Vec<clap::Id>>,
    /// Whether this parser auto-generates `-h`/`--help`.
    pub add_help: bool,
    /// The subparsers action, if this parser dispatches to children.
    pub subparsers: Option<Subparsers>,
}

impl Parser {
    /// Looks up the optional whose option strings contain `token`, or
    /// which `token` uniquely abbreviates as a prefix.
    ///
    /// Returns `None` either when nothing matches or when the abbreviation
    /// is ambiguous (matches more than one option's long form); per the
    /// simulator's tolerance of `argparse`'s `allow_abbrev` ambiguity, an
    /// ambiguous abbreviation simply fails to resolve rather than picking
    /// an arbitrary candidate.
    #[must_use]
    pub fn resolve_optional(&self, token: &str) -> Option<&Action> {
        if let Some(exact) = self
            .optionals
            .iter()
            .find(|a| a.option_strings.iter().any(|o| o == token))
        {
            return Some(exact);
        }

        if !token.starts_with(|c: char| self.prefix_chars.contains(c)) || token.len() < 2 {
            return None;
        }

        let mut matches = self.optionals.iter().filter(|a| {
            a.option_strings
                .iter()
                .any(|o| o.starts_with(token) && o.starts_with("--"))
        });

        let first = matches.next()?;
        if matches.next().is_some() {
            None
        } else {
            Some(first)
        }
    }
}

/// A completer's view of the state it's generating candidates for.
pub struct CompleterRequest<'a> {
    /// The text already typed for this action's operand.
    pub prefix: &'a str,
    /// The action being completed.
    pub action: &'a Action,
    /// The parser that owns `action`.
    pub parser: &'a Parser,
    /// Values recorded so far by safe actions during the simulated parse.
    pub namespace: &'a Namespace,
}

/// What a completer produced.
pub enum CompleterOutcome {
    /// Plain candidate strings.
    Plain(Vec<String>),
    /// Candidate strings paired with help text (used by zsh/fish).
    WithHelp(Vec<(String, String)>),
    /// The action's candidates (and, per `print_suppressed`, its option
    /// strings) are omitted entirely.
    Suppress,
}

/// A user-supplied completion callback.
///
/// This is the Rust-idiomatic replacement for the source system's approach
/// of monkey-patching action objects to intercept them: a first-class
/// trait object attached through [`GrammarModel::with_completer`].
pub trait Completer: Send + Sync {
    /// Produces candidates for the given request.
    fn complete(&self, request: &CompleterRequest<'_>) -> CompleterOutcome;
}

impl<F> Completer for F
where
    F: Fn(&CompleterRequest<'_>) -> CompleterOutcome + Send + Sync,
{
    fn complete(&self, request: &CompleterRequest<'_>) -> CompleterOutcome {
        self(request)
    }
}

/// A shared handle to a completer, stored in [`GrammarModel`]'s side table.
pub type CompleterFn = Arc<dyn Completer>;

/// Values recorded by safe actions during a simulated parse, keyed by
/// `dest`. Only safe action kinds (see [`Kind::is_safe`]) populate this;
/// unsafe kinds record consumption but never touch the namespace.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    values: HashMap<String, Vec<String>>,
}

impl Namespace {
    /// Values recorded for `dest`, if any were.
    #[must_use]
    pub fn get(&self, dest: &str) -> Option<&[String]> {
        self.values.get(dest).map(Vec::as_slice)
    }

    pub(crate) fn push(&mut self, dest: &str, value: impl Into<String>) {
        self.values
            .entry(dest.to_string())
            .or_default()
            .push(value.into());
    }
}

/// The complete parser tree plus the completer callbacks attached to it.
pub struct GrammarModel {
    /// The root parser (top-level command).
    pub root: Arc<Parser>,
    completers: HashMap<clap::Id, CompleterFn>,
}

impl GrammarModel {
    /// Builds a `GrammarModel` by reflecting over a `clap::Command` tree.
    #[must_use]
    pub fn from_command(command: &Command) -> Self {
        // `get_arguments()` only sees auto-generated actions like `-h`/`--help`
        // once the command has gone through clap's own `build()` pass; a
        // command handed to us straight from its constructor hasn't run that
        // pass yet, so reflect a built clone rather than the caller's copy.
        let mut built = command.clone();
        built.build();
        let root = build_parser(&built);
        tracing::debug!(
            target: crate::trace_categories::GRAMMAR,
            name = built.get_name(),
            positionals = root.positionals.len(),
            optionals = root.optionals.len(),
            subcommands = root.subparsers.is_some(),
            "reflected command into grammar model"
        );
        Self {
            root: Arc::new(root),
            completers: HashMap::new(),
        }
    }

    /// Attaches a completer callback to the action identified by `id`.
    #[must_use]
    pub fn with_completer(mut self, id: impl Into<clap::Id>, completer: impl Completer + 'static) -> Self {
        let id = id.into();
        tracing::debug!(target: crate::trace_categories::GRAMMAR, %id, "attached completer");
        self.completers.insert(id, Arc::new(completer));
        self
    }

    /// The completer attached to `id`, if any.
    #[must_use]
    pub fn completer_for(&self, id: &clap::Id) -> Option<&CompleterFn> {
        self.completers.get(id)
    }
}

fn build_parser(command: &Command) -> Parser {
    // clap hardcodes `-` as its only option prefix; there's no accessor to
    // reflect a different one back out.
    let prefix_chars = "-".to_string();

    let groups: Vec<(String, bool, Vec<clap::Id>)> = command
        .get_groups()
        .map(|g| {
            (
                g.get_id().to_string(),
                g.is_multiple(),
                g.get_args().cloned().collect(),
            )
        })
        .collect();

    let group_of = |id: &clap::Id| -> Option<String> {
        groups
            .iter()
            .find(|(_, multiple, members)| !multiple && members.contains(id))
            .map(|(gid, ..)| gid.clone())
    };

    let mut positionals = Vec::new();
    let mut optionals = Vec::new();
    let mut add_help = false;

    for arg in command.get_arguments() {
        if matches!(
            arg.get_action(),
            ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong
        ) {
            add_help = true;
        }

        let action = build_action(arg, group_of(arg.get_id()));
        if arg.is_positional() {
            positionals.push(action);
        } else {
            optionals.push(action);
        }
    }

    let mutex_groups = groups
        .into_iter()
        .filter(|(_, multiple, _)| !multiple)
        .map(|(_, _, members)| members)
        .collect();

    let subparsers = build_subparsers(command);
    if let Some(ref sp) = subparsers {
        // Synthesized so that ordinary positional-consumption logic walks
        // straight into subcommand dispatch once the declared positionals
        // are filled; clap models subcommands outside `get_arguments()`, so
        // there is no real `Arg` to reflect this one from.
        positionals.push(Action {
            id: clap::Id::from("__subcommand__"),
            option_strings: Vec::new(),
            dest: sp.dest.clone(),
            nargs: Nargs::One,
            choices: None,
            required: false,
            kind: Kind::Subparsers,
            group_id: None,
        });
    }

    Parser {
        prefix_chars,
        positionals,
        optionals,
        mutex_groups,
        add_help,
        subparsers,
    }
}

fn build_action(arg: &Arg, group_id: Option<String>) -> Action {
    let option_strings = arg
        .get_long_and_visible_aliases()
        .into_iter()
        .flatten()
        .map(|s| format!("--{s}"))
        .chain(
            arg.get_short_and_visible_aliases()
                .into_iter()
                .flatten()
                .map(|c| format!("-{c}")),
        )
        .collect();

    let choices = {
        let values: Vec<String> = arg
            .get_possible_values()
            .iter()
            .map(|v| v.get_name().to_string())
            .collect();
        (!values.is_empty()).then_some(values)
    };

    let kind = match arg.get_action() {
        ArgAction::Set => Kind::Store,
        ArgAction::SetTrue => Kind::StoreTrue,
        ArgAction::SetFalse => Kind::StoreFalse,
        ArgAction::Count => Kind::Count,
        ArgAction::Append => Kind::Append,
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong => Kind::Help,
        ArgAction::Version => Kind::Version,
        _ => Kind::Custom,
    };

    let nargs = nargs_of(arg, kind);

    Action {
        id: arg.get_id().clone(),
        option_strings,
        dest: arg.get_id().to_string(),
        nargs,
        choices,
        required: arg.is_required_set(),
        kind,
        group_id,
    }
}

fn nargs_of(arg: &Arg, kind: Kind) -> Nargs {
    if !matches!(kind, Kind::Store | Kind::Append) {
        return Nargs::Exact(0);
    }

    let Some(range) = arg.get_num_args() else {
        return Nargs::One;
    };

    if arg.is_trailing_var_arg() {
        return Nargs::Remainder;
    }

    let min = range.min_values();
    let max = range.max_values();

    match (min, max) {
        (1, 1) => Nargs::One,
        (0, 1) => Nargs::Optional,
        (0, usize::MAX) => Nargs::ZeroOrMore,
        (1, usize::MAX) => Nargs::OneOrMore,
        (n, m) if n == m => Nargs::Exact(n),
        (n, _) => Nargs::Exact(n),
    }
}

fn build_subparsers(command: &Command) -> Option<Subparsers> {
    if command.get_subcommands().next().is_none() {
        return None;
    }

    let mut children = IndexMap::new();
    for sub in command.get_subcommands() {
        let child = Arc::new(build_parser(sub));
        children.insert(sub.get_name().to_string(), child.clone());
        for alias in sub.get_visible_aliases() {
            children.insert(alias.to_string(), child.clone());
        }
    }

    Some(Subparsers {
        dest: command
            .get_name()
            .to_string(),
        children,
    })
}
