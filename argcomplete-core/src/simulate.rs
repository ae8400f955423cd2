//! Walks the tokens preceding the cursor through a [`Parser`] tree without
//! executing any user-supplied `type` conversion, action `__call__`, or
//! custom action — only the "safe" action classes ever touch the
//! namespace, so a misbehaving completer can't corrupt completion for a
//! simpler sibling option.
//!
//! The simulator tolerates errors silently throughout: an unrecognized
//! option, a subcommand name that matches nothing, or more positionals
//! than the grammar declares all just stop contributing to state rather
//! than aborting the walk. The partial line is, after all, partial.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::grammar::{Action, Kind, Namespace, Parser};

/// The result of walking `preceding` tokens through a grammar.
///
/// Lifecycle: built fresh per completion request and discarded once
/// [`crate::completion::CompletionFinder`] has read it; mutating a
/// `Parser`'s borrowed actions in place would make a `ParseState` unsafe to
/// reuse across interleaved completions, so it never does — all mutable
/// bookkeeping lives here, not on the grammar.
pub struct ParseState {
    active_parsers: Vec<Arc<Parser>>,
    next_positional: Vec<usize>,
    remainder_index: Vec<Option<usize>>,
    literal_only: Vec<bool>,
    consumed: HashMap<clap::Id, usize>,
    seen_options: HashSet<clap::Id>,
    active_mutex: HashMap<String, clap::Id>,
    namespace: Namespace,
    active_actions: Vec<Action>,
    last_optional_pending: Option<clap::Id>,
}

impl ParseState {
    fn new(root: Arc<Parser>) -> Self {
        Self {
            active_parsers: vec![root],
            next_positional: vec![0],
            remainder_index: vec![None],
            literal_only: vec![false],
            consumed: HashMap::new(),
            seen_options: HashSet::new(),
            active_mutex: HashMap::new(),
            namespace: Namespace::default(),
            active_actions: Vec::new(),
            last_optional_pending: None,
        }
    }

    /// The parser stack, root first, innermost (currently active)
    /// subparser last.
    #[must_use]
    pub fn active_parsers(&self) -> &[Arc<Parser>] {
        &self.active_parsers
    }

    /// The parser currently receiving tokens.
    #[must_use]
    pub fn current_parser(&self) -> &Parser {
        &self.active_parsers[self.active_parsers.len() - 1]
    }

    /// Whether `action` has been seen at least once.
    #[must_use]
    pub fn seen(&self, action: &Action) -> bool {
        self.seen_options.contains(&action.id)
    }

    /// How many operands `action` has consumed so far.
    #[must_use]
    pub fn consumed_count(&self, action: &Action) -> usize {
        self.consumed.get(&action.id).copied().unwrap_or(0)
    }

    /// Values recorded by safe actions during the walk.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Actions whose operand the cursor is currently typing: the optional
    /// most recently seen but not yet satisfied, and/or the next unfilled
    /// positional(s) of the current parser.
    #[must_use]
    pub fn active_actions(&self) -> &[Action] {
        &self.active_actions
    }

    /// Whether `action` is blocked by another member of its mutex group
    /// already having been seen.
    #[must_use]
    pub fn mutex_blocks(&self, action: &Action) -> bool {
        let Some(group_id) = &action.group_id else {
            return false;
        };
        matches!(self.active_mutex.get(group_id), Some(winner) if *winner != action.id)
    }
}

/// Walks `tokens` (the `preceding` tokens from a [`crate::LineContext`])
/// through `root`, then computes the set of actions active at the cursor.
#[must_use]
pub fn walk(tokens: &[String], root: Arc<Parser>) -> ParseState {
    let mut state = ParseState::new(root);

    let mut i = 0;
    while i < tokens.len() {
        i = step(&mut state, tokens, i);
    }

    finalize(&mut state);
    tracing::debug!(
        target: crate::trace_categories::SIMULATE,
        token_count = tokens.len(),
        depth = state.active_parsers.len(),
        active = state.active_actions.len(),
        "walked preceding tokens"
    );
    state
}

fn step(state: &mut ParseState, tokens: &[String], i: usize) -> usize {
    let token = tokens[i].as_str();
    let depth = state.active_parsers.len() - 1;
    let parser = Arc::clone(&state.active_parsers[depth]);

    if let Some(pos_idx) = state.remainder_index[depth] {
        let action = parser.positionals[pos_idx].clone();
        record(state, &action, token);
        return i + 1;
    }

    // A bare `--` (once, per parser depth) is the conventional end-of-options
    // marker: it is itself consumed by no action, and every token after it is
    // treated as positional even if it looks like an option.
    if !state.literal_only[depth] && is_end_of_options_marker(token, &parser.prefix_chars) {
        state.literal_only[depth] = true;
        tracing::debug!(target: crate::trace_categories::SIMULATE, token, "end-of-options marker seen");
        return i + 1;
    }

    let looks_like_option = !state.literal_only[depth]
        && token.len() > 1
        && token.starts_with(|c: char| parser.prefix_chars.contains(c));

    if looks_like_option {
        if let Some(action) = parser.resolve_optional(token).cloned() {
            return consume_option(state, tokens, i, &parser, &action);
        }
        // Unrecognized option-looking token: silently ignored.
        tracing::debug!(target: crate::trace_categories::SIMULATE, token, "unrecognized option, ignoring");
        return i + 1;
    }

    consume_positional(state, &parser, depth, token);
    i + 1
}

/// Whether `token` is the doubled first prefix character (`--` for the
/// ordinary `-` prefix), the conventional end-of-options marker.
fn is_end_of_options_marker(token: &str, prefix_chars: &str) -> bool {
    let Some(marker) = prefix_chars.chars().next() else {
        return false;
    };
    let mut chars = token.chars();
    chars.next() == Some(marker) && chars.next() == Some(marker) && chars.next().is_none()
}

fn consume_option(
    state: &mut ParseState,
    tokens: &[String],
    i: usize,
    parser: &Arc<Parser>,
    action: &Action,
) -> usize {
    state.seen_options.insert(action.id.clone());
    state.last_optional_pending = Some(action.id.clone());

    if let Some(group_id) = &action.group_id {
        state
            .active_mutex
            .entry(group_id.clone())
            .or_insert_with(|| action.id.clone());
    }

    let mut consumed = 0usize;
    let mut next = i + 1;
    while action.nargs.accepts_more(consumed) && next < tokens.len() {
        let candidate = tokens[next].as_str();
        let candidate_is_option =
            candidate.len() > 1 && candidate.starts_with(|c: char| parser.prefix_chars.contains(c));
        if candidate_is_option && !matches!(action.nargs, crate::grammar::Nargs::Remainder) {
            break;
        }
        record(state, action, candidate);
        consumed += 1;
        next += 1;

        if matches!(
            action.nargs,
            crate::grammar::Nargs::One | crate::grammar::Nargs::Optional
        ) {
            break;
        }
    }

    if consumed >= 1 {
        state.last_optional_pending = None;
    }

    next
}

fn consume_positional(state: &mut ParseState, parser: &Arc<Parser>, depth: usize, token: &str) {
    let Some(pos_idx) = next_unfilled_positional(state, parser, depth) else {
        return;
    };
    let action = parser.positionals[pos_idx].clone();

    if action.kind == Kind::Subparsers {
        let Some(subparsers) = &parser.subparsers else {
            return;
        };
        let Some(child) = subparsers.children.get(token) else {
            // Unknown subcommand name: tolerated silently, no state change.
            tracing::debug!(target: crate::trace_categories::SIMULATE, token, "unrecognized subcommand, ignoring");
            return;
        };
        state.namespace.push(&action.dest, token);
        state.consumed.insert(action.id.clone(), 1);
        state.active_parsers.push(Arc::clone(child));
        state.next_positional.push(0);
        state.remainder_index.push(None);
        state.literal_only.push(false);
        return;
    }

    record(state, &action, token);

    if matches!(action.nargs, crate::grammar::Nargs::Remainder) {
        state.remainder_index[depth] = Some(pos_idx);
    }
}

/// The first positional at or after `next_positional[depth]` that can still
/// absorb another operand. Read-only: advancing `next_positional` past a
/// fully satisfied action happens in [`advance_if_satisfied`] once that
/// action actually receives a token, not speculatively here.
fn next_unfilled_positional(state: &ParseState, parser: &Arc<Parser>, depth: usize) -> Option<usize> {
    (state.next_positional[depth]..parser.positionals.len()).find(|&idx| {
        let action = &parser.positionals[idx];
        let consumed = state.consumed.get(&action.id).copied().unwrap_or(0);
        action.nargs.accepts_more(consumed)
    })
}

fn record(state: &mut ParseState, action: &Action, token: &str) {
    *state.consumed.entry(action.id.clone()).or_insert(0) += 1;
    if action.kind.is_safe() {
        state.namespace.push(&action.dest, token);
    }
    advance_if_satisfied(state, action);
}

fn advance_if_satisfied(state: &mut ParseState, action: &Action) {
    let depth = state.active_parsers.len() - 1;
    let parser = Arc::clone(&state.active_parsers[depth]);
    if let Some(idx) = parser.positionals.iter().position(|a| a.id == action.id) {
        let consumed = state.consumed.get(&action.id).copied().unwrap_or(0);
        if !action.nargs.accepts_more(consumed) && state.next_positional[depth] <= idx {
            state.next_positional[depth] = idx + 1;
        }
    }
}

fn finalize(state: &mut ParseState) {
    let depth = state.active_parsers.len() - 1;
    let parser = Arc::clone(&state.active_parsers[depth]);
    let mut active = Vec::new();

    if let Some(id) = &state.last_optional_pending {
        if let Some(action) = parser.optionals.iter().find(|a| &a.id == id) {
            active.push(action.clone());
        }
    }

    if state.remainder_index[depth].is_none() {
        if let Some(idx) = next_unfilled_positional(state, &parser, depth) {
            active.push(parser.positionals[idx].clone());
        }
    } else if let Some(idx) = state.remainder_index[depth] {
        active.push(parser.positionals[idx].clone());
    }

    state.active_actions = active;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarModel;
    use clap::{Arg, ArgAction, Command};

    fn toks(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn seen_option_is_tracked() {
        let command = Command::new("prog")
            .arg(Arg::new("foo").long("foo").action(ArgAction::SetTrue))
            .arg(Arg::new("bar").long("bar").action(ArgAction::SetTrue));
        let model = GrammarModel::from_command(&command);
        let state = walk(&toks(&["--foo"]), model.root.clone());
        let foo = model
            .root
            .optionals
            .iter()
            .find(|a| a.dest == "foo")
            .unwrap();
        assert!(state.seen(foo));
    }

    #[test]
    fn mutex_group_blocks_sibling() {
        let command = Command::new("prog")
            .arg(Arg::new("bar").long("bar").action(ArgAction::SetTrue))
            .arg(Arg::new("no_bar").long("no-bar").action(ArgAction::SetTrue))
            .group(
                clap::ArgGroup::new("bar")
                    .args(["bar", "no_bar"])
                    .multiple(false),
            );
        let model = GrammarModel::from_command(&command);
        let state = walk(&toks(&["--bar"]), model.root.clone());
        let no_bar = model
            .root
            .optionals
            .iter()
            .find(|a| a.dest == "no_bar")
            .unwrap();
        assert!(state.mutex_blocks(no_bar));
    }

    #[test]
    fn unfilled_positional_with_choices_is_active() {
        let command = Command::new("prog").arg(
            Arg::new("ship")
                .value_parser(["submarine", "speedboat"])
                .action(ArgAction::Set),
        );
        let model = GrammarModel::from_command(&command);
        let state = walk(&toks(&[]), model.root.clone());
        assert_eq!(state.active_actions().len(), 1);
        assert_eq!(state.active_actions()[0].dest, "ship");
    }

    #[test]
    fn subcommand_dispatch_pushes_child_parser() {
        let command = Command::new("prog").subcommand(
            Command::new("eggs").arg(
                Arg::new("type")
                    .value_parser(["on a boat", "on a train"])
                    .action(ArgAction::Set),
            ),
        );
        let model = GrammarModel::from_command(&command);
        let state = walk(&toks(&["eggs"]), model.root.clone());
        assert_eq!(state.current_parser().positionals.len(), 1);
        assert_eq!(state.current_parser().positionals[0].dest, "type");
    }

    #[test]
    fn remainder_positional_swallows_option_like_tokens() {
        let command = Command::new("prog").arg(
            Arg::new("rest")
                .action(ArgAction::Append)
                .num_args(0..)
                .trailing_var_arg(true)
                .value_parser(["--opt"]),
        );
        let model = GrammarModel::from_command(&command);
        let state = walk(&toks(&["--opt"]), model.root.clone());
        assert_eq!(state.active_actions().len(), 1);
        assert_eq!(state.active_actions()[0].dest, "rest");
    }

    #[test]
    fn end_of_options_marker_lets_a_prior_positional_capture_option_like_text() {
        // With a declared positional ahead of the REMAINDER, only the `--`
        // marker (not the bare option-looking lookalike) unlocks assigning
        // `--opt` into a positional at all.
        let command = Command::new("prog")
            .arg(Arg::new("first").action(ArgAction::Set))
            .arg(
                Arg::new("rest")
                    .action(ArgAction::Append)
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .value_parser(["--opt"]),
            );
        let model = GrammarModel::from_command(&command);
        let state = walk(&toks(&["x", "--", "--opt"]), model.root.clone());
        let first = model
            .root
            .positionals
            .iter()
            .find(|a| a.dest == "first")
            .unwrap();
        assert_eq!(state.namespace().get(&first.dest), Some(&["x".to_string()][..]));
        assert_eq!(state.active_actions().len(), 1);
        assert_eq!(state.active_actions()[0].dest, "rest");
    }

    #[test]
    fn unmarked_option_like_token_before_a_remainder_is_ignored_not_captured() {
        let command = Command::new("prog")
            .arg(Arg::new("first").action(ArgAction::Set))
            .arg(
                Arg::new("rest")
                    .action(ArgAction::Append)
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .value_parser(["--opt"]),
            );
        let model = GrammarModel::from_command(&command);
        let state = walk(&toks(&["x", "--opt"]), model.root.clone());
        let first = model
            .root
            .positionals
            .iter()
            .find(|a| a.dest == "first")
            .unwrap();
        assert_eq!(state.namespace().get(&first.dest), Some(&["x".to_string()][..]));
        // `--opt` was never recognized as an option and never assigned to
        // `rest` either, since the end-of-options marker never appeared.
        let rest = model.root.positionals.iter().find(|a| a.dest == "rest").unwrap();
        assert_eq!(state.consumed_count(rest), 0);
    }
}
