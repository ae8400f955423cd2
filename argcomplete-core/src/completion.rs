//! Assembles the final candidate list for the cursor's current word: which
//! action(s) are being completed, what their completer (or declared
//! choices) offers, and which of that output survives prefix filtering,
//! the caller's validator, and the exclude list.
//!
//! Grounded on `brush-core`'s former `Context`/`Spec`/`Answer` completion
//! pipeline shape (gather candidates, then filter/dedupe/sort before
//! handing them back to the caller), narrowed to this engine's single
//! `Namespace`/`ParseState` source of truth instead of a shell's live
//! variable and file-system state.

use indexmap::IndexMap;

use crate::grammar::{CompleterOutcome, CompleterRequest, GrammarModel, Kind, Nargs};
use crate::simulate::ParseState;

/// One completion candidate, with optional help text (used by zsh/fish).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// The literal text to offer, unescaped.
    pub literal: String,
    /// Help text to show alongside the candidate, if any.
    pub help: Option<String>,
}

/// Settings controlling one completion request.
pub struct FinderOptions<'a> {
    /// Offer an active optional's own flag spellings even when its prefix
    /// doesn't yet look like an option token (rarely needed; mirrors
    /// `argparse`'s willingness to complete `--foo` style options even
    /// mid-abbreviation).
    pub always_complete_options: bool,
    /// Candidates removed from the result regardless of where they came
    /// from, by exact literal match.
    pub exclude: &'a [String],
    /// An optional final gate: `validator(prefix, candidate)` returning
    /// `false` drops the candidate.
    pub validator: Option<&'a dyn Fn(&str, &str) -> bool>,
    /// Whether a trailing space should ever be appended after a unique
    /// candidate; `false` when the shell wrapper set
    /// `_ARGCOMPLETE_SUPPRESS_SPACE`.
    pub append_space: bool,
}

impl Default for FinderOptions<'_> {
    fn default() -> Self {
        Self {
            always_complete_options: false,
            exclude: &[],
            validator: None,
            append_space: true,
        }
    }
}

/// The outcome of a completion request.
pub struct CompletionResult {
    /// Surviving candidates, in first-seen order.
    pub candidates: Vec<Candidate>,
    /// Whether the shell wrapper should suppress its own trailing-space
    /// insertion (because at least one surviving candidate ends in a
    /// continuation character, or the caller asked for it unconditionally).
    pub suppress_trailing_space: bool,
    /// Whether no completer or choices were available for the sole active
    /// action and the shell wrapper should fall back to its native
    /// filename completion.
    pub fall_back_to_files: bool,
}

/// Computes the completion candidates for `prefix`, the partial text of
/// the word under the cursor, given the grammar and the state of walking
/// everything before it.
#[must_use]
pub fn get_completions(
    prefix: &str,
    grammar: &GrammarModel,
    state: &ParseState,
    options: &FinderOptions<'_>,
) -> CompletionResult {
    let parser = state.current_parser();
    let mut out: IndexMap<String, Option<String>> = IndexMap::new();
    let mut fall_back_to_files = false;

    for action in state.active_actions() {
        if state.mutex_blocks(action) {
            continue;
        }

        if action.kind == Kind::Subparsers {
            if let Some(subparsers) = &parser.subparsers {
                for name in subparsers.children.keys() {
                    if name.starts_with(prefix) {
                        out.entry(name.clone()).or_insert(None);
                    }
                }
            }
            continue;
        }

        let request = CompleterRequest {
            prefix,
            action,
            parser,
            namespace: state.namespace(),
        };

        let outcome = grammar
            .completer_for(&action.id)
            .map(|c| c.complete(&request))
            .or_else(|| {
                action
                    .choices
                    .clone()
                    .map(CompleterOutcome::Plain)
            });

        match outcome {
            Some(CompleterOutcome::Plain(values)) => {
                for value in values {
                    if value.starts_with(prefix) {
                        out.entry(value).or_insert(None);
                    }
                }
            }
            Some(CompleterOutcome::WithHelp(values)) => {
                for (value, help) in values {
                    if value.starts_with(prefix) {
                        out.entry(value).or_insert(Some(help));
                    }
                }
            }
            Some(CompleterOutcome::Suppress) => {}
            None => {
                if action.kind == Kind::Store || action.kind == Kind::Append {
                    tracing::debug!(
                        target: crate::trace_categories::COMPLETION,
                        dest = %action.dest,
                        "no completer or choices, falling back to file listing"
                    );
                    fall_back_to_files = true;
                    for value in default_file_candidates(prefix) {
                        out.entry(value).or_insert(None);
                    }
                }
            }
        }
    }

    // A REMAINDER positional swallows everything after it verbatim, option
    // lookalikes included; once one is active, no other optional's flag
    // spellings are still reachable, regardless of `always_complete_options`.
    let remainder_active = state
        .active_actions()
        .iter()
        .any(|a| a.nargs == Nargs::Remainder);

    let looks_like_option = prefix.starts_with(|c: char| parser.prefix_chars.contains(c));
    if !remainder_active && (looks_like_option || options.always_complete_options) {
        for opt in &parser.optionals {
            if state.mutex_blocks(opt) {
                continue;
            }
            for option_string in &opt.option_strings {
                if option_string.starts_with(prefix) {
                    out.entry(option_string.clone()).or_insert(None);
                    fall_back_to_files = false;
                }
            }
        }
    }

    for excluded in options.exclude {
        out.shift_remove(excluded);
    }

    if let Some(validator) = options.validator {
        out.retain(|candidate, _| validator(prefix, candidate));
    }

    if !out.is_empty() {
        fall_back_to_files = false;
    }

    let suppress_trailing_space = !options.append_space
        || out
            .keys()
            .any(|c| c.chars().last().is_some_and(crate::quote::is_continuation_char));

    let candidates: Vec<Candidate> = out
        .into_iter()
        .map(|(literal, help)| Candidate { literal, help })
        .collect();

    tracing::debug!(
        target: crate::trace_categories::COMPLETION,
        prefix,
        candidate_count = candidates.len(),
        fall_back_to_files,
        suppress_trailing_space,
        "assembled completion candidates"
    );

    CompletionResult {
        candidates,
        suppress_trailing_space,
        fall_back_to_files,
    }
}

/// The default completer used when an active action has neither an
/// explicit completer nor declared `choices`: a relative-path, `ls`-like
/// enumeration of the current directory (or whatever directory `prefix`
/// names), with directories suffixed `/`.
fn default_file_candidates(prefix: &str) -> Vec<String> {
    let (dir, name_prefix) = prefix.rfind('/').map_or(("", prefix), |idx| {
        (&prefix[..=idx], &prefix[idx + 1..])
    });
    let read_dir = if dir.is_empty() { "." } else { dir };

    let Ok(entries) = std::fs::read_dir(read_dir) else {
        return Vec::new();
    };

    let mut out: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            if !name.starts_with(name_prefix) {
                return None;
            }
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            let mut candidate = format!("{dir}{name}");
            if is_dir {
                candidate.push('/');
            }
            Some(candidate)
        })
        .collect();
    out.sort();
    out
}
