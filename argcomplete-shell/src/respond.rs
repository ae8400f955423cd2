//! Orchestrates one completion request end to end: splits the command line
//! at the cursor, walks the grammar to the cursor's position, finds
//! candidates, and renders the reply blob the shell wrapper writes to its
//! `COMPREPLY`/`compadd`/`complete` machinery.
//!
//! Grounded on the source project's top-level `autocomplete()` entry point,
//! which performs the same four steps in sequence against a single
//! environment snapshot; split here into the library calls each step
//! already has a home for (`argcomplete_parser::split_line`,
//! `argcomplete_core::simulate::walk`, `argcomplete_core::completion::get_completions`,
//! `argcomplete_core::quote::render`) rather than re-implemented inline.

use argcomplete_core::completion::{get_completions, FinderOptions};
use argcomplete_core::grammar::GrammarModel;
use argcomplete_core::quote::{render, RenderOptions};
use argcomplete_core::simulate::walk;
use argcomplete_parser::split_line;

use crate::config::Config;
use crate::env::ResponderEnv;

/// Renders the completion reply blob for one request.
#[must_use]
pub fn respond(env: &ResponderEnv, grammar: &GrammarModel, config: &Config) -> Vec<u8> {
    let (line, point) = if env.drop_first_word {
        strip_first_word(&env.comp_line, env.comp_point)
    } else {
        (env.comp_line.clone(), env.comp_point)
    };

    let ctx = split_line(&line, point, &env.wordbreaks);
    // `ctx.preceding` still carries the program name itself (`comp_words[0]`);
    // the grammar only describes the arguments that follow it, so the root
    // parser must never see it as a token to consume.
    let args = ctx.preceding.get(1..).unwrap_or(&[]);
    let state = walk(args, grammar.root.clone());

    let finder_options = FinderOptions {
        always_complete_options: config.always_complete_options(),
        append_space: config.append_space() && !env.suppress_space,
        ..FinderOptions::default()
    };
    let result = get_completions(&ctx.prefix, grammar, &state, &finder_options);

    // The finder only reports whether a trailing space would ever be
    // welcome; a literal space is only ever appended when it can't
    // possibly disambiguate away a second candidate the shell hasn't
    // displayed yet.
    let append_literal_space = !result.suppress_trailing_space && result.candidates.len() == 1;

    let candidates: Vec<(String, Option<String>)> = result
        .candidates
        .into_iter()
        .map(|c| (c.literal, c.help))
        .collect();

    let render_options = RenderOptions {
        dialect: env.shell,
        prequote: ctx.prequote,
        first_wordbreak_pos: ctx.first_wordbreak_pos,
        wordbreaks: &env.wordbreaks,
        ifs: env.ifs,
        dfs: env.dfs,
    };

    let mut blob = render(&candidates, &render_options);
    // Appended after escaping, not before: a space folded into the literal
    // before `render` runs would itself get backslash-escaped by the
    // unquoted Bash path, producing `submarine\ ` instead of `submarine `.
    if append_literal_space {
        blob.push(b' ');
    }
    blob
}

/// Drops the leading interpreter word from `line` (e.g. `python` in `python
/// script.py --foo`), the behavior `_ARGCOMPLETE=2` requests, adjusting
/// `comp_point` by the same number of bytes so it still lands on the
/// original cursor position.
fn strip_first_word(line: &str, comp_point: usize) -> (String, usize) {
    let leading_ws = line.len() - line.trim_start().len();
    let after_ws = &line[leading_ws..];
    let word_len = after_ws
        .find(char::is_whitespace)
        .unwrap_or(after_ws.len());
    let word_end = leading_ws + word_len;
    let trailing_ws = line[word_end..].len() - line[word_end..].trim_start().len();
    let skip = word_end + trailing_ws;

    let new_point = comp_point.saturating_sub(skip);
    (line[skip..].to_string(), new_point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argcomplete_core::quote::ShellDialect;
    use clap::{Arg, ArgAction, Command};

    fn env(comp_line: &str, comp_point: usize) -> ResponderEnv {
        ResponderEnv {
            drop_first_word: false,
            shell: ShellDialect::Bash,
            comp_line: comp_line.to_string(),
            comp_point,
            wordbreaks: argcomplete_parser::DEFAULT_WORDBREAKS.to_string(),
            ifs: 0x0b,
            dfs: None,
            suppress_space: false,
            debug: false,
            use_tempfiles: false,
        }
    }

    fn demo_grammar() -> GrammarModel {
        let command = Command::new("prog").arg(
            Arg::new("ship")
                .long("ship")
                .value_parser(["submarine", "speedboat"])
                .action(ArgAction::Set),
        );
        GrammarModel::from_command(&command)
    }

    #[test]
    fn single_unambiguous_candidate_gets_trailing_space() {
        let e = env("prog --ship sub", 16);
        let blob = respond(&e, &demo_grammar(), &Config::default());
        assert_eq!(blob, b"submarine ");
    }

    #[test]
    fn multiple_candidates_do_not_get_trailing_space() {
        let e = env("prog --ship s", 13);
        let blob = respond(&e, &demo_grammar(), &Config::default());
        assert!(!blob.ends_with(b" "));
    }

    #[test]
    fn drop_first_word_skips_interpreter_and_adjusts_point() {
        let mut e = env("python prog --ship sub", 23);
        e.drop_first_word = true;
        let blob = respond(&e, &demo_grammar(), &Config::default());
        assert_eq!(blob, b"submarine ");
    }

    #[test]
    fn strip_first_word_adjusts_cursor_offset() {
        let (line, point) = strip_first_word("python prog --foo", 18);
        assert_eq!(line, "prog --foo");
        assert_eq!(point, 11);
    }

    #[test]
    fn program_name_is_not_fed_into_the_bundled_demo_grammars_remainder() {
        // Regression: the demo grammar's first positional is a `REMAINDER`
        // (`rest`). If `comp_words[0]` ("prog") were ever walked into it,
        // the REMAINDER would activate on the program name alone and
        // swallow `--ship` as one of its own operands, leaving zero
        // candidates for the option that actually follows.
        let e = env("prog --ship su", 14);
        let blob = respond(&e, &crate::demo::grammar(), &Config::default());
        assert_eq!(blob, b"submarine ");
    }

    #[test]
    fn subcommand_choices_complete_against_the_bundled_demo_grammar() {
        let e = env(r#"prog eggs "on a"#, 15);
        let blob = respond(&e, &crate::demo::grammar(), &Config::default());
        assert_eq!(blob, b"on a boat\x0bon a train");
    }
}
