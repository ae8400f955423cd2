//! Splits a partial shell command line into the token under the cursor plus
//! its surrounding context.
//!
//! Grounded on the quote-handling state machine in `brush-parser`'s
//! tokenizer (its `TokenEndReason`/quote-depth tracking), but restructured
//! for a single, possibly-unterminated line rather than a complete script:
//! this produces one [`LineContext`], not a `Vec<Token>`.

use std::iter::Peekable;
use std::str::CharIndices;

/// Shell operator characters that end a word even without surrounding
/// whitespace.
///
/// The simulator cannot model a parse across a pipeline, redirection, or
/// subshell boundary, so encountering one of these before the cursor is
/// unrecoverable and the whole lexer bails to an empty context.
const PUNCTUATION: [char; 8] = ['(', ')', ';', '<', '>', '|', '&', '`'];

/// The default Bash word-break set, used when the shell wrapper does not
/// supply `_ARGCOMPLETE_COMP_WORDBREAKS`.
pub const DEFAULT_WORDBREAKS: &str = " \t\n\"'><=;|&(:";

/// An unterminated opening quote character active at the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Prequote {
    /// The cursor sits inside an unterminated `'...` run.
    Single,
    /// The cursor sits inside an unterminated `"...` run.
    Double,
}

impl Prequote {
    /// The literal quote character this variant represents.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }
}

/// The token under the cursor, and the tokens preceding it, produced by
/// splitting a partial command line.
///
/// `prefix + suffix` equals the original cursor token with quoting already
/// processed; a candidate completion is spliced in between the two.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    any(test, feature = "serde"),
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LineContext {
    /// An unterminated opening quote active at the cursor, if any.
    pub prequote: Option<Prequote>,
    /// The already-unescaped portion of the cursor token before the caret.
    pub prefix: String,
    /// The already-unescaped portion of the cursor token after the caret.
    pub suffix: String,
    /// Fully-typed tokens preceding the cursor token, in order.
    pub preceding: Vec<String>,
    /// Byte offset in `prefix` of the last wordbreak character, if any.
    ///
    /// Used by the Quoter to trim candidates so Bash, which re-splits the
    /// line at wordbreak characters before invoking the completion
    /// function, reassembles them correctly.
    pub first_wordbreak_pos: Option<usize>,
}

impl LineContext {
    /// The empty context returned for unrecoverable input.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Splits `line` at the given byte offset `point`, using `wordbreaks` to
/// compute [`LineContext::first_wordbreak_pos`].
///
/// `point` is clamped to `line.len()`.
#[must_use]
pub fn split_line(line: &str, point: usize, wordbreaks: &str) -> LineContext {
    // Target name duplicated from `argcomplete_core::trace_categories::LEXER`;
    // this crate sits below that one in the dependency graph and can't import
    // the constant back out of it.
    match Lexer::new(line, point.min(line.len())).run() {
        Some(mut ctx) => {
            ctx.first_wordbreak_pos = last_wordbreak_pos(&ctx.prefix, wordbreaks);
            tracing::debug!(
                target: "lexer",
                prefix = %ctx.prefix,
                suffix = %ctx.suffix,
                preceding = ?ctx.preceding,
                prequote = ?ctx.prequote,
                "split line at point {point}"
            );
            ctx
        }
        None => {
            tracing::debug!(target: "lexer", point, "unrecoverable token at cursor, bailing to empty context");
            LineContext::empty()
        }
    }
}

fn last_wordbreak_pos(prefix: &str, wordbreaks: &str) -> Option<usize> {
    prefix
        .char_indices()
        .filter(|(_, c)| wordbreaks.contains(*c))
        .map(|(i, _)| i)
        .next_back()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single,
    Double,
}

type Chars<'a> = Peekable<CharIndices<'a>>;

/// Walks a line one character at a time, tracking quote state and the token
/// currently under construction, stopping once the token containing the
/// cursor has been fully determined.
struct Lexer<'a> {
    point: usize,
    preceding: Vec<String>,
    chars: Chars<'a>,
}

impl<'a> Lexer<'a> {
    fn new(line: &'a str, point: usize) -> Self {
        Self {
            point,
            preceding: Vec::new(),
            chars: line.char_indices().peekable(),
        }
    }

    fn run(mut self) -> Option<LineContext> {
        let mut building = false;
        let mut buf = String::new();
        let mut quote: Option<Quote> = None;

        while let Some(&(i, c)) = self.chars.peek() {
            if i == self.point {
                return self.resolve_cursor(building, buf, quote);
            }

            if let Some(q) = quote {
                self.chars.next();
                quote = Self::consume_quoted(q, c, &mut self.chars, &mut buf);
                continue;
            }

            match c {
                ' ' | '\t' | '\n' => {
                    self.chars.next();
                    if building {
                        self.preceding.push(std::mem::take(&mut buf));
                        building = false;
                    }
                }
                '\'' => {
                    self.chars.next();
                    building = true;
                    quote = Some(Quote::Single);
                }
                '"' => {
                    self.chars.next();
                    building = true;
                    quote = Some(Quote::Double);
                }
                '\\' => {
                    self.chars.next();
                    building = true;
                    push_escaped(&mut self.chars, &mut buf);
                }
                _ if PUNCTUATION.contains(&c) => return None,
                _ => {
                    self.chars.next();
                    building = true;
                    buf.push(c);
                }
            }
        }

        // Ran off the end of the line without ever reaching `point`; only
        // possible when `point == line.len()`.
        self.resolve_cursor(building, buf, quote)
    }

    /// The cursor has just been reached. `prefix` is whatever was
    /// accumulated so far; the remainder of the same token (same quote
    /// state) is then scanned to produce `suffix` and `prequote`.
    fn resolve_cursor(
        mut self,
        building: bool,
        buf: String,
        mut quote: Option<Quote>,
    ) -> Option<LineContext> {
        let next = self.chars.peek().map(|&(_, c)| c);

        if !building && next.is_some_and(|c| PUNCTUATION.contains(&c)) {
            // Cursor sits directly on an operator character: unrecoverable.
            return None;
        }
        if !building && next.is_none_or(char::is_whitespace) {
            return Some(LineContext {
                prequote: None,
                prefix: String::new(),
                suffix: String::new(),
                preceding: self.preceding,
                first_wordbreak_pos: None,
            });
        }

        let prefix = buf;
        let mut suffix = String::new();

        while let Some(&(_, c)) = self.chars.peek() {
            if let Some(q) = quote {
                self.chars.next();
                quote = Self::consume_quoted(q, c, &mut self.chars, &mut suffix);
                continue;
            }

            match c {
                ' ' | '\t' | '\n' => break,
                '\'' => {
                    self.chars.next();
                    quote = Some(Quote::Single);
                }
                '"' => {
                    self.chars.next();
                    quote = Some(Quote::Double);
                }
                '\\' => {
                    self.chars.next();
                    push_escaped(&mut self.chars, &mut suffix);
                }
                _ if PUNCTUATION.contains(&c) => break,
                _ => {
                    self.chars.next();
                    suffix.push(c);
                }
            }
        }

        let prequote = quote.map(|q| match q {
            Quote::Single => Prequote::Single,
            Quote::Double => Prequote::Double,
        });

        // Per the unterminated-quote rule, the whole accumulated run
        // becomes `prefix`; there's nothing meaningful "after" the cursor
        // once the quote never closes within the supplied line.
        let (prefix, suffix) = if prequote.is_some() {
            (format!("{prefix}{suffix}"), String::new())
        } else {
            (prefix, suffix)
        };

        Some(LineContext {
            prequote,
            prefix,
            suffix,
            preceding: self.preceding,
            first_wordbreak_pos: None,
        })
    }

    /// Consumes one quoted character `c` (the quote-opening character
    /// itself was already consumed by the caller) and returns the quote
    /// state to carry forward (`None` once the quote closes).
    fn consume_quoted(q: Quote, c: char, chars: &mut Chars<'_>, out: &mut String) -> Option<Quote> {
        match (q, c) {
            (Quote::Single, '\'') => None,
            (Quote::Double, '"') => None,
            (Quote::Double, '\\') => {
                if let Some(&(_, d)) = chars.peek() {
                    if matches!(d, '$' | '`' | '"' | '\\' | '\n') {
                        out.push(d);
                        chars.next();
                    } else {
                        out.push('\\');
                    }
                } else {
                    out.push('\\');
                }
                Some(q)
            }
            _ => {
                out.push(c);
                Some(q)
            }
        }
    }
}

/// Outside quotes, `\x` yields literal `x` for any `x` (including a
/// trailing lone backslash with nothing after it, kept literal).
fn push_escaped(chars: &mut Chars<'_>, out: &mut String) {
    if let Some(&(_, d)) = chars.peek() {
        out.push(d);
        chars.next();
    } else {
        out.push('\\');
    }
}
