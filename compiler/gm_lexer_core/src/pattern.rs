//! Anchored patterns with explicit lookaround.
//!
//! A [`Pattern`] is a body regex plus optional lookbehind and lookahead
//! assertions. The assertions are part of the pattern's interface rather than
//! of the regex dialect: the underlying engine (`regex`) has no lookaround,
//! and grammars rely heavily on zero-width context ("colon not followed by
//! another colon"), so each assertion is its own regex evaluated against the
//! text on one side of the match.
//!
//! # Matching Model
//!
//! For a cursor `pos` in `text`:
//! - the body must match starting exactly at `pos` (evaluated on `text[pos..]`,
//!   so `\A` and `^` refer to the cursor, not to the start of input);
//! - the lookbehind must (or, negated, must not) match some suffix of
//!   `text[..pos]`;
//! - the lookahead must (or must not) match a prefix of `text[end..]`, where
//!   `end` is the end of the body's match.
//!
//! The body's leftmost-first match is tried first. If the lookahead rejects
//! it, shorter ends are tried, longest first, at each earlier character
//! boundary: the first end where the lookahead holds and the body matches
//! exactly `text[pos..end]` wins. For greedy bodies this is the order a
//! backtracking engine visits. The retried body sees the truncated text, so
//! `$`, `\z` and `\b` in a body evaluate against the shortened end.
//!
//! Start-of-input context is written as [`Pattern::at_input_start`], and
//! word-boundary context as a lookbehind on `\w`.

use std::fmt;
use std::ops::Range;

use regex::Regex;
use smallvec::SmallVec;

/// Which part of a pattern a regex belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternPart {
    Body,
    Lookbehind,
    Lookahead,
}

impl fmt::Display for PatternPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatternPart::Body => "body",
            PatternPart::Lookbehind => "lookbehind",
            PatternPart::Lookahead => "lookahead",
        })
    }
}

/// A pattern regex failed to compile.
#[derive(Clone, Debug, thiserror::Error)]
#[error("invalid {part} regex `{regex}`: {source}")]
pub struct PatternError {
    pub part: PatternPart,
    pub regex: String,
    #[source]
    pub source: regex::Error,
}

/// A zero-width assertion on one side of the match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Look {
    regex: String,
    negated: bool,
}

/// Declarative pattern: uncompiled body plus lookaround.
///
/// Built with the fluent constructors below and compiled once when the
/// owning grammar is built.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pattern {
    body: String,
    behind: Option<Look>,
    ahead: Option<Look>,
}

impl Pattern {
    pub fn new(body: impl Into<String>) -> Self {
        Pattern {
            body: body.into(),
            behind: None,
            ahead: None,
        }
    }

    /// Require the text before the cursor to end with a match of `regex`.
    #[must_use]
    pub fn preceded_by(self, regex: impl Into<String>) -> Self {
        self.with_behind(regex.into(), false)
    }

    /// Require the text before the cursor not to end with a match of `regex`.
    #[must_use]
    pub fn not_preceded_by(self, regex: impl Into<String>) -> Self {
        self.with_behind(regex.into(), true)
    }

    /// Require the text after the match to start with a match of `regex`.
    #[must_use]
    pub fn followed_by(self, regex: impl Into<String>) -> Self {
        self.with_ahead(regex.into(), false)
    }

    /// Require the text after the match not to start with a match of `regex`.
    #[must_use]
    pub fn not_followed_by(self, regex: impl Into<String>) -> Self {
        self.with_ahead(regex.into(), true)
    }

    /// Only match at offset 0 of the input.
    #[must_use]
    pub fn at_input_start(self) -> Self {
        self.preceded_by(r"\A")
    }

    fn with_behind(mut self, regex: String, negated: bool) -> Self {
        self.behind = Some(Look { regex, negated });
        self
    }

    fn with_ahead(mut self, regex: String, negated: bool) -> Self {
        self.ahead = Some(Look { regex, negated });
        self
    }

    /// Compile the body and assertions.
    pub fn compile(&self) -> Result<CompiledPattern, PatternError> {
        let body = compile_part(PatternPart::Body, &self.body, |re| format!(r"\A(?:{re})"))?;
        let behind = self
            .behind
            .as_ref()
            .map(|look| {
                compile_part(PatternPart::Lookbehind, &look.regex, |re| format!(r"(?:{re})\z"))
                    .map(|regex| CompiledLook {
                        regex,
                        negated: look.negated,
                    })
            })
            .transpose()?;
        let ahead = self
            .ahead
            .as_ref()
            .map(|look| {
                compile_part(PatternPart::Lookahead, &look.regex, |re| format!(r"\A(?:{re})"))
                    .map(|regex| CompiledLook {
                        regex,
                        negated: look.negated,
                    })
            })
            .transpose()?;
        // Only needed to retry shorter bodies when a lookahead fails.
        let exact = ahead
            .is_some()
            .then(|| compile_part(PatternPart::Body, &self.body, |re| format!(r"\A(?:{re})\z")))
            .transpose()?;
        let groups = body.captures_len() - 1;

        Ok(CompiledPattern {
            body,
            exact,
            behind,
            ahead,
            groups,
        })
    }
}

impl From<&str> for Pattern {
    fn from(body: &str) -> Self {
        Pattern::new(body)
    }
}

impl From<String> for Pattern {
    fn from(body: String) -> Self {
        Pattern::new(body)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(look) = &self.behind {
            let op = if look.negated { "?<!" } else { "?<=" };
            write!(f, "({op}{})", look.regex)?;
        }
        f.write_str(&self.body)?;
        if let Some(look) = &self.ahead {
            let op = if look.negated { "?!" } else { "?=" };
            write!(f, "({op}{})", look.regex)?;
        }
        Ok(())
    }
}

fn compile_part(
    part: PatternPart,
    regex: &str,
    anchor: impl FnOnce(&str) -> String,
) -> Result<Regex, PatternError> {
    Regex::new(&anchor(regex)).map_err(|source| PatternError {
        part,
        regex: regex.to_owned(),
        source,
    })
}

#[derive(Clone, Debug)]
struct CompiledLook {
    regex: Regex,
    negated: bool,
}

impl CompiledLook {
    #[inline]
    fn holds(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack) != self.negated
    }
}

/// A pattern ready for matching. Immutable and `Send + Sync`.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    body: Regex,
    /// The body anchored at both ends.
    exact: Option<Regex>,
    behind: Option<CompiledLook>,
    ahead: Option<CompiledLook>,
    groups: usize,
}

impl CompiledPattern {
    /// Number of explicit capture groups in the body.
    pub fn group_count(&self) -> usize {
        self.groups
    }

    /// Match anchored at byte offset `pos`.
    ///
    /// `pos` must lie on a character boundary of `text`.
    pub fn match_at(&self, text: &str, pos: usize) -> Option<PatternMatch> {
        if let Some(look) = &self.behind {
            if !look.holds(&text[..pos]) {
                return None;
            }
        }

        let rest = &text[pos..];
        let first = self.capture(&self.body, rest, pos)?;
        let Some(ahead) = &self.ahead else {
            return Some(first);
        };
        if ahead.holds(&text[first.range.end..]) {
            return Some(first);
        }

        let exact = self.exact.as_ref()?;
        let longest = first.range.end - pos;
        rest[..longest]
            .char_indices()
            .rev()
            .map(|(end, _)| end)
            .filter(|&end| ahead.holds(&rest[end..]))
            .find_map(|end| self.capture(exact, &rest[..end], pos))
    }

    /// Run `regex` on `haystack`, which starts at absolute offset `pos`.
    fn capture(&self, regex: &Regex, haystack: &str, pos: usize) -> Option<PatternMatch> {
        let mut groups = SmallVec::new();
        let range = if self.groups == 0 {
            let m = regex.find(haystack)?;
            pos + m.start()..pos + m.end()
        } else {
            let caps = regex.captures(haystack)?;
            let whole = caps.get(0)?;
            groups.extend(
                (1..=self.groups).map(|i| caps.get(i).map(|g| pos + g.start()..pos + g.end())),
            );
            pos + whole.start()..pos + whole.end()
        };
        Some(PatternMatch { range, groups })
    }
}

/// Result of a successful [`CompiledPattern::match_at`].
///
/// All ranges are absolute byte offsets into the scanned text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMatch {
    pub range: Range<usize>,
    groups: SmallVec<[Option<Range<usize>>; 4]>,
}

impl PatternMatch {
    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Capture group ranges in group order; `None` for groups that did not
    /// participate in the match.
    pub fn groups(&self) -> &[Option<Range<usize>>] {
        &self.groups
    }
}
