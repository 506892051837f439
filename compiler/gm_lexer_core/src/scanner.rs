//! The stack-driven matching loop.
//!
//! A [`Scanner`] walks one source under one [`Grammar`]. Each step tries the
//! effective rules of the state on top of the stack, in order, at the cursor;
//! the first rule that matches wins, applies its stack op and emits its
//! tokens. Tokens are pulled through [`Iterator`]; a step is only taken when
//! the queue of pending tokens is empty.
//!
//! # Zero-width steps
//!
//! `Default` rules consume nothing. The scanner remembers every stack it has
//! held since the cursor last moved; reaching one of them again, or taking
//! more than [`ScanConfig::max_zero_width_steps`] such steps in a row, is a
//! [`ScanError::ZeroWidthLoop`].

use std::collections::VecDeque;
use std::iter::FusedIterator;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{ScanError, StackTrace};
use crate::grammar::{Grammar, RuleEntry, StateId};
use crate::pattern::PatternMatch;
use crate::rule::{Action, Rule, StackOp};
use crate::span::{LineIndex, Position, Span};
use crate::token::{Token, TokenKind};

type Stack = SmallVec<[StateId; 8]>;

/// Scanner settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Append a zero-length [`TokenKind::Eof`] token at the end of input.
    pub emit_eof: bool,
    /// Zero-width steps allowed at one position before the scan fails.
    pub max_zero_width_steps: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            emit_eof: false,
            max_zero_width_steps: 64,
        }
    }
}

impl ScanConfig {
    #[must_use]
    pub fn with_emit_eof(mut self, emit_eof: bool) -> Self {
        self.emit_eof = emit_eof;
        self
    }

    #[must_use]
    pub fn with_max_zero_width_steps(mut self, steps: usize) -> Self {
        self.max_zero_width_steps = steps;
        self
    }
}

/// Outcome of one [`Scanner::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// A token rule matched and queued `tokens` tokens.
    Consumed { tokens: usize },
    /// A default rule fired; only the stack changed.
    ZeroWidth,
    /// Nothing left to scan.
    Finished,
}

/// All tokens of a completed scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanOutput<'src> {
    pub tokens: Vec<Token<'src>>,
    /// State stack at end of input, root first.
    pub stack: StackTrace,
}

impl ScanOutput<'_> {
    /// Returns `true` if input ended inside a nested state (an unclosed
    /// string, comment or bracket).
    pub fn is_unterminated(&self) -> bool {
        self.stack.depth() > 1
    }

    /// The state that was active when input ran out.
    pub fn final_state(&self) -> Option<&str> {
        self.stack.top()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Scanning,
    Finished,
    Failed,
}

/// Stacks held at the current cursor since it last moved.
#[derive(Clone, Debug, Default)]
struct ZeroWidthGuard {
    at: usize,
    seen: Vec<Stack>,
}

impl ZeroWidthGuard {
    /// Record a zero-width transition `before -> after` at `cursor`.
    ///
    /// Returns the number of zero-width steps taken here, or `None` if
    /// `after` was already held at this position.
    fn record(&mut self, cursor: usize, before: &Stack, after: &Stack) -> Option<usize> {
        if self.seen.is_empty() || self.at != cursor {
            self.seen.clear();
            self.at = cursor;
            self.seen.push(before.clone());
        }
        if self.seen.contains(after) {
            return None;
        }
        self.seen.push(after.clone());
        Some(self.seen.len() - 1)
    }

    fn clear(&mut self) {
        self.seen.clear();
    }
}

/// Incremental, pull-based scanner over one source.
pub struct Scanner<'g, 'src> {
    grammar: &'g Grammar,
    source: &'src str,
    cursor: usize,
    stack: Stack,
    pending: VecDeque<Token<'src>>,
    config: ScanConfig,
    zero_width: ZeroWidthGuard,
    phase: Phase,
}

impl<'g, 'src> Scanner<'g, 'src> {
    /// Start scanning `source` in the grammar's root state.
    pub fn new(grammar: &'g Grammar, source: &'src str) -> Self {
        Self::with_config(grammar, source, ScanConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar, source: &'src str, config: ScanConfig) -> Self {
        let mut stack = Stack::new();
        stack.push(grammar.root());
        Scanner {
            grammar,
            source,
            cursor: 0,
            stack,
            pending: VecDeque::new(),
            config,
            zero_width: ZeroWidthGuard::default(),
            phase: Phase::Scanning,
        }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Byte offset of the next unscanned character.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current stack depth; never zero.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The state stack, root first.
    pub fn stack(&self) -> &[StateId] {
        &self.stack
    }

    /// The state stack by name, root first.
    pub fn stack_trace(&self) -> StackTrace {
        StackTrace::new(
            self.stack
                .iter()
                .map(|&id| self.grammar.state(id).name().to_owned())
                .collect(),
        )
    }

    /// Returns `true` once no further step will be taken, either because
    /// input ran out or because the scan failed.
    pub fn is_finished(&self) -> bool {
        self.phase != Phase::Scanning
    }

    /// Take one step.
    ///
    /// Tokens produced by the step are queued for the iterator. Once the
    /// scanner is finished or has failed, this returns [`Step::Finished`].
    pub fn advance(&mut self) -> Result<Step, ScanError> {
        if self.phase != Phase::Scanning {
            return Ok(Step::Finished);
        }
        if u32::try_from(self.source.len()).is_err() {
            let len = self.source.len();
            return Err(self.fail(|position, stack| ScanError::SourceTooLarge {
                position,
                len,
                stack,
            }));
        }
        if self.cursor >= self.source.len() {
            self.phase = Phase::Finished;
            if self.config.emit_eof {
                let end = offset(self.source.len());
                self.pending
                    .push_back(Token::new(TokenKind::Eof, Span::point(end), ""));
            }
            trace!(depth = self.stack.len(), "end of input");
            return Ok(Step::Finished);
        }

        let grammar = self.grammar;
        let state = self.top();
        for entry in grammar.rules_view(state) {
            match entry.rule {
                Rule::Token {
                    pattern,
                    action,
                    stack,
                } => {
                    let Some(m) = pattern.match_at(self.source, self.cursor) else {
                        continue;
                    };
                    if m.is_empty() {
                        continue;
                    }
                    trace!(
                        state = grammar.state(state).name(),
                        rule = %entry.location(grammar),
                        cursor = self.cursor,
                        len = m.len(),
                        "rule matched"
                    );
                    let tokens = self.split(action, &m, &entry)?;
                    self.apply(*stack, &entry)?;
                    let count = tokens.len();
                    self.pending.extend(tokens);
                    self.cursor = m.range.end;
                    self.zero_width.clear();
                    return Ok(Step::Consumed { tokens: count });
                }
                Rule::Default(stack) => {
                    trace!(
                        state = grammar.state(state).name(),
                        rule = %entry.location(grammar),
                        cursor = self.cursor,
                        "default rule"
                    );
                    let before = self.stack.clone();
                    self.apply(*stack, &entry)?;
                    let cursor = self.cursor;
                    let limit = self.config.max_zero_width_steps;
                    match self.zero_width.record(cursor, &before, &self.stack) {
                        Some(steps) if steps <= limit => return Ok(Step::ZeroWidth),
                        Some(steps) => return Err(self.zero_width_loop(steps)),
                        None => {
                            let steps = self.zero_width.seen.len();
                            return Err(self.zero_width_loop(steps));
                        }
                    }
                }
                // Expanded by the view, never yielded.
                Rule::Include { .. } => {}
            }
        }

        let name = grammar.state(state).name().to_owned();
        Err(self.fail(|position, stack| ScanError::NoMatch {
            position,
            state: name,
            stack,
        }))
    }

    /// Drain the scanner into a token list.
    #[tracing::instrument(level = "debug", skip_all, fields(grammar = self.grammar.name(), len = self.source.len()))]
    pub fn tokenize(mut self) -> Result<ScanOutput<'src>, ScanError> {
        let mut tokens = Vec::new();
        for token in self.by_ref() {
            tokens.push(token?);
        }
        debug!(tokens = tokens.len(), depth = self.stack.len(), "scan complete");
        Ok(ScanOutput {
            tokens,
            stack: self.stack_trace(),
        })
    }

    fn top(&self) -> StateId {
        // The stack is never empty: pops at depth 1 fail before mutating.
        self.stack.last().copied().unwrap_or(self.grammar.root())
    }

    /// Turn a match into tokens without touching scanner state.
    fn split(
        &mut self,
        action: &Action,
        m: &PatternMatch,
        entry: &RuleEntry<'_>,
    ) -> Result<SmallVec<[Token<'src>; 4]>, ScanError> {
        let mut tokens = SmallVec::new();
        match action {
            Action::Emit(kind) => tokens.push(self.token(*kind, m.range.start, m.range.end)),
            Action::EmitGroups(kinds) => {
                let mut at = m.range.start;
                for (kind, group) in kinds.iter().zip(m.groups()) {
                    let Some(range) = group.as_ref().filter(|r| !r.is_empty()) else {
                        continue;
                    };
                    if range.start != at {
                        return Err(self.uncovered(m, entry));
                    }
                    tokens.push(self.token(*kind, range.start, range.end));
                    at = range.end;
                }
                if at != m.range.end {
                    return Err(self.uncovered(m, entry));
                }
            }
        }
        Ok(tokens)
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token<'src> {
        Token::new(
            kind,
            Span::new(offset(start), offset(end)),
            &self.source[start..end],
        )
    }

    fn apply(&mut self, op: StackOp, entry: &RuleEntry<'_>) -> Result<(), ScanError> {
        match op {
            StackOp::None => {}
            StackOp::Push(target) => {
                self.stack.push(target);
                debug!(
                    state = self.grammar.state(target).name(),
                    depth = self.stack.len(),
                    cursor = self.cursor,
                    "push"
                );
            }
            StackOp::Pop | StackOp::Goto(_) => {
                if self.stack.len() <= 1 {
                    let rule = entry.location(self.grammar);
                    return Err(self.fail(|position, stack| ScanError::PopAtRoot {
                        position,
                        rule,
                        stack,
                    }));
                }
                if let Some(left) = self.stack.pop() {
                    debug!(
                        state = self.grammar.state(left).name(),
                        depth = self.stack.len(),
                        cursor = self.cursor,
                        "pop"
                    );
                }
                if let StackOp::Goto(target) = op {
                    self.stack.push(target);
                    debug!(
                        state = self.grammar.state(target).name(),
                        depth = self.stack.len(),
                        "goto"
                    );
                }
            }
        }
        Ok(())
    }

    fn uncovered(&mut self, m: &PatternMatch, entry: &RuleEntry<'_>) -> ScanError {
        let rule = entry.location(self.grammar);
        let span = Span::new(offset(m.range.start), offset(m.range.end));
        self.fail(|position, stack| ScanError::UncoveredMatch {
            position,
            rule,
            span,
            stack,
        })
    }

    fn zero_width_loop(&mut self, steps: usize) -> ScanError {
        self.fail(|position, stack| ScanError::ZeroWidthLoop {
            position,
            steps,
            stack,
        })
    }

    /// Mark the scanner failed and build the error at the cursor.
    fn fail(&mut self, build: impl FnOnce(Position, StackTrace) -> ScanError) -> ScanError {
        self.phase = Phase::Failed;
        self.pending.clear();
        let position = LineIndex::new(self.source).position(offset(self.cursor));
        let err = build(position, self.stack_trace());
        debug!(error = %err, "scan failed");
        err
    }
}

impl<'src> Iterator for Scanner<'_, 'src> {
    type Item = Result<Token<'src>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.phase != Phase::Scanning {
                return None;
            }
            if let Err(err) = self.advance() {
                return Some(Err(err));
            }
        }
    }
}

impl FusedIterator for Scanner<'_, '_> {}

/// Byte offset as a span offset. Sources are checked to fit `u32` before
/// scanning begins.
#[inline]
fn offset(at: usize) -> u32 {
    u32::try_from(at).unwrap_or(u32::MAX)
}
