//! Out-of-band failures: grammar defects found at build time and scan
//! failures.
//!
//! Neither is ever turned into a token. Input the grammar considers invalid
//! is reported in-band through [`TokenKind::Error`](crate::TokenKind::Error)
//! tokens; these types are for grammars that cannot make progress.

use std::fmt;

use crate::pattern::PatternError;
use crate::rule::RuleLocation;
use crate::span::{Position, Span};

/// A grammar definition was rejected by [`GrammarBuilder::build`](crate::GrammarBuilder::build).
#[derive(Clone, Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("root state `{0}` is not declared")]
    UndeclaredRoot(String),

    #[error("state `{0}` is declared more than once")]
    DuplicateState(String),

    #[error("{location} refers to undeclared state `{target}`")]
    UndeclaredTarget {
        location: RuleLocation,
        target: String,
    },

    #[error("{location}: {source}")]
    InvalidPattern {
        location: RuleLocation,
        #[source]
        source: PatternError,
    },

    #[error("{location} names {kinds} group kinds but its pattern has {groups} capture groups")]
    GroupArity {
        location: RuleLocation,
        kinds: usize,
        groups: usize,
    },

    #[error("{0} includes its own state")]
    SelfInclude(RuleLocation),

    /// Includes only splice in another state's rules; they cannot move the
    /// stack themselves.
    #[error("{0} is an include with a stack operation")]
    IncludeStackOp(RuleLocation),

    /// A default rule with no stack op can never make progress.
    #[error("{0} is a default rule without a stack operation")]
    InertDefault(RuleLocation),

    #[error("grammar declares more states than fit a state id")]
    TooManyStates,
}

/// The state stack at the point of a failure, bottom (root) first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StackTrace(Vec<String>);

impl StackTrace {
    pub fn new(states: Vec<String>) -> Self {
        StackTrace(states)
    }

    /// State names, root first.
    pub fn states(&self) -> &[String] {
        &self.0
    }

    /// The innermost (current) state.
    pub fn top(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, state) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            f.write_str(state)?;
        }
        Ok(())
    }
}

/// A scan could not continue.
///
/// Every variant records where the scanner stood and the state stack at that
/// moment. The scanner is fused after returning one of these.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// No rule of the current state (includes expanded) matches at the cursor.
    #[error("no rule of state `{state}` matches at {position} (stack: {stack})")]
    NoMatch {
        position: Position,
        state: String,
        stack: StackTrace,
    },

    /// A `Pop` or `Goto` fired with only the root state on the stack.
    #[error("{rule} pops the root state at {position}")]
    PopAtRoot {
        position: Position,
        rule: RuleLocation,
        stack: StackTrace,
    },

    /// Zero-width rules cycled without consuming input.
    #[error("zero-width rules made {steps} steps without progress at {position} (stack: {stack})")]
    ZeroWidthLoop {
        position: Position,
        steps: usize,
        stack: StackTrace,
    },

    /// Capture groups of a matched rule leave a gap or overlap within the match.
    #[error("capture groups of {rule} do not tile the match {span} at {position}")]
    UncoveredMatch {
        position: Position,
        rule: RuleLocation,
        span: Span,
        stack: StackTrace,
    },

    /// Offsets are 32-bit; longer sources are refused before scanning.
    #[error("source of {len} bytes is too large to scan")]
    SourceTooLarge {
        position: Position,
        len: usize,
        stack: StackTrace,
    },
}

impl ScanError {
    /// Where the scanner stood when it failed.
    pub fn position(&self) -> Position {
        match self {
            ScanError::NoMatch { position, .. }
            | ScanError::PopAtRoot { position, .. }
            | ScanError::ZeroWidthLoop { position, .. }
            | ScanError::UncoveredMatch { position, .. }
            | ScanError::SourceTooLarge { position, .. } => *position,
        }
    }

    /// The state stack at the failure.
    pub fn stack(&self) -> &StackTrace {
        match self {
            ScanError::NoMatch { stack, .. }
            | ScanError::PopAtRoot { stack, .. }
            | ScanError::ZeroWidthLoop { stack, .. }
            | ScanError::UncoveredMatch { stack, .. }
            | ScanError::SourceTooLarge { stack, .. } => stack,
        }
    }

    /// The offending rule, for failures caused by one.
    pub fn rule(&self) -> Option<&RuleLocation> {
        match self {
            ScanError::PopAtRoot { rule, .. } | ScanError::UncoveredMatch { rule, .. } => {
                Some(rule)
            }
            ScanError::NoMatch { .. }
            | ScanError::ZeroWidthLoop { .. }
            | ScanError::SourceTooLarge { .. } => None,
        }
    }

    /// Short, stable label for the failure class.
    pub fn label(&self) -> &'static str {
        match self {
            ScanError::NoMatch { .. } => "no rule matches here",
            ScanError::PopAtRoot { .. } => "pop at root state",
            ScanError::ZeroWidthLoop { .. } => "zero-width loop",
            ScanError::UncoveredMatch { .. } => "capture groups do not cover match",
            ScanError::SourceTooLarge { .. } => "source too large",
        }
    }
}
