//! Grammar rules and their actions.
//!
//! Rules come in two shapes sharing one enum: [`RuleDef`] as written by
//! a grammar author (state references by name, uncompiled patterns), and the
//! compiled [`Rule`] stored in a [`Grammar`](crate::Grammar), where state
//! references are resolved [`StateId`]s.

use std::fmt;

use crate::grammar::StateId;
use crate::pattern::{CompiledPattern, Pattern};
use crate::token::TokenKind;

/// What a matching token rule emits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// The whole match becomes one token.
    Emit(TokenKind),
    /// Each capture group becomes its own token, in group order.
    ///
    /// The groups must tile the whole match. Groups that did not participate
    /// or matched nothing produce no token.
    EmitGroups(Box<[TokenKind]>),
}

/// State-stack transition performed after a rule matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackOp<S = StateId> {
    #[default]
    None,
    /// Enter a sub-context.
    Push(S),
    /// Leave the current context. Popping the last state is a grammar defect.
    Pop,
    /// Pop, then push.
    Goto(S),
}

impl<S> StackOp<S> {
    pub(crate) fn try_map<T, E>(self, f: impl FnOnce(S) -> Result<T, E>) -> Result<StackOp<T>, E> {
        Ok(match self {
            StackOp::None => StackOp::None,
            StackOp::Push(s) => StackOp::Push(f(s)?),
            StackOp::Pop => StackOp::Pop,
            StackOp::Goto(s) => StackOp::Goto(f(s)?),
        })
    }
}

/// One entry of a state's ordered rule list.
///
/// `P` is the pattern representation and `S` the state reference; see the
/// module docs for the two instantiations.
#[derive(Clone, Debug)]
pub enum Rule<S = StateId, P = CompiledPattern> {
    /// Match `pattern` at the cursor, emit per `action`, then apply `stack`.
    Token {
        pattern: P,
        action: Action,
        stack: StackOp<S>,
    },
    /// Try every rule of another state here, in place.
    ///
    /// `stack` is only ever set on a [`RuleDef`] by mistake; building the
    /// grammar rejects it, so compiled includes always carry
    /// [`StackOp::None`].
    Include { state: S, stack: StackOp<S> },
    /// Zero-width fallback: always matches, consumes nothing, only applies
    /// its stack op.
    Default(StackOp<S>),
}

/// A rule as written in a grammar definition.
pub type RuleDef = Rule<String, Pattern>;

impl RuleDef {
    /// Emit the whole match as one token of `kind`.
    pub fn token(pattern: impl Into<Pattern>, kind: TokenKind) -> Self {
        Rule::Token {
            pattern: pattern.into(),
            action: Action::Emit(kind),
            stack: StackOp::None,
        }
    }

    /// Emit each capture group as its own token.
    pub fn groups(pattern: impl Into<Pattern>, kinds: impl IntoIterator<Item = TokenKind>) -> Self {
        Rule::Token {
            pattern: pattern.into(),
            action: Action::EmitGroups(kinds.into_iter().collect()),
            stack: StackOp::None,
        }
    }

    pub fn include(state: impl Into<String>) -> Self {
        Rule::Include {
            state: state.into(),
            stack: StackOp::None,
        }
    }

    /// Zero-width fallback performing `stack`.
    pub fn default_to(stack: StackOp<String>) -> Self {
        Rule::Default(stack)
    }

    /// Zero-width fallback that leaves the current state.
    pub fn default_pop() -> Self {
        Rule::Default(StackOp::Pop)
    }

    /// Push `state` after emitting.
    #[must_use]
    pub fn push(self, state: impl Into<String>) -> Self {
        self.with_stack(StackOp::Push(state.into()))
    }

    /// Pop after emitting.
    #[must_use]
    pub fn pop(self) -> Self {
        self.with_stack(StackOp::Pop)
    }

    /// Replace the current state with `state` after emitting.
    #[must_use]
    pub fn goto(self, state: impl Into<String>) -> Self {
        self.with_stack(StackOp::Goto(state.into()))
    }

    fn with_stack(self, op: StackOp<String>) -> Self {
        match self {
            Rule::Token {
                pattern, action, ..
            } => Rule::Token {
                pattern,
                action,
                stack: op,
            },
            Rule::Default(_) => Rule::Default(op),
            Rule::Include { state, .. } => Rule::Include { state, stack: op },
        }
    }
}

/// Where a rule sits in its grammar: owning state and declared index.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleLocation {
    pub state: String,
    pub index: usize,
}

impl fmt::Display for RuleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule #{} of state `{}`", self.index, self.state)
    }
}
