//! Generic stack-based scanner driven by declarative state grammars.
//!
//! A [`Grammar`] is a set of named [`State`]s, each an ordered list of
//! [`Rule`]s. A [`Scanner`] keeps a stack of states, matches the rules of the
//! top state at the cursor (first match wins), emits classified [`Token`]s and
//! pushes, pops or replaces states as rules direct. The tokens of a run
//! partition the input exactly.
//!
//! This crate has no knowledge of any particular language. Grammars are
//! defined with [`GrammarBuilder`], [`RuleDef`] and [`Pattern`]:
//!
//! ```
//! use gm_lexer_core::{Grammar, RuleDef, Scanner, StringKind, TokenKind};
//!
//! let grammar = Grammar::builder("root")
//!     .state("root", [
//!         RuleDef::token("\"", TokenKind::String(StringKind::Double)).push("string"),
//!         RuleDef::token("[^\"]+", TokenKind::Text),
//!     ])
//!     .state("string", [
//!         RuleDef::token("[^\"]+", TokenKind::String(StringKind::Plain)),
//!         RuleDef::token("\"", TokenKind::String(StringKind::Double)).pop(),
//!     ])
//!     .build()?;
//!
//! let output = Scanner::new(&grammar, "say \"hi\"").tokenize()?;
//! assert_eq!(output.tokens.len(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod grammar;
mod pattern;
mod rule;
mod scanner;
mod span;
mod token;

pub use error::{GrammarError, ScanError, StackTrace};
pub use grammar::{Grammar, GrammarBuilder, RuleEntry, RulesView, State, StateId};
pub use pattern::{CompiledPattern, Pattern, PatternError, PatternMatch, PatternPart};
pub use rule::{Action, Rule, RuleDef, RuleLocation, StackOp};
pub use scanner::{ScanConfig, ScanOutput, Scanner, Step};
pub use span::{LineIndex, Position, Span};
pub use token::{
    CommentKind, GenericKind, KeywordKind, NameKind, StringKind, Token, TokenKind,
};
