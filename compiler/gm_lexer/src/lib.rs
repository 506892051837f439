//! Lexer for the GM notation.
//!
//! GM mixes declarations (`:name:`), quantified temporaries (`∀x:`),
//! set-algebra operators, subscripts and several comment forms, including
//! block comments that embed fenced GM code. [`GmLexer`] turns GM source
//! into classified tokens using the generic scanner from `gm_lexer_core`.
//!
//! ```
//! use gm_lexer::{GmLexer, KeywordKind, TokenKind};
//!
//! let lexer = GmLexer::new()?;
//! let output = lexer.tokenize(":set: a ∪ b")?;
//! assert_eq!(output.tokens[0].kind, TokenKind::Keyword(KeywordKind::Declaration));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod diagnostic;
mod grammar;
mod language;

use std::sync::Once;

use rayon::prelude::*;

pub use diagnostic::render_scan_error;
pub use gm_lexer_core::{
    CommentKind, GenericKind, Grammar, GrammarError, KeywordKind, LineIndex, NameKind, Position,
    ScanConfig, ScanError, ScanOutput, Scanner, Span, StackTrace, StringKind, Token, TokenKind,
};
pub use grammar::GmOptions;
pub use language::{LanguageInfo, LANGUAGE};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for lexer diagnostics.
///
/// Does nothing unless `RUST_LOG` is set; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// A compiled GM grammar plus scan settings.
///
/// Cheap to share: scans borrow the grammar, so one lexer serves any number
/// of threads.
#[derive(Clone, Debug)]
pub struct GmLexer {
    grammar: Grammar,
    config: ScanConfig,
}

impl GmLexer {
    /// The GM lexer with default options.
    pub fn new() -> Result<Self, GrammarError> {
        Self::with_options(GmOptions::default())
    }

    pub fn with_options(options: GmOptions) -> Result<Self, GrammarError> {
        Ok(GmLexer {
            grammar: grammar::build(options)?,
            config: ScanConfig::default(),
        })
    }

    /// Replace the scan settings used by [`GmLexer::tokenize`] and
    /// [`GmLexer::scanner`].
    #[must_use]
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// A lazy scanner over `source`.
    pub fn scanner<'a, 'src>(&'a self, source: &'src str) -> Scanner<'a, 'src> {
        Scanner::with_config(&self.grammar, source, self.config)
    }

    /// Lex `source` completely.
    pub fn tokenize<'src>(&self, source: &'src str) -> Result<ScanOutput<'src>, ScanError> {
        self.scanner(source).tokenize()
    }

    /// Lex independent sources, in parallel when there is more than one.
    ///
    /// Results are in input order and identical to calling
    /// [`GmLexer::tokenize`] on each source in turn.
    #[tracing::instrument(level = "debug", skip_all, fields(sources = sources.len()))]
    pub fn tokenize_many<'src, S>(&self, sources: &'src [S]) -> Vec<Result<ScanOutput<'src>, ScanError>>
    where
        S: AsRef<str> + Sync,
    {
        if sources.len() <= 1 {
            sources.iter().map(|s| self.tokenize(s.as_ref())).collect()
        } else {
            sources
                .par_iter()
                .map(|s| self.tokenize(s.as_ref()))
                .collect()
        }
    }
}
