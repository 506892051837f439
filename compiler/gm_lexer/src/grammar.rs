//! The GM grammar.
//!
//! States are listed in priority order within each rule list. Every state
//! that can see arbitrary GM text ends with `fallback`, which classifies any
//! otherwise unmatched character as an error token, so scanning GM never
//! fails out-of-band.
//!
//! # Regions
//!
//! | Opened by | State | Closed by |
//! |-----------|-------|-----------|
//! | `"` | `line-strings` | `"` or newline |
//! | `` ` `` | `pre-strings` | `` ` `` |
//! | `;` | `line-comments` | newline |
//! | `[` at input start or after `■ ( ) { , : .` | `block-comments` | `]` |
//! | ```` ``` ```` inside a block comment | `pre-comments` | ```` ``` ```` |
//! | `[` elsewhere | `subscripts` | `]` |
//! | quantifier symbols `∀ ∃ ! ¬` | `temporaries` | `:` |
//!
//! `pre-comments`, `subscripts` and `temporaries` lex their contents as full
//! GM, so regions nest arbitrarily.

use gm_lexer_core::{
    CommentKind, GenericKind, Grammar, GrammarError, KeywordKind, NameKind, Pattern, RuleDef,
    StringKind, TokenKind,
};

/// Characters that end an identifier run.
const NAME_STOP: &str = r#".\s()\[\],:;{}&|"`∀∃!¬@■"#;
/// Quantifier symbols.
const QUANTIFIERS: &str = "∀∃!¬";

const COMMENT: TokenKind = TokenKind::Comment(CommentKind::Single);
const MULTILINE: TokenKind = TokenKind::Comment(CommentKind::Multiline);
const DECLARATION: TokenKind = TokenKind::Keyword(KeywordKind::Declaration);

/// Grammar switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GmOptions {
    /// Classify annotation markers at the start of line comments
    /// (`; todo ...`, `; ! ...`) as [`GenericKind`] tokens.
    pub annotations: bool,
}

impl GmOptions {
    #[must_use]
    pub fn with_annotations(mut self, annotations: bool) -> Self {
        self.annotations = annotations;
        self
    }
}

/// Build the GM grammar.
pub fn build(options: GmOptions) -> Result<Grammar, GrammarError> {
    Grammar::builder("root")
        .name("gm")
        .state(
            "root",
            [
                RuleDef::token(Pattern::new(":").at_input_start(), DECLARATION),
                RuleDef::include("gmlang"),
                RuleDef::include("fallback"),
            ],
        )
        .state(
            "gmlang",
            [
                RuleDef::include("strings"),
                RuleDef::include("comments"),
                RuleDef::include("invalids"),
                RuleDef::include("brackets"),
                RuleDef::include("keywords"),
                RuleDef::include("quantities"),
                RuleDef::include("whitespaces"),
            ],
        )
        .state(
            "fallback",
            [
                RuleDef::token(r"\n", TokenKind::Whitespace),
                RuleDef::token(r"(?s:.)", TokenKind::Error),
            ],
        )
        .state(
            "whitespaces",
            [
                RuleDef::token(Pattern::new(r"[ \r\n]").not_followed_by(":"), TokenKind::Whitespace),
                RuleDef::token(
                    Pattern::new(r"\t+").preceded_by(r"\n").not_followed_by(":"),
                    TokenKind::Whitespace,
                ),
            ],
        )
        .state("strings", strings())
        .state("line-strings", line_strings())
        .state("pre-strings", pre_strings())
        .state("comments", comments())
        .state("line-comments", line_comments(options))
        .state("block-comments", block_comments())
        .state(
            "pre-comments",
            [
                RuleDef::token("```", MULTILINE).pop(),
                RuleDef::include("gmlang"),
                RuleDef::include("fallback"),
            ],
        )
        .state("invalids", invalids())
        .state(
            "brackets",
            [RuleDef::token(
                Pattern::new(r"\s*\[").not_preceded_by("[,■({]"),
                TokenKind::Punctuation,
            )
            .push("subscripts")],
        )
        .state(
            "subscripts",
            [
                RuleDef::token(r"\]", TokenKind::Punctuation).pop(),
                RuleDef::include("gmlang"),
                RuleDef::include("fallback"),
            ],
        )
        .state("keywords", keywords())
        .state("quantities", quantities())
        .state(
            "temporaries",
            [
                RuleDef::token(":", DECLARATION).pop(),
                RuleDef::include("gmlang"),
                RuleDef::include("fallback"),
            ],
        )
        .build()
}

fn strings() -> Vec<RuleDef> {
    vec![
        RuleDef::token("\"", TokenKind::String(StringKind::Double)).push("line-strings"),
        RuleDef::token(
            Pattern::new("`").not_preceded_by("`").not_followed_by("`"),
            TokenKind::String(StringKind::Plain),
        )
        .push("pre-strings"),
    ]
}

fn line_strings() -> Vec<RuleDef> {
    let string = TokenKind::String(StringKind::Plain);
    vec![
        RuleDef::token(r"\\(?s:.)", TokenKind::String(StringKind::Escape)),
        RuleDef::token(r#"[^"\n\\]+"#, string),
        // Backslash as the very last character.
        RuleDef::token(r"\\", string),
        RuleDef::token(r#"["\n]"#, TokenKind::String(StringKind::Double)).pop(),
    ]
}

fn pre_strings() -> Vec<RuleDef> {
    let string = TokenKind::String(StringKind::Plain);
    vec![
        RuleDef::token("[^`]+", string),
        RuleDef::token("`", string).pop(),
    ]
}

fn comments() -> Vec<RuleDef> {
    let open = [TokenKind::Whitespace, MULTILINE];
    vec![
        RuleDef::token(";", COMMENT).push("line-comments"),
        RuleDef::groups(Pattern::new(r"(\s*)(\[)").at_input_start(), open).push("block-comments"),
        RuleDef::groups(Pattern::new(r"(\s*)(\[)").preceded_by("[■(){,:.]"), open)
            .push("block-comments"),
    ]
}

fn line_comments(options: GmOptions) -> Vec<RuleDef> {
    let mut rules = Vec::new();
    if options.annotations {
        rules.extend(annotations());
    }
    rules.extend([
        RuleDef::token(r"[^;\n]+", COMMENT),
        RuleDef::token(";", COMMENT),
        // A block comment on the next line continues the comment.
        RuleDef::groups(r"(\n\s*)(\[)", [TokenKind::Whitespace, MULTILINE]).goto("block-comments"),
        RuleDef::token(r"\n", TokenKind::Whitespace).pop(),
    ]);
    rules
}

/// Marker rules tried right after a `;`.
fn annotations() -> Vec<RuleDef> {
    [
        (r"\*|note", GenericKind::Emph),
        (r"\+|todo", GenericKind::Inserted),
        (r"!|warn", GenericKind::Error),
        (r"\?|wait", GenericKind::Traceback),
    ]
    .into_iter()
    .map(|(marker, kind)| {
        RuleDef::groups(
            Pattern::new(format!(r"([ \t]*)((?i:{marker})[^;\n]*)")).preceded_by(";"),
            [TokenKind::Comment(CommentKind::Special), TokenKind::Generic(kind)],
        )
    })
    .collect()
}

fn block_comments() -> Vec<RuleDef> {
    vec![
        RuleDef::token("```", TokenKind::Text).push("pre-comments"),
        RuleDef::groups(r"(\])(\s*)(\[)", [MULTILINE, TokenKind::Whitespace, MULTILINE]),
        RuleDef::token(r"\]", MULTILINE).pop(),
        RuleDef::token(r"[^\]`]+", MULTILINE),
        RuleDef::token("`", MULTILINE),
    ]
}

fn invalids() -> Vec<RuleDef> {
    vec![
        RuleDef::token(Pattern::new(":").preceded_by(r"[\s:@■,(\[]"), TokenKind::Error),
        RuleDef::token(format!(r"\w[{QUANTIFIERS}]"), TokenKind::Error),
        RuleDef::token(Pattern::new(r"\s*\.").at_input_start(), TokenKind::Error),
        RuleDef::token(Pattern::new(r"\s*\.").preceded_by(r"[\n,.]"), TokenKind::Error),
        RuleDef::token(r"[^\t\n]\t+", TokenKind::Error),
    ]
}

fn keywords() -> Vec<RuleDef> {
    vec![
        RuleDef::token(
            Pattern::new("⇒|⇔|⇐").not_followed_by(":"),
            TokenKind::Keyword(KeywordKind::Plain),
        ),
        RuleDef::token(Pattern::new(":").not_followed_by(":"), DECLARATION),
        RuleDef::token(Pattern::new(r"\.").not_followed_by(r"\."), TokenKind::Punctuation),
        RuleDef::token(r"[{}()\[\]@■,]", TokenKind::Punctuation),
        RuleDef::token("[&∈∋⊆⊇⊂⊃=∧∨∪∩∘]", TokenKind::Operator),
    ]
}

fn quantities() -> Vec<RuleDef> {
    vec![
        RuleDef::token(
            Pattern::new(format!("[{QUANTIFIERS}]+")).not_followed_by("[:.]"),
            TokenKind::Keyword(KeywordKind::Type),
        )
        .push("temporaries"),
        RuleDef::token(format!("[^{NAME_STOP}]+"), TokenKind::Name(NameKind::Plain)),
    ]
}

#[cfg(test)]
mod tests;
