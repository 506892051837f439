use gm_lexer_core::{ScanOutput, Scanner, Span, Token};
use pretty_assertions::assert_eq;

use super::*;

const NAME: TokenKind = TokenKind::Name(NameKind::Plain);
const WS: TokenKind = TokenKind::Whitespace;
const ERROR: TokenKind = TokenKind::Error;
const PUNCT: TokenKind = TokenKind::Punctuation;
const STRING: TokenKind = TokenKind::String(StringKind::Plain);
const QUOTE: TokenKind = TokenKind::String(StringKind::Double);
const TYPE: TokenKind = TokenKind::Keyword(KeywordKind::Type);

fn lex_with(options: GmOptions, source: &str) -> ScanOutput<'_> {
    let grammar = match build(options) {
        Ok(grammar) => grammar,
        Err(err) => panic!("GM grammar should build: {err}"),
    };
    match Scanner::new(&grammar, source).tokenize() {
        Ok(output) => output,
        Err(err) => panic!("GM scan of {source:?} failed: {err}"),
    }
}

fn lex(source: &str) -> ScanOutput<'_> {
    lex_with(GmOptions::default(), source)
}

fn pairs<'src>(tokens: &[Token<'src>]) -> Vec<(TokenKind, &'src str)> {
    tokens.iter().map(|t| (t.kind, t.text)).collect()
}

// === Worked example ===

#[test]
fn declaration_string_and_comment() {
    let output = lex(r#":a: "x\"y" ;c"#);
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (DECLARATION, ":"),
            (NAME, "a"),
            (DECLARATION, ":"),
            (WS, " "),
            (QUOTE, "\""),
            (STRING, "x"),
            (TokenKind::String(StringKind::Escape), r#"\""#),
            (STRING, "y"),
            (QUOTE, "\""),
            (WS, " "),
            (COMMENT, ";"),
            (COMMENT, "c"),
        ]
    );
    // The line comment is still open at end of input.
    assert_eq!(output.stack.depth(), 2);
    assert_eq!(output.final_state(), Some("line-comments"));
}

// === Declarations & errors ===

#[test]
fn doubled_colon_is_an_error_and_scanning_continues() {
    let output = lex("a::b");
    assert_eq!(
        pairs(&output.tokens),
        vec![(NAME, "a"), (ERROR, ":"), (ERROR, ":"), (NAME, "b")]
    );
    assert_eq!(output.tokens[1].span, Span::new(1, 2));
    assert_eq!(output.tokens[2].span, Span::new(2, 3));
}

#[test]
fn colon_at_input_start_wins_over_invalids() {
    let output = lex("::");
    assert_eq!(pairs(&output.tokens), vec![(DECLARATION, ":"), (ERROR, ":")]);
}

#[test]
fn space_before_colon_is_flagged() {
    let output = lex("a :b");
    assert_eq!(
        pairs(&output.tokens),
        vec![(NAME, "a"), (ERROR, " "), (ERROR, ":"), (NAME, "b")]
    );
}

#[test]
fn tabs() {
    assert_eq!(
        pairs(&lex("a\tb").tokens),
        vec![(ERROR, "a\t"), (NAME, "b")]
    );
    assert_eq!(
        pairs(&lex("\n\t\tb").tokens),
        vec![(WS, "\n"), (WS, "\t\t"), (NAME, "b")]
    );
}

#[test]
fn indent_before_colon_keeps_all_but_last_tab() {
    assert_eq!(
        pairs(&lex("a\n\t\t:b").tokens),
        vec![
            (NAME, "a"),
            (WS, "\n"),
            (WS, "\t"),
            (ERROR, "\t"),
            (ERROR, ":"),
            (NAME, "b"),
        ]
    );
}

#[test]
fn dots() {
    assert_eq!(pairs(&lex("a.b").tokens), vec![(NAME, "a"), (PUNCT, "."), (NAME, "b")]);
    assert_eq!(pairs(&lex(".a").tokens), vec![(ERROR, "."), (NAME, "a")]);
    assert_eq!(
        pairs(&lex("a..b").tokens),
        vec![(NAME, "a"), (ERROR, "."), (ERROR, "."), (NAME, "b")]
    );
}

// === Keywords & quantities ===

#[test]
fn operators_and_arrows() {
    let output = lex("a ∈ b ⇒ c");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (NAME, "a"),
            (WS, " "),
            (TokenKind::Operator, "∈"),
            (WS, " "),
            (NAME, "b"),
            (WS, " "),
            (TokenKind::Keyword(KeywordKind::Plain), "⇒"),
            (WS, " "),
            (NAME, "c"),
        ]
    );
}

#[test]
fn quantifier_opens_temporaries_until_colon() {
    let output = lex("∀x: y");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (TYPE, "∀"),
            (NAME, "x"),
            (DECLARATION, ":"),
            (WS, " "),
            (NAME, "y"),
        ]
    );
    assert!(!output.is_unterminated());
}

#[test]
fn misplaced_quantifiers() {
    assert_eq!(pairs(&lex("∀:").tokens), vec![(ERROR, "∀"), (DECLARATION, ":")]);
    assert_eq!(pairs(&lex("x∀").tokens), vec![(ERROR, "x∀")]);
}

#[test]
fn quantifier_run_before_colon_gives_up_its_last_symbol() {
    let output = lex("∀∀: a");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (TYPE, "∀"),
            (ERROR, "∀"),
            (DECLARATION, ":"),
            (WS, " "),
            (NAME, "a"),
        ]
    );
    assert!(!output.is_unterminated());
}

#[test]
fn quantifier_run_before_dot_gives_up_its_last_symbol() {
    let output = lex("¬∃.x");
    assert_eq!(
        pairs(&output.tokens),
        vec![(TYPE, "¬"), (ERROR, "∃"), (PUNCT, "."), (NAME, "x")]
    );
    assert_eq!(output.final_state(), Some("temporaries"));
}

// === Brackets ===

#[test]
fn nested_subscripts_net_back_to_root() {
    let output = lex("x[a[b]c]");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (NAME, "x"),
            (PUNCT, "["),
            (NAME, "a"),
            (PUNCT, "["),
            (NAME, "b"),
            (PUNCT, "]"),
            (NAME, "c"),
            (PUNCT, "]"),
        ]
    );
    assert_eq!(output.stack.states(), &["root".to_owned()]);
}

#[test]
fn leading_bracket_opens_block_comment() {
    let output = lex("[c] x");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (MULTILINE, "["),
            (MULTILINE, "c"),
            (MULTILINE, "]"),
            (WS, " "),
            (NAME, "x"),
        ]
    );
}

#[test]
fn bracket_after_box_is_a_comment() {
    let output = lex("■[x]");
    assert_eq!(
        pairs(&output.tokens),
        vec![(PUNCT, "■"), (MULTILINE, "["), (MULTILINE, "x"), (MULTILINE, "]")]
    );
}

// === Strings ===

#[test]
fn line_string_ends_at_newline() {
    let output = lex("\"ab\ncd");
    assert_eq!(
        pairs(&output.tokens),
        vec![(QUOTE, "\""), (STRING, "ab"), (QUOTE, "\n"), (NAME, "cd")]
    );
}

#[test]
fn pre_string() {
    let output = lex("`a \"b`");
    assert_eq!(
        pairs(&output.tokens),
        vec![(STRING, "`"), (STRING, "a \"b"), (STRING, "`")]
    );
}

#[test]
fn unterminated_regions_run_to_end() {
    let output = lex("\"abc");
    assert!(output.is_unterminated());
    assert_eq!(output.final_state(), Some("line-strings"));

    let output = lex("[abc");
    assert_eq!(output.final_state(), Some("block-comments"));

    let output = lex("x[a");
    assert_eq!(output.final_state(), Some("subscripts"));
}

// === Comments ===

#[test]
fn fenced_code_inside_block_comment() {
    let output = lex("[a ```\"s\" x[1]``` b]");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (MULTILINE, "["),
            (MULTILINE, "a "),
            (TokenKind::Text, "```"),
            (QUOTE, "\""),
            (STRING, "s"),
            (QUOTE, "\""),
            (WS, " "),
            (NAME, "x"),
            (PUNCT, "["),
            (NAME, "1"),
            (PUNCT, "]"),
            (MULTILINE, "```"),
            (MULTILINE, " b"),
            (MULTILINE, "]"),
        ]
    );
    assert!(!output.is_unterminated());
}

#[test]
fn adjacent_block_comments_chain() {
    let output = lex("[a] [b]");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (MULTILINE, "["),
            (MULTILINE, "a"),
            (MULTILINE, "]"),
            (WS, " "),
            (MULTILINE, "["),
            (MULTILINE, "b"),
            (MULTILINE, "]"),
        ]
    );
}

#[test]
fn line_comment_continues_into_block_comment() {
    let output = lex("; see\n  [more]");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (COMMENT, ";"),
            (COMMENT, " see"),
            (WS, "\n  "),
            (MULTILINE, "["),
            (MULTILINE, "more"),
            (MULTILINE, "]"),
        ]
    );
    assert_eq!(output.stack.depth(), 1);
}

#[test]
fn line_comment_ends_at_newline() {
    let output = lex("; a ; b\nx");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (COMMENT, ";"),
            (COMMENT, " a "),
            (COMMENT, ";"),
            (COMMENT, " b"),
            (WS, "\n"),
            (NAME, "x"),
        ]
    );
}

#[test]
fn annotations_are_off_by_default() {
    let output = lex("; todo fix");
    assert_eq!(pairs(&output.tokens), vec![(COMMENT, ";"), (COMMENT, " todo fix")]);
}

#[test]
fn annotation_markers() {
    let options = GmOptions::default().with_annotations(true);
    let special = TokenKind::Comment(CommentKind::Special);

    let output = lex_with(options, "; todo fix\n");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (COMMENT, ";"),
            (special, " "),
            (TokenKind::Generic(GenericKind::Inserted), "todo fix"),
            (WS, "\n"),
        ]
    );

    let output = lex_with(options, ";WARN: x");
    assert_eq!(
        pairs(&output.tokens),
        vec![(COMMENT, ";"), (TokenKind::Generic(GenericKind::Error), "WARN: x")]
    );

    let output = lex_with(options, "; ? later ;* seen");
    assert_eq!(
        pairs(&output.tokens),
        vec![
            (COMMENT, ";"),
            (special, " "),
            (TokenKind::Generic(GenericKind::Traceback), "? later "),
            (COMMENT, ";"),
            (TokenKind::Generic(GenericKind::Emph), "* seen"),
        ]
    );

    let output = lex_with(options, "; plain");
    assert_eq!(pairs(&output.tokens), vec![(COMMENT, ";"), (COMMENT, " plain")]);
}

// === Grammar shape ===

#[test]
fn every_region_state_is_declared() {
    let Ok(grammar) = build(GmOptions::default()) else {
        panic!("GM grammar should build");
    };
    for state in [
        "root",
        "gmlang",
        "fallback",
        "line-strings",
        "pre-strings",
        "line-comments",
        "block-comments",
        "pre-comments",
        "subscripts",
        "temporaries",
    ] {
        assert!(grammar.state_id(state).is_some(), "missing state {state}");
    }
    assert_eq!(grammar.name(), "gm");
}
