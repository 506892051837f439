//! Property-based tests for the GM lexer.
//!
//! Inputs are drawn from the characters GM gives meaning to, so that strings,
//! comments, fences, subscripts and temporaries open and close in random
//! combinations. Every such input must:
//! 1. scan without an out-of-band failure (every GM state has a catch-all),
//! 2. produce tokens that partition the input exactly,
//! 3. scan identically on every run.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use gm_lexer::{GmLexer, GmOptions, ScanOutput};
use proptest::prelude::*;

/// Snippets with structure, mixed with single characters.
fn gm_source() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        Just(":".to_owned()),
        Just("```".to_owned()),
        Just("; todo ".to_owned()),
        Just("∀x:".to_owned()),
        Just("■[".to_owned()),
        Just("\\\"".to_owned()),
        prop::string::string_regex(r#"[a-z0-9 \t\n\r:;.,\[\](){}"`\\@■&∈∪⇒∀∃!¬]{1,4}"#)
            .expect("valid regex"),
    ];
    prop::collection::vec(piece, 0..24).prop_map(|pieces| pieces.concat())
}

fn assert_partition(source: &str, output: &ScanOutput<'_>) {
    let mut at = 0usize;
    for token in &output.tokens {
        let range = token.span.to_range();
        assert_eq!(range.start, at, "gap or overlap before {token:?} in {source:?}");
        assert!(!range.is_empty(), "empty token {token:?} in {source:?}");
        assert_eq!(&source[range.clone()], token.text);
        at = range.end;
    }
    assert_eq!(at, source.len(), "tokens stop short in {source:?}");
}

proptest! {
    #[test]
    fn tokens_partition_input(source in gm_source()) {
        let lexer = GmLexer::new().expect("GM grammar builds");
        let output = lexer.tokenize(&source).expect("GM scans any input");
        assert_partition(&source, &output);
    }

    #[test]
    fn annotated_tokens_partition_input(source in gm_source()) {
        let lexer = GmLexer::with_options(GmOptions::default().with_annotations(true))
            .expect("GM grammar builds");
        let output = lexer.tokenize(&source).expect("GM scans any input");
        assert_partition(&source, &output);
    }

    #[test]
    fn scanning_is_deterministic(source in gm_source()) {
        let lexer = GmLexer::new().expect("GM grammar builds");
        let first = lexer.tokenize(&source).expect("GM scans any input");
        let second = lexer.tokenize(&source).expect("GM scans any input");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn parallel_equals_sequential(sources in prop::collection::vec(gm_source(), 0..8)) {
        let lexer = GmLexer::new().expect("GM grammar builds");
        let parallel = lexer.tokenize_many(&sources);
        let sequential: Vec<_> = sources.iter().map(|s| lexer.tokenize(s)).collect();
        prop_assert_eq!(parallel, sequential);
    }
}
