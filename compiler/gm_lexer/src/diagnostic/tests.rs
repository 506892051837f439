use gm_lexer_core::{Position, RuleLocation, StackTrace};

use super::*;

fn stack(states: &[&str]) -> StackTrace {
    StackTrace::new(states.iter().map(|s| (*s).to_owned()).collect())
}

#[test]
fn report_points_at_failure() {
    let source = "ab?cd";
    let err = ScanError::NoMatch {
        position: Position {
            offset: 2,
            line: 1,
            column: 3,
        },
        state: "root".to_owned(),
        stack: stack(&["root"]),
    };
    let report = render_scan_error(&err, source);
    assert!(report.contains("no rule of state `root` matches at 1:3"), "{report}");
    assert!(report.contains("ab?cd"), "{report}");
    assert!(report.contains("no rule matches here"), "{report}");
    assert!(report.contains("state stack: root"), "{report}");
    // Uncoloured output carries no escape sequences.
    assert!(!report.contains('\u{1b}'), "{report}");
}

#[test]
fn report_names_offending_rule() {
    let err = ScanError::PopAtRoot {
        position: Position {
            offset: 1,
            line: 1,
            column: 2,
        },
        rule: RuleLocation {
            state: "subscripts".to_owned(),
            index: 0,
        },
        stack: stack(&["root"]),
    };
    let report = render_scan_error(&err, "x]");
    assert!(report.contains("raised by rule #0 of state `subscripts`"), "{report}");
}

#[test]
fn range_covers_one_character() {
    let err = ScanError::NoMatch {
        position: Position {
            offset: 0,
            line: 1,
            column: 1,
        },
        state: "root".to_owned(),
        stack: stack(&["root"]),
    };
    assert_eq!(error_range(&err, "∀x"), 0..3);
    assert_eq!(error_range(&err, ""), 0..0);
}
