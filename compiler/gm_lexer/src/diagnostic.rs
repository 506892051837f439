//! Rendering of scan failures as source-annotated reports.
//!
//! A [`ScanError`] means the grammar could not handle some input, so tools
//! should surface it as a hard error. [`render_scan_error`] produces a plain
//! text report pointing at the failing character.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use gm_lexer_core::ScanError;

/// Render `err`, raised while scanning `source`, as an uncoloured report.
pub fn render_scan_error(err: &ScanError, source: &str) -> String {
    let span = error_range(err, source);
    let mut report = Report::<Range<usize>>::build(ReportKind::Error, (), span.start)
        .with_config(Config::default().with_color(false))
        .with_message(err.to_string())
        .with_label(Label::new(span).with_message(err.label()))
        .with_note(format!("state stack: {}", err.stack()));
    if let Some(rule) = err.rule() {
        report = report.with_help(format!("raised by {rule}"));
    }

    let mut out = Vec::new();
    match report.finish().write(Source::from(source.to_owned()), &mut out) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => err.to_string(),
    }
}

/// The character at the failure offset, or an empty range at end of input.
fn error_range(err: &ScanError, source: &str) -> Range<usize> {
    let start = (err.position().offset as usize).min(source.len());
    let len = source
        .get(start..)
        .and_then(|rest| rest.chars().next())
        .map_or(0, char::len_utf8);
    start..start + len
}

#[cfg(test)]
mod tests;
