//! Mapping diagnostic records onto whole-line highlight requests.
//!
//! The editing surface is an external sink that accepts "mark this span
//! with this style"; this module only decides which spans and styles.

use std::ops::Range;

use crate::buffer::SourceBuffer;
use crate::diagnostic::{DiagnosticRecord, Severity};

/// Visual style of a highlight. Two fixed diagnostic styles plus the
/// independently maintained cursor-line style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HighlightStyle {
    Error,
    Warning,
    CursorLine,
}

impl From<Severity> for HighlightStyle {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => HighlightStyle::Error,
            Severity::Warning => HighlightStyle::Warning,
        }
    }
}

/// A request to mark one whole source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightSpan {
    /// 0-based line index into the buffer.
    pub line: usize,
    /// Byte span of the line, terminator excluded.
    pub span: Range<usize>,
    pub style: HighlightStyle,
}

/// Convert records into whole-line spans. Records whose line falls
/// outside the buffer (stale diagnostics after edits) are dropped, not
/// clamped. Each diagnostics pass produces a fresh set; callers replace
/// the previous one wholesale.
pub fn map_to_highlights(records: &[DiagnosticRecord], buffer: &SourceBuffer) -> Vec<HighlightSpan> {
    records
        .iter()
        .filter_map(|record| {
            let line = (record.source_line as usize).checked_sub(1)?;
            let span = buffer.line_span(line)?;
            Some(HighlightSpan {
                line,
                span,
                style: record.severity.into(),
            })
        })
        .collect()
}

/// Cursor-line highlight for the current line, if it exists.
pub fn cursor_highlight(buffer: &SourceBuffer, line: usize) -> Option<HighlightSpan> {
    buffer.line_span(line).map(|span| HighlightSpan {
        line,
        span,
        style: HighlightStyle::CursorLine,
    })
}

/// Combine the cursor-line highlight with diagnostic spans for one render
/// pass. Diagnostic spans are additive: they never displace the cursor
/// highlight, both coexist.
pub fn merge_with_cursor(
    cursor: Option<HighlightSpan>,
    diagnostics: Vec<HighlightSpan>,
) -> Vec<HighlightSpan> {
    let mut merged = Vec::with_capacity(diagnostics.len() + 1);
    merged.extend(cursor);
    merged.extend(diagnostics);
    merged
}
