//! Diagnostic records extracted from the compiler's free-text channels.
//!
//! The external tool writes warnings and syntax errors one per line, each
//! optionally naming its source line as `line <N>`. Extraction recognizes
//! exactly that token; anything else is not a diagnostic we can place.

use crate::buffer::SourceBuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic tied to a 1-based source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub source_line: u32,
    pub severity: Severity,
    pub message: String,
}

/// Scan diagnostic text and yield one record per line that carries a
/// recognizable `line <N>` token (case-insensitive). Lines without the
/// token yield no record; they are dropped, never defaulted to line 1.
/// Input order is preserved and nothing is deduplicated here.
pub fn extract(text: &str, severity: Severity) -> Vec<DiagnosticRecord> {
    text.lines()
        .filter_map(|line| {
            line_number_token(line).map(|source_line| DiagnosticRecord {
                source_line,
                severity,
                message: line.to_string(),
            })
        })
        .collect()
}

/// Find the first `line` followed by whitespace and a digit run, case-
/// insensitively, and parse the digit run as a 1-based line number.
fn line_number_token(line: &str) -> Option<u32> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i + 4 <= bytes.len() {
        if bytes[i..i + 4].eq_ignore_ascii_case(b"line") {
            let mut j = i + 4;
            let ws_start = j;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j > ws_start {
                let digits_start = j;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    j += 1;
                }
                if j > digits_start {
                    // An overflowing digit run is no recognizable token.
                    if let Ok(n) = line[digits_start..j].parse::<u32>() {
                        return Some(n);
                    }
                }
            }
        }
        i += 1;
    }
    None
}

/// Render records against the submitted source using ariadne, one report
/// per record, each labeling the whole offending line.
pub fn render_records(
    records: &[DiagnosticRecord],
    filename: &str,
    buffer: &SourceBuffer,
    out: &mut impl std::io::Write,
) -> std::io::Result<()> {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    for record in records {
        // Line numbers are 1-based; a `line 0` from a malformed message
        // must not underflow onto a real line.
        let Some(line_index) = (record.source_line as usize).checked_sub(1) else {
            continue;
        };
        let Some(span) = buffer.line_span(line_index) else {
            // Stale diagnostic pointing past the end of the buffer.
            continue;
        };

        let (kind, color) = match record.severity {
            Severity::Error => (ReportKind::Error, Color::Red),
            Severity::Warning => (ReportKind::Warning, Color::Yellow),
        };

        Report::build(kind, filename, span.start)
            .with_message(&record.message)
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(&record.message)
                    .with_color(color),
            )
            .finish()
            .write((filename, Source::from(buffer.text())), &mut *out)?;
    }
    Ok(())
}
