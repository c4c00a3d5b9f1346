use std::ops::Range;

/// Line index over a submitted source text.
///
/// Diagnostics from the external compiler are 1-based line numbers;
/// highlight mapping and ariadne rendering need byte spans. This owns the
/// source and answers both.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    text: String,
    /// Byte offset of the start of each line. When the text ends with a
    /// newline the final entry equals `text.len()` and is not a line.
    line_starts: Vec<usize>,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        if self.text.is_empty() {
            return 0;
        }
        if *self.line_starts.last().unwrap() == self.text.len() {
            self.line_starts.len() - 1
        } else {
            self.line_starts.len()
        }
    }

    /// Byte span of a 0-based line, excluding its terminator.
    /// Returns `None` for out-of-range indices.
    pub fn line_span(&self, index: usize) -> Option<Range<usize>> {
        if index >= self.line_count() {
            return None;
        }
        let start = self.line_starts[index];
        let end = match self.line_starts.get(index + 1) {
            Some(&next) => next - 1,
            None => self.text.len(),
        };
        // Exclude a carriage return left by a CRLF terminator.
        let end = if end > start && self.text.as_bytes()[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        Some(start..end)
    }

    pub fn line_text(&self, index: usize) -> Option<&str> {
        self.line_span(index).map(|span| &self.text[span])
    }
}
