//! Source location tracking.
//!
//! Tokens and AST nodes carry a `Span` of byte offsets into the source.
//! Nodes synthesized by the module rewriter use `Span::default()`.

/// A span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the start.
    pub start: u32,
    /// Byte offset of the end (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    #[inline]
    pub const fn merge(self, other: Span) -> Span {
        Span {
            start: if self.start < other.start { self.start } else { other.start },
            end: if self.end > other.end { self.end } else { other.end },
        }
    }
}

/// Maps 1-based line numbers back to source text.
#[derive(Debug)]
pub struct LineIndex<'a> {
    source: &'a str,
    /// Byte offsets of the start of each line.
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Build a line index from source code.
    ///
    /// Line breaks are the same bytes the lexer treats as `Newline`.
    pub fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if matches!(b, b'\n' | 0x0b | 0x0c) {
                line_starts.push(i + 1);
            }
        }
        Self { source, line_starts }
    }

    /// Text of a 1-based line, without its terminator.
    pub fn line_text(&self, line: u32) -> &'a str {
        let idx = (line as usize).saturating_sub(1);
        let Some(&start) = self.line_starts.get(idx) else {
            return "";
        };
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(self.source.len(), |next| next - 1);
        self.source[start..end].trim_end_matches('\r')
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let a = Span::new(5, 10);
        let b = Span::new(8, 15);
        assert_eq!(a.merge(b), Span::new(5, 15));
    }

    #[test]
    fn test_line_text() {
        let index = LineIndex::new("line1\nline2\r\nline3");

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_text(1), "line1");
        assert_eq!(index.line_text(2), "line2");
        assert_eq!(index.line_text(3), "line3");
        assert_eq!(index.line_text(9), "");
    }
}
