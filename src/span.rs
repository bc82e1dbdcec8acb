//! Source map: byte-offset spans and their resolution to line/column.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte-offset range into a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span from a byte range.
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// A zero-width span at the given offset, used for synthetic nodes.
    pub fn point(offset: usize) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// The span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Dummy span for synthesized nodes that have no source origin.
    pub fn dummy() -> Self {
        Span { start: 0, end: 0 }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Wraps a value together with the span of source text it was parsed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Spanned { node, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            node: f(self.node),
            span: self.span,
        }
    }
}

/// A resolved (1-indexed) line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Resolves byte offsets into the source text to 1-indexed line/column pairs.
///
/// Built once per source file; line start offsets are precomputed so lookups
/// are a binary search rather than a linear scan.
#[derive(Debug, Clone)]
pub struct SourceMap {
    file_name: String,
    source: String,
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        SourceMap {
            file_name: file_name.into(),
            source,
            line_starts,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Resolves a byte offset to a 1-indexed line/column pair.
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line];
        let col = self.source[line_start..offset].chars().count();
        LineCol {
            line: line + 1,
            col: col + 1,
        }
    }

    /// Renders a span as `file:line:col-line:col` for diagnostic display.
    pub fn render_span(&self, span: Span) -> String {
        let start = self.line_col(span.start);
        let end = self.line_col(span.end);
        if start == end {
            format!("{}:{}", self.file_name, start)
        } else {
            format!("{}:{}-{}", self.file_name, start, end)
        }
    }

    /// Returns the full text of the line containing `offset`, without its newline.
    pub fn line_text(&self, offset: usize) -> &str {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let start = self.line_starts[line];
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.source.len());
        self.source[start..end].trim_end_matches('\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_first_line() {
        let map = SourceMap::new("test.bet", "hello\nworld\n");
        assert_eq!(map.line_col(0), LineCol { line: 1, col: 1 });
        assert_eq!(map.line_col(6), LineCol { line: 2, col: 1 });
    }

    #[test]
    fn merges_spans() {
        let a = Span::new(3, 5);
        let b = Span::new(1, 2);
        assert_eq!(a.merge(b), Span::new(1, 5));
    }

    #[test]
    fn line_text_strips_newline() {
        let map = SourceMap::new("t", "abc\ndef\n");
        assert_eq!(map.line_text(5), "def");
    }
}
