//! Byte offset to line/column conversion.
//!
//! The lexer works in byte offsets ([`TextSize`]); diagnostics want
//! line/column. A [`LineIndex`] is built once per source text and answers
//! the conversion in O(log n).

use text_size::TextSize;

/// A 0-based line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

/// Maps byte offsets in one source text to line/column pairs.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Offset of the first byte of every line.
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(TextSize::new(i as u32 + 1));
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 0-based line/column.
    ///
    /// Columns count bytes, which is exact for the ASCII-dominated YANG
    /// sources this crate handles.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = u32::from(offset) - u32::from(self.line_starts[line]);
        LineCol {
            line: line as u32,
            col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_basic() {
        let index = LineIndex::new("ab\ncd\n\nx");
        assert_eq!(index.line_col(TextSize::new(0)), LineCol { line: 0, col: 0 });
        assert_eq!(index.line_col(TextSize::new(1)), LineCol { line: 0, col: 1 });
        assert_eq!(index.line_col(TextSize::new(3)), LineCol { line: 1, col: 0 });
        assert_eq!(index.line_col(TextSize::new(6)), LineCol { line: 2, col: 0 });
        assert_eq!(index.line_col(TextSize::new(7)), LineCol { line: 3, col: 0 });
    }
}
