/// Position tracking for statements and AST nodes
///
/// Stores the source location (file/line/column) of statements for
/// diagnostics. Line and column are 1-based, matching the `file:line:col:`
/// prefix every reported error carries.
use smol_str::SmolStr;

/// A source location: file name plus 1-based line and column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: SmolStr,
    pub line: u32,
    pub col: u32,
}

impl Location {
    pub fn new(file: impl Into<SmolStr>, line: u32, col: u32) -> Self {
        Self {
            file: file.into(),
            line,
            col,
        }
    }

    /// A location with no real source position (synthetic statements).
    pub fn none(file: impl Into<SmolStr>) -> Self {
        Self::new(file, 0, 0)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}
