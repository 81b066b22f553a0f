//! Diagnostics — error reporting for every pipeline stage.
//!
//! Every error this crate reports carries a [`Location`] and renders as
//! `file:line:col: message`. Diagnostic streams are sorted by
//! (file, line, column) with numeric line/column comparison, then
//! de-duplicated on their rendered text, so a processing run always yields
//! a deterministic error list.

use crate::base::Location;
use thiserror::Error;

/// The stage a diagnostic originated from, carrying its message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    /// Malformed token, unterminated string or comment.
    #[error("{0}")]
    Lex(String),
    /// Missing `;`/`{`, unexpected `}`, unmatched braces at EOF.
    #[error("{0}")]
    Parse(String),
    /// Unknown/duplicate/missing substatements, unknown type names.
    #[error("{0}")]
    Ast(String),
    /// Import/include, prefix, identity, and typedef resolution failures.
    #[error("{0}")]
    Resolve(String),
    /// Grouping, augment, and deviation expansion failures.
    #[error("{0}")]
    Expand(String),
}

/// A single located error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub loc: Location,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn lex(loc: Location, message: impl Into<String>) -> Self {
        Self {
            loc,
            kind: DiagnosticKind::Lex(message.into()),
        }
    }

    pub fn parse(loc: Location, message: impl Into<String>) -> Self {
        Self {
            loc,
            kind: DiagnosticKind::Parse(message.into()),
        }
    }

    pub fn ast(loc: Location, message: impl Into<String>) -> Self {
        Self {
            loc,
            kind: DiagnosticKind::Ast(message.into()),
        }
    }

    pub fn resolve(loc: Location, message: impl Into<String>) -> Self {
        Self {
            loc,
            kind: DiagnosticKind::Resolve(message.into()),
        }
    }

    pub fn expand(loc: Location, message: impl Into<String>) -> Self {
        Self {
            loc,
            kind: DiagnosticKind::Expand(message.into()),
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.loc, self.kind)
    }
}

impl std::error::Error for Diagnostic {}

/// A sorted, de-duplicated collection of diagnostics.
///
/// This is the error type of the fallible `ModuleSet` operations; it is
/// also what [`process`](crate::semantic::ModuleSet::process) returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Errors(Vec<Diagnostic>);

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Sort by (file, numeric line, numeric column) and drop duplicates
    /// with identical rendered text.
    pub fn sort_and_dedup(&mut self) {
        sort_and_dedup(&mut self.0);
    }

    /// `Ok(value)` when empty, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, Errors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<Vec<Diagnostic>> for Errors {
    fn from(mut diagnostics: Vec<Diagnostic>) -> Self {
        sort_and_dedup(&mut diagnostics);
        Self(diagnostics)
    }
}

impl IntoIterator for Errors {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for Errors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}

/// Sort diagnostics by (file, line, column, text) and collapse duplicates.
pub fn sort_and_dedup(diagnostics: &mut Vec<Diagnostic>) {
    diagnostics.sort_by(|a, b| {
        a.loc
            .file
            .cmp(&b.loc.file)
            .then(a.loc.line.cmp(&b.loc.line))
            .then(a.loc.col.cmp(&b.loc.col))
            .then_with(|| a.message().cmp(&b.message()))
    });
    diagnostics.dedup_by(|a, b| a.loc == b.loc && a.message() == b.message());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(file: &str, line: u32, col: u32, msg: &str) -> Diagnostic {
        Diagnostic::parse(Location::new(file, line, col), msg)
    }

    #[test]
    fn sorts_numerically_not_textually() {
        let mut errors = vec![
            diag("a.yang", 10, 2, "later"),
            diag("a.yang", 2, 30, "earlier"),
            diag("a.yang", 2, 4, "first"),
        ];
        sort_and_dedup(&mut errors);
        let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            lines,
            vec![
                "a.yang:2:4: first",
                "a.yang:2:30: earlier",
                "a.yang:10:2: later"
            ]
        );
    }

    #[test]
    fn dedups_identical_lines() {
        let mut errors = vec![
            diag("m.yang", 1, 1, "same"),
            diag("m.yang", 1, 1, "same"),
            diag("m.yang", 1, 1, "different"),
        ];
        sort_and_dedup(&mut errors);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn files_group_before_lines() {
        let mut errors = vec![diag("b.yang", 1, 1, "b"), diag("a.yang", 99, 1, "a")];
        sort_and_dedup(&mut errors);
        assert_eq!(errors[0].loc.file, "a.yang");
    }
}
