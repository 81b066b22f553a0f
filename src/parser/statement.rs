//! The generic statement tree.
//!
//! A [`Statement`] is the untyped form every YANG construct shares:
//! a keyword, an optional argument, and nested substatements. The tree is
//! created by the parser and consumed (but retained for provenance) by the
//! AST builder; it is never mutated afterwards.

use crate::base::Location;
use smol_str::SmolStr;

/// One parsed statement: `keyword [argument] (";" | "{" ... "}")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// The statement keyword, possibly prefixed (`pfx:keyword` for
    /// extension statements). Non-empty for all parsed statements.
    pub keyword: SmolStr,
    /// The cooked argument string, if any.
    pub argument: Option<String>,
    /// Substatements, in source order.
    pub children: Vec<Statement>,
    /// Location of the keyword token.
    pub loc: Location,
}

impl Statement {
    pub fn new(keyword: impl Into<SmolStr>, loc: Location) -> Self {
        Self {
            keyword: keyword.into(),
            argument: None,
            children: Vec::new(),
            loc,
        }
    }

    /// The argument, or `""` when the statement has none.
    pub fn arg(&self) -> &str {
        self.argument.as_deref().unwrap_or("")
    }

    /// First child with the given keyword.
    pub fn child(&self, keyword: &str) -> Option<&Statement> {
        self.children.iter().find(|c| c.keyword == keyword)
    }

    /// Whether the keyword is prefixed, marking an extension statement.
    pub fn is_extension(&self) -> bool {
        self.keyword.contains(':')
    }

    fn write_indented(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        for _ in 0..depth {
            f.write_str("  ")?;
        }
        f.write_str(&self.keyword)?;
        if let Some(argument) = &self.argument {
            write!(f, " {}", quote_argument(argument))?;
        }
        if self.children.is_empty() {
            f.write_str(";\n")
        } else {
            f.write_str(" {\n")?;
            for child in &self.children {
                child.write_indented(f, depth + 1)?;
            }
            for _ in 0..depth {
                f.write_str("  ")?;
            }
            f.write_str("}\n")
        }
    }
}

/// Re-serialises the statement as YANG source. Round-tripping through the
/// parser yields a syntactically equivalent tree (whitespace and comments
/// aside).
impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Quote an argument so that cooking it back produces the same value.
///
/// Bare tokens stay unquoted, arguments without single quotes are emitted
/// single-quoted (verbatim, which keeps regex backslashes intact), and the
/// rest fall back to escaped double quotes.
fn quote_argument(argument: &str) -> String {
    let bare = !argument.is_empty()
        && !argument.contains([
            ' ', '\t', '\r', '\n', ';', '{', '}', '"', '\'', '+',
        ])
        && !argument.contains("//")
        && !argument.contains("/*");
    if bare {
        return argument.to_string();
    }
    if !argument.contains('\'') && !argument.contains('\n') {
        return format!("'{argument}'");
    }
    let mut out = String::with_capacity(argument.len() + 2);
    out.push('"');
    for c in argument.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
