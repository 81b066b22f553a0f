//! Recursive descent parser for the YANG statement grammar.
//!
//! Reads `keyword [argument] ( ';' | '{' statement* '}' )`, performing
//! quoted-string concatenation (`"a" + "b"`) as it goes. Errors do not
//! abort the parse: the parser recovers at statement boundaries and keeps
//! collecting diagnostics.

use super::lexer::{Lexer, Token, TokenKind, cook_string};
use super::statement::Statement;
use crate::base::{LineIndex, Location};
use crate::diagnostics::Diagnostic;

/// Parse result: top-level statements plus any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub statements: Vec<Statement>,
    pub errors: Vec<Diagnostic>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse YANG source text into a statement tree.
///
/// `file` is the logical file name recorded in every location.
pub fn parse(source: &str, file: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(source).collect();
    let mut parser = Parser {
        tokens,
        pos: 0,
        source,
        file,
        line_index: LineIndex::new(source),
        errors: Vec::new(),
        depth: 0,
        reported_eof: false,
    };
    let statements = parser.parse_statements(true);
    Parse {
        statements,
        errors: parser.errors,
    }
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    source: &'a str,
    file: &'a str,
    line_index: LineIndex,
    errors: Vec<Diagnostic>,
    depth: u32,
    reported_eof: bool,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + n)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn location(&self, token: &Token<'a>) -> Location {
        let lc = self.line_index.line_col(token.offset);
        Location::new(self.file, lc.line + 1, lc.col + 1)
    }

    fn eof_location(&self) -> Location {
        let lc = self
            .line_index
            .line_col(text_size::TextSize::new(self.source.len() as u32));
        Location::new(self.file, lc.line + 1, lc.col + 1)
    }

    fn error(&mut self, loc: Location, message: impl Into<String>) {
        self.errors.push(Diagnostic::parse(loc, message));
    }

    /// Parse statements until `}` (nested) or end of input (top level).
    fn parse_statements(&mut self, top_level: bool) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                None => {
                    if !top_level && self.depth > 0 && !self.reported_eof {
                        self.reported_eof = true;
                        let loc = self.eof_location();
                        self.error(loc, format!("missing {} '}}' at end of input", self.depth));
                    }
                    return statements;
                }
                Some(token) if token.kind == TokenKind::RightBrace => {
                    if top_level {
                        // keep going so later statements still get parsed
                        let loc = self.location(token);
                        self.error(loc, "unexpected '}'");
                        self.bump();
                        continue;
                    }
                    return statements;
                }
                Some(_) => {
                    if let Some(statement) = self.parse_statement() {
                        statements.push(statement);
                    }
                }
            }
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        let token = self.bump()?;
        let loc = self.location(&token);
        match token.kind {
            TokenKind::UnquotedString => {}
            TokenKind::Error => {
                let message = self.lex_error_message(&token);
                self.errors.push(Diagnostic::lex(loc, message));
                self.recover();
                return None;
            }
            _ => {
                self.error(
                    loc,
                    format!("expected a keyword, got {}", describe(&token)),
                );
                self.recover();
                return None;
            }
        }

        let mut statement = Statement::new(token.text, loc.clone());
        statement.argument = self.parse_argument(&statement.keyword);

        match self.peek() {
            Some(t) if t.kind == TokenKind::Semicolon => {
                self.bump();
            }
            Some(t) if t.kind == TokenKind::LeftBrace => {
                self.bump();
                self.depth += 1;
                statement.children = self.parse_statements(false);
                if let Some(t) = self.peek()
                    && t.kind == TokenKind::RightBrace
                {
                    self.bump();
                }
                self.depth -= 1;
            }
            other => {
                let loc = match other {
                    Some(t) => self.location(&t.clone()),
                    None => self.eof_location(),
                };
                self.error(
                    loc,
                    format!("missing ';' or '{{' after \"{}\"", statement.keyword),
                );
            }
        }
        Some(statement)
    }

    /// Parse the optional argument, concatenating `"a" + "b"` chains.
    fn parse_argument(&mut self, keyword: &str) -> Option<String> {
        let in_pattern = keyword == "pattern" || keyword.ends_with(":posix-pattern");
        match self.peek() {
            Some(t) if t.kind == TokenKind::QuotedString => {
                let token = self.bump().expect("peeked");
                let mut value = self.cook(&token, in_pattern);
                // "a" + "b": only quoted strings may be concatenated
                while let (Some(plus), Some(next)) = (self.peek(), self.peek_at(1)) {
                    if plus.kind != TokenKind::UnquotedString || plus.text != "+" {
                        break;
                    }
                    if next.kind != TokenKind::QuotedString {
                        let loc = self.location(&plus.clone());
                        self.error(loc, "expected quoted string after '+'");
                        self.bump();
                        break;
                    }
                    self.bump();
                    let token = self.bump().expect("peeked");
                    value.push_str(&self.cook(&token, in_pattern));
                }
                Some(value)
            }
            Some(t) if t.kind == TokenKind::UnquotedString => {
                let token = self.bump().expect("peeked");
                Some(token.text.to_string())
            }
            Some(t) if t.kind == TokenKind::Error => {
                let token = self.bump().expect("peeked");
                let loc = self.location(&token);
                let message = self.lex_error_message(&token);
                self.errors.push(Diagnostic::lex(loc, message));
                None
            }
            _ => None,
        }
    }

    fn cook(&self, token: &Token<'a>, in_pattern: bool) -> String {
        let lc = self.line_index.line_col(token.offset);
        cook_string(token.text, lc.col, in_pattern)
    }

    fn lex_error_message(&self, token: &Token<'a>) -> String {
        let rest = &self.source[usize::from(token.offset)..];
        if rest.starts_with('"') || rest.starts_with('\'') {
            "unterminated string".to_string()
        } else if rest.starts_with("/*") {
            "unterminated comment".to_string()
        } else {
            format!("invalid character {:?}", rest.chars().next().unwrap_or('?'))
        }
    }

    /// Skip to just past the next ';' or to a brace boundary.
    fn recover(&mut self) {
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Semicolon => {
                    self.bump();
                    return;
                }
                TokenKind::LeftBrace | TokenKind::RightBrace => return,
                _ => {
                    self.bump();
                }
            }
        }
    }
}

fn describe(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::LeftBrace => "'{'".to_string(),
        TokenKind::RightBrace => "'}'".to_string(),
        TokenKind::Semicolon => "';'".to_string(),
        TokenKind::QuotedString => format!("string {}", token.text),
        TokenKind::UnquotedString => format!("\"{}\"", token.text),
        TokenKind::Error => "invalid input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(source: &str) -> Statement {
        let parse = parse(source, "test.yang");
        assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
        assert_eq!(parse.statements.len(), 1);
        parse.statements.into_iter().next().unwrap()
    }

    #[test]
    fn simple_statement() {
        let stmt = parse_one("leaf foo { type string; }");
        assert_eq!(stmt.keyword, "leaf");
        assert_eq!(stmt.arg(), "foo");
        assert_eq!(stmt.children.len(), 1);
        assert_eq!(stmt.children[0].keyword, "type");
        assert_eq!(stmt.children[0].arg(), "string");
    }

    #[test]
    fn locations_are_one_based() {
        let stmt = parse_one("leaf foo;");
        assert_eq!((stmt.loc.line, stmt.loc.col), (1, 1));
    }

    #[test]
    fn string_concatenation() {
        let stmt = parse_one(r#"description "a" + "b" + 'c';"#);
        assert_eq!(stmt.arg(), "abc");
    }

    #[test]
    fn concatenation_requires_quoted_operand() {
        let parse = parse(r#"description "a" + b;"#, "t.yang");
        assert!(!parse.errors.is_empty());
        assert!(parse.errors[0].to_string().contains("after '+'"));
    }

    #[test]
    fn unexpected_close_brace_recovers() {
        let parse = parse("} leaf foo;", "t.yang");
        assert_eq!(parse.errors.len(), 1);
        assert!(parse.errors[0].to_string().contains("unexpected '}'"));
        assert_eq!(parse.statements.len(), 1);
        assert_eq!(parse.statements[0].keyword, "leaf");
    }

    #[test]
    fn unbalanced_braces_reported_once() {
        let parse = parse("container a { container b {", "t.yang");
        assert_eq!(
            parse
                .errors
                .iter()
                .filter(|e| e.to_string().contains("end of input"))
                .count(),
            1
        );
    }

    #[test]
    fn missing_terminator() {
        let parse = parse("leaf foo", "t.yang");
        assert_eq!(parse.errors.len(), 1);
        assert!(parse.errors[0].to_string().contains("missing ';' or '{'"));
    }

    #[test]
    fn reserialise_round_trip() {
        let source = r#"module m {
  namespace "urn:m";
  prefix m;
  container c {
    leaf a { type string { pattern '[a-z]+\d'; } }
  }
}
"#;
        let first = parse(source, "m.yang");
        assert!(first.ok());
        let printed = first.statements[0].to_string();
        let second = parse(&printed, "m.yang");
        assert!(second.ok(), "reparse failed: {:?}", second.errors);
        // printing is idempotent, so syntactic equivalence is equality of
        // the printed forms
        assert_eq!(printed, second.statements[0].to_string());
    }
}
