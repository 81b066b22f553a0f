//! Logos-based lexer for YANG
//!
//! Fast tokenization using the logos crate, plus the string "cooking"
//! rules of RFC 7950 §6.1.3: escape processing in double-quoted strings,
//! verbatim single-quoted strings, and indentation stripping for
//! multi-line double-quoted strings.

use logos::{FilterResult, Logos};
use text_size::TextSize;

/// Token kinds handed to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    Semicolon,
    /// A single- or double-quoted string, quotes included in `text`.
    QuotedString,
    /// An unquoted string: keywords, identifiers, bare arguments, `+`.
    UnquotedString,
    /// Unterminated string/comment or an otherwise unlexable character.
    Error,
}

/// A token with its kind, raw text, and byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, RawToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: RawToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.inner.next()?;
        let span = self.inner.span();
        let text = self.inner.slice();
        let offset = TextSize::new(span.start as u32);

        let kind = match raw {
            Ok(RawToken::LeftBrace) => TokenKind::LeftBrace,
            Ok(RawToken::RightBrace) => TokenKind::RightBrace,
            Ok(RawToken::Semicolon) => TokenKind::Semicolon,
            Ok(RawToken::DoubleString) | Ok(RawToken::SingleString) => TokenKind::QuotedString,
            Ok(RawToken::UnquotedString) => TokenKind::UnquotedString,
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum. Comments and whitespace are skipped here; everything
/// the statement grammar cares about comes out as a token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
enum RawToken {
    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token(";")]
    Semicolon,

    // Double-quoted: backslash always consumes the next character, so an
    // escaped quote never terminates the string. May span lines.
    #[regex(r#""([^"\\]|\\[\s\S])*""#)]
    DoubleString,

    // Single-quoted: verbatim, no escapes. May span lines.
    #[regex(r"'[^']*'")]
    SingleString,

    // Everything else up to whitespace, a structural character, a quote,
    // or the start of a comment. The callback extends the single-character
    // match and rejects a `/*` that the comment rule failed to close.
    #[regex(r#"[^ \t\r\n;{}"']"#, lex_unquoted)]
    UnquotedString,
}

fn lex_unquoted(lex: &mut logos::Lexer<'_, RawToken>) -> FilterResult<(), ()> {
    let rem = lex.remainder().as_bytes();
    if lex.slice() == "/" && rem.first() == Some(&b'*') {
        // `/*` without a closing `*/` (a closed comment wins the longer
        // match in the skip rule and never reaches this callback)
        return FilterResult::Error(());
    }
    let mut len = 0;
    while len < rem.len() {
        match rem[len] {
            b' ' | b'\t' | b'\r' | b'\n' | b';' | b'{' | b'}' | b'"' | b'\'' => break,
            b'/' if matches!(rem.get(len + 1), Some(b'/') | Some(b'*')) => break,
            _ => len += 1,
        }
    }
    lex.bump(len);
    FilterResult::Emit(())
}

/// Turn a raw quoted token into its string value.
///
/// `quote_col` is the 0-based column of the opening quote, needed for the
/// RFC 6020 §6.1.3 indentation-stripping rule on multi-line double-quoted
/// strings. `in_pattern` selects the `pattern` escape rules: YANG patterns
/// are XSD regexes with their own backslash escapes, so every backslash is
/// passed through untouched there.
pub fn cook_string(raw: &str, quote_col: u32, in_pattern: bool) -> String {
    debug_assert!(raw.len() >= 2);
    let inner = &raw[1..raw.len() - 1];
    if raw.starts_with('\'') {
        return inner.to_string();
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped) if in_pattern => {
                out.push('\\');
                out.push(escaped);
            }
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                // Not one of the RFC escapes; keep it verbatim.
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    if out.contains('\n') {
        dedent(&out, quote_col)
    } else {
        out
    }
}

/// Strip per-line indentation from a multi-line double-quoted string, up
/// to and including the opening quote's column, and drop whitespace
/// trailing before each line break (RFC 6020 §6.1.3). Tabs advance to the
/// next multiple of eight.
fn dedent(s: &str, quote_col: u32) -> String {
    let stop = quote_col as usize + 1;
    let lines: Vec<&str> = s.split('\n').collect();
    let last = lines.len() - 1;
    let mut out = String::with_capacity(s.len());
    for (i, line) in lines.into_iter().enumerate() {
        let mut rest = line;
        if i > 0 {
            out.push('\n');
            let mut width = 0usize;
            for c in line.chars() {
                if width >= stop {
                    break;
                }
                match c {
                    ' ' => width += 1,
                    '\t' => width = (width / 8 + 1) * 8,
                    _ => break,
                }
                rest = &rest[c.len_utf8()..];
            }
        }
        // whitespace trailing before a line break is stripped; the final
        // line keeps its trailing whitespace (no break follows it)
        if i < last {
            rest = rest.trim_end_matches([' ', '\t']);
        }
        out.push_str(rest);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text.to_string()).collect()
    }

    #[test]
    fn basic_statement_tokens() {
        assert_eq!(
            kinds("leaf foo { type string; }"),
            vec![
                TokenKind::UnquotedString,
                TokenKind::UnquotedString,
                TokenKind::LeftBrace,
                TokenKind::UnquotedString,
                TokenKind::UnquotedString,
                TokenKind::Semicolon,
                TokenKind::RightBrace,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            texts("a // comment\nb /* multi\nline */ c"),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn unquoted_stops_before_comment() {
        assert_eq!(texts("foo//bar\n"), vec!["foo"]);
        assert_eq!(texts("/a/b/c;"), vec!["/a/b/c", ";"]);
    }

    #[test]
    fn quoted_strings() {
        assert_eq!(
            kinds(r#"namespace "urn:x"; prefix 'p';"#),
            vec![
                TokenKind::UnquotedString,
                TokenKind::QuotedString,
                TokenKind::Semicolon,
                TokenKind::UnquotedString,
                TokenKind::QuotedString,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn escaped_quote_does_not_terminate() {
        let tokens = tokenize(r#""a\"b""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::QuotedString);
    }

    #[test]
    fn unterminated_string_is_error() {
        let tokens = tokenize("\"abc");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Error);
    }

    #[test]
    fn unterminated_comment_is_error() {
        let tokens = tokenize("/* abc");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Error);
    }

    #[test]
    fn cook_escapes() {
        assert_eq!(cook_string(r#""a\nb\tc\"d\\e""#, 0, false), "a\nb\tc\"d\\e");
        assert_eq!(cook_string(r#""a\db""#, 0, false), r"a\db");
        assert_eq!(cook_string(r"'a\nb'", 0, false), r"a\nb");
    }

    #[test]
    fn cook_pattern_keeps_backslashes() {
        assert_eq!(cook_string(r#""[a-z]\\d\d""#, 0, true), r"[a-z]\\d\d");
        assert_eq!(cook_string(r#""[a-z]\\d""#, 0, false), r"[a-z]\d");
    }

    #[test]
    fn cook_dedents_to_quote_column() {
        // description "line1
        //              line2
        // with the quote at column 12: continuation indent is stripped
        // through column 12, leaving content aligned after the quote.
        let raw = "\"line1\n             line2\"";
        assert_eq!(cook_string(raw, 12, false), "line1\nline2");
    }

    #[test]
    fn cook_dedent_keeps_deeper_indent() {
        let raw = "\"a\n     b\"";
        assert_eq!(cook_string(raw, 2, false), "a\n  b");
    }

    #[test]
    fn cook_trims_trailing_whitespace_per_line() {
        let raw = "\"a   \n   b\"";
        assert_eq!(cook_string(raw, 2, false), "a\nb");
    }
}
