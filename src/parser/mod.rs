//! Parser: logos lexer plus recursive-descent statement parser.
//!
//! YANG has a deliberately small surface syntax: every construct is a
//! statement `keyword [argument] (";" | "{" statement* "}")`. This module
//! turns source text into a generic [`Statement`] tree; the `ast` module
//! gives the tree its typed meaning.
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with offsets
//!     ↓
//! Parser → Statement tree (keyword, argument, children, location)
//! ```
//!
//! The parser keeps going after recoverable errors so one invocation
//! surfaces as many diagnostics as possible.

mod lexer;
#[allow(clippy::module_inception)]
mod parser;
mod statement;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{Parse, parse};
pub use statement::Statement;
