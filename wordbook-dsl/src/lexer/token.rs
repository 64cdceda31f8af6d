//! Lexer token types

use std::fmt;
use wordbook_core::LexError;

/// Token kinds for the wordbook language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare word.
    Word(String),
    /// A double-quoted or backtick string, still delimited and escaped.
    /// Unquoting is the parser's job.
    QuotedString(String),
    /// A newline or `;`.
    LineBreak,
    /// `(`
    Open,
    /// `)`
    Close,
    Eof,
    Error(LexError),
}

impl TokenKind {
    pub fn is_line_break(&self) -> bool {
        matches!(self, TokenKind::LineBreak)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(w) => write!(f, "word {w:?}"),
            TokenKind::QuotedString(s) => write!(f, "string {s}"),
            TokenKind::LineBreak => f.write_str("newline"),
            TokenKind::Open => f.write_str("'('"),
            TokenKind::Close => f.write_str("')'"),
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Source location span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}
