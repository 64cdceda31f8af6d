//! Parser implementation

use super::unquote::unquote;
use crate::lexer::*;
use wordbook_core::{ParseError, ParseErrorKind, ParseOptions, Position, SyntaxError, Value};

/// Parser for the wordbook language.
///
/// Produces a flat list of [`Value`]s. A repetition block such as
///
/// ```text
/// require (
///     example.com/a v1
///     example.com/b v2
/// )
/// ```
///
/// is expanded here into one value per inner line, each starting with the
/// words before the open paren.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    source_name: &'a str,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over `source`, reporting positions per `options`.
    pub fn new(source: &'a str, options: &'a ParseOptions) -> Self {
        Self {
            lexer: Lexer::new(source),
            source_name: &options.source_name,
            max_depth: options.max_depth,
            depth: 0,
        }
    }

    /// Parse the whole source into values.
    pub fn parse(mut self) -> Result<Vec<Value>, ParseError> {
        let mut values = Vec::new();

        loop {
            let token = self.skip_line_breaks();
            match token.kind {
                TokenKind::Eof => return Ok(values),
                TokenKind::Close => {
                    return Err(self.error_at(token.span.line, SyntaxError::UnexpectedClose))
                }
                _ => values.extend(self.parse_value_group(token)?),
            }
        }
    }

    /// Parse the group that starts with `first`.
    ///
    /// Ends after the terminating line break, at end of input, or just before
    /// a close paren that belongs to the enclosing list.
    fn parse_value_group(&mut self, first: Token) -> Result<Vec<Value>, ParseError> {
        let line = first.span.line;
        let mut words: Vec<String> = Vec::new();
        let mut token = first;

        loop {
            match token.kind {
                TokenKind::Eof | TokenKind::LineBreak if !words.is_empty() => {
                    return Ok(vec![self.value(words, line)]);
                }
                TokenKind::Eof => {
                    return Err(self.error_at(token.span.line, SyntaxError::UnexpectedEof));
                }
                TokenKind::LineBreak => {
                    return Err(self.error_at(token.span.line, SyntaxError::UnexpectedNewline));
                }
                TokenKind::Word(word) => words.push(word),
                TokenKind::QuotedString(literal) => match unquote(&literal) {
                    Ok(word) => words.push(word),
                    Err(reason) => {
                        return Err(self.error_at(
                            token.span.line,
                            SyntaxError::InvalidQuotedString { literal, reason },
                        ));
                    }
                },
                TokenKind::Open => {
                    let inner = self.parse_list(token.span.line)?;
                    return Ok(inner.into_iter().map(|v| v.prefixed(&words)).collect());
                }
                TokenKind::Close => {
                    return Err(self.error_at(token.span.line, SyntaxError::UnexpectedClose));
                }
                TokenKind::Error(e) => return Err(self.error_at(token.span.line, e)),
            }

            // In `(a; b)` the close paren after `b` ends the list, not this group.
            if matches!(self.lexer.peek_token().kind, TokenKind::Close) {
                return Ok(vec![self.value(words, line)]);
            }
            token = self.lexer.next_token();
        }
    }

    /// Parse the inner values of a repetition block. Called just after the
    /// open paren; returns just after the matching close paren.
    fn parse_list(&mut self, open_line: usize) -> Result<Vec<Value>, ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error_at(
                open_line,
                SyntaxError::NestingTooDeep {
                    limit: self.max_depth,
                },
            ));
        }

        let mut values = Vec::new();
        loop {
            let token = self.skip_line_breaks();
            match token.kind {
                TokenKind::Eof => {
                    return Err(self.error_at(token.span.line, SyntaxError::UnexpectedEof));
                }
                TokenKind::Close => {
                    let next = self.lexer.peek_token().kind.clone();
                    return match next {
                        TokenKind::Error(e) => Err(self.error_at(token.span.line, e)),
                        TokenKind::LineBreak | TokenKind::Eof | TokenKind::Close => {
                            self.depth -= 1;
                            Ok(values)
                        }
                        _ => Err(self.error_at(token.span.line, SyntaxError::CloseNotFollowed)),
                    };
                }
                _ => values.extend(self.parse_value_group(token)?),
            }
        }
    }

    fn skip_line_breaks(&mut self) -> Token {
        loop {
            let token = self.lexer.next_token();
            if !token.kind.is_line_break() {
                return token;
            }
        }
    }

    fn value(&self, words: Vec<String>, line: usize) -> Value {
        Value::new(words, self.source_name, line)
    }

    fn error_at(&self, line: usize, kind: impl Into<ParseErrorKind>) -> ParseError {
        ParseError::new(Position::new(self.source_name, line), kind)
    }
}

// ============================================================================
// TESTS
// ============================================================================
