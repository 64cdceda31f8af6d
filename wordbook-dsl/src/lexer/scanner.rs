//! Lexer implementation

use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;
use wordbook_core::LexError;

// ============================================================================
// LEXER STATE
// ============================================================================

/// A token already scanned but not yet handed out.
///
/// `Pushed` holds the one token returned by [`Lexer::peek_token`] and not yet
/// consumed. `Errored` is terminal: every later read returns the same error.
/// No lookahead at all means the lexer is ready to scan.
#[derive(Debug)]
enum Lookahead {
    Pushed(Token),
    Errored(Token),
}

impl Lookahead {
    fn token(&self) -> &Token {
        match self {
            Lookahead::Pushed(token) | Lookahead::Errored(token) => token,
        }
    }
}

// ============================================================================
// LEXER IMPLEMENTATION
// ============================================================================

/// Lexer for the wordbook language.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
    lookahead: Option<Lookahead>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
            lookahead: None,
        }
    }

    /// Tokenize the entire source, stopping after `Eof` or the first error.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let done = matches!(token.kind, TokenKind::Eof | TokenKind::Error(_));
            tokens.push(token);
            if done {
                break;
            }
        }

        tokens
    }

    /// Return the next token and advance past it.
    pub fn next_token(&mut self) -> Token {
        let token = match self.lookahead.take() {
            None => self.scan(),
            Some(Lookahead::Pushed(token)) => token,
            Some(Lookahead::Errored(token)) => {
                self.lookahead = Some(Lookahead::Errored(token.clone()));
                return token;
            }
        };
        if matches!(token.kind, TokenKind::Error(_)) {
            self.lookahead = Some(Lookahead::Errored(token.clone()));
        }
        token
    }

    /// Return the next token without consuming it.
    pub fn peek_token(&mut self) -> &Token {
        let lookahead = match self.lookahead.take() {
            Some(lookahead) => lookahead,
            None => Lookahead::Pushed(self.scan()),
        };
        self.lookahead.insert(lookahead).token()
    }

    /// Scan one token from the source.
    fn scan(&mut self) -> Token {
        loop {
            self.skip_horizontal_space();

            let start_pos = self.pos;
            let start_line = self.line;
            let start_col = self.column;

            let kind = match self.peek_char() {
                None => TokenKind::Eof,
                Some('\n') | Some(';') => {
                    self.advance();
                    TokenKind::LineBreak
                }
                Some('(') => {
                    self.advance();
                    TokenKind::Open
                }
                Some(')') => {
                    self.advance();
                    TokenKind::Close
                }
                Some('/') if self.peek_next_char() == Some('/') => {
                    self.skip_comment();
                    continue;
                }
                Some('\\') => match self.scan_continuation() {
                    Ok(()) => continue,
                    Err(e) => TokenKind::Error(e),
                },
                Some('`') => self.scan_raw_string(),
                Some('"') => self.scan_string(),
                Some(_) => self.scan_word(),
            };

            return Token {
                kind,
                span: Span {
                    start: start_pos,
                    end: self.pos,
                    line: start_line,
                    column: start_col,
                },
            };
        }
    }

    /// Scan a bare word, ending at whitespace, `(`, `)` or `;`.
    fn scan_word(&mut self) -> TokenKind {
        let start = self.pos;

        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || matches!(c, '(' | ')' | ';') {
                break;
            }
            self.advance();
        }

        TokenKind::Word(self.source[start..self.pos].to_string())
    }

    /// Scan a backtick string. Newlines are allowed inside.
    fn scan_raw_string(&mut self) -> TokenKind {
        let start = self.pos;
        let start_line = self.line;
        self.advance(); // consume opening backtick

        loop {
            match self.peek_char() {
                None => return TokenKind::Error(LexError::UnterminatedRawString { line: start_line }),
                Some('`') => {
                    self.advance();
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        TokenKind::QuotedString(self.source[start..self.pos].to_string())
    }

    /// Scan a double-quoted string up to its unescaped closing quote.
    ///
    /// Escapes are left in place; only termination is checked here.
    fn scan_string(&mut self) -> TokenKind {
        let start = self.pos;
        let start_line = self.line;
        self.advance(); // consume opening quote
        let mut escaped = false;

        loop {
            match self.peek_char() {
                None => return TokenKind::Error(LexError::UnterminatedString { line: start_line }),
                Some('\n') => return TokenKind::Error(LexError::NewlineInString { line: start_line }),
                Some('"') if !escaped => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    escaped = !escaped;
                    self.advance();
                }
                Some(_) => {
                    escaped = false;
                    self.advance();
                }
            }
        }

        TokenKind::QuotedString(self.source[start..self.pos].to_string())
    }

    /// Handle a backslash at the start of a token.
    ///
    /// Only a line continuation is accepted: the backslash, trailing
    /// horizontal space and the newline are all dropped.
    fn scan_continuation(&mut self) -> Result<(), LexError> {
        self.advance(); // consume backslash
        self.skip_horizontal_space();
        match self.peek_char() {
            None => Err(LexError::BackslashAtEof),
            Some('\n') => {
                self.advance();
                Ok(())
            }
            Some(found) => Err(LexError::StrayBackslash { found }),
        }
    }

    /// Skip a `//` comment up to, but not including, the newline.
    fn skip_comment(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip whitespace other than newlines.
    fn skip_horizontal_space(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' || !c.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        let (i, c) = self.chars.next()?;
        self.pos = i + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}
