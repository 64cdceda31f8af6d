//! Error types for WORDBOOK operations
//!
//! Four families that are never merged into one another: lexical and
//! structural errors (both surfaced as [`ParseError`]), shape errors raised
//! while compiling a decode program, and decode errors raised per value.

use crate::{Position, ScalarKind};
use thiserror::Error;

/// Render `source:line: ` for errors that may or may not carry a position.
fn located(position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!("{pos}: "),
        None => String::new(),
    }
}

/// Lexical errors. Once the lexer produces one it keeps returning it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated raw string started on line {line}")]
    UnterminatedRawString { line: usize },

    #[error("unterminated double-quoted string started on line {line}")]
    UnterminatedString { line: usize },

    #[error("newline in double-quoted string started on line {line}")]
    NewlineInString { line: usize },

    #[error("backslash at end of input")]
    BackslashAtEof,

    #[error("backslash must be followed by a newline, found {found:?}")]
    StrayBackslash { found: char },
}

/// Structural (grammar) errors raised by the parser.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unexpected newline")]
    UnexpectedNewline,

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected close paren")]
    UnexpectedClose,

    #[error("close delimiter must be followed by a separator, end of input, or another close delimiter")]
    CloseNotFollowed,

    #[error("invalid quoted string {literal}: {reason}")]
    InvalidQuotedString { literal: String, reason: String },

    #[error("repetition blocks nested deeper than {limit}")]
    NestingTooDeep { limit: usize },
}

/// What went wrong while parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

/// A parse failure at a source position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{position}: {kind}")]
pub struct ParseError {
    pub position: Position,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(position: Position, kind: impl Into<ParseErrorKind>) -> Self {
        Self {
            position,
            kind: kind.into(),
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Lex(_))
    }
}

/// Errors in a shape description, found when its program is compiled.
///
/// These are programming errors in the target type's description, not data
/// errors; retrying with other input cannot fix them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("{shape} is not a record")]
    NotRecord { shape: String },

    #[error("scalar collection field {field} must be last field in {shape}")]
    ScalarsNotLast { shape: String, field: String },

    #[error("identity field {field} must be the first field of {shape}")]
    IdentityNotFirst { shape: String, field: String },

    #[error("selector {selector:?} is used by more than one field of {shape}")]
    DuplicateSelector { shape: String, selector: String },

    #[error("{shape} has a field with an empty name")]
    EmptyFieldName { shape: String },

    #[error("rename in {shape} does not follow a field")]
    RenameWithoutField { shape: String },
}

/// What went wrong while decoding a value.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecodeErrorKind {
    #[error("could not set {word:?} at index {offset} into value of type {shape}, words={words:?}")]
    Unmatched {
        word: String,
        offset: usize,
        shape: String,
        words: Vec<String>,
    },

    #[error("invalid {kind} {word:?} at index {offset}: {reason}")]
    InvalidScalar {
        kind: ScalarKind,
        word: String,
        offset: usize,
        reason: String,
    },

    #[error("scalar requires exactly one word, got {count}")]
    ScalarArity { count: usize },

    #[error("key {selector:?} occurs more than once")]
    Duplicate { selector: String },

    #[error("no words left for the identity of {shape}")]
    MissingIdentity { shape: String },

    #[error("value has no words")]
    EmptyValue,

    #[error("nested records deeper than {limit}")]
    NestingTooDeep { limit: usize },
}

/// A decode failure, prefixed with the value's position when it has one.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{}{kind}", located(.position))]
pub struct DecodeError {
    pub position: Option<Position>,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(position: Option<Position>, kind: DecodeErrorKind) -> Self {
        Self { position, kind }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all WORDBOOK errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WordbookError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("{}{error}", located(.position))]
    Shape {
        position: Option<Position>,
        error: ShapeError,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },
}

impl From<ShapeError> for WordbookError {
    fn from(error: ShapeError) -> Self {
        WordbookError::Shape {
            position: None,
            error,
        }
    }
}

impl WordbookError {
    /// Attach a position to a shape error that was raised without one.
    pub fn at(self, position: Option<Position>) -> Self {
        match self {
            WordbookError::Shape {
                position: None,
                error,
            } => WordbookError::Shape { position, error },
            other => other,
        }
    }
}

/// Result type alias for WORDBOOK operations.
pub type WordbookResult<T> = Result<T, WordbookError>;

// =============================================================================
// TESTS
// =============================================================================
