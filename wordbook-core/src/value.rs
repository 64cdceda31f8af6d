//! Parsed values and source positions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source name used when text does not come from a file.
pub const NO_FILE: &str = "<no file>";

/// A location in a source text, reported as `source:line`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub source: String,
    pub line: usize,
}

impl Position {
    pub fn new(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

/// One parsed record: an ordered list of words plus where it came from.
///
/// Values are produced by the parser and handed to the decode engine; they
/// are never modified after creation. Expanding a repetition block creates
/// new values via [`Value::prefixed`] instead of mutating the inner ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    words: Vec<String>,
    source: String,
    line: usize,
}

impl Value {
    /// Create a value with a known source position.
    pub fn new(words: Vec<String>, source: impl Into<String>, line: usize) -> Self {
        Self {
            words,
            source: source.into(),
            line,
        }
    }

    /// Create a value with no source position (line 0).
    ///
    /// Handy for decoding word lists that did not come from parsed text.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            source: NO_FILE.to_string(),
            line: 0,
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Position for error reporting. Values without a line have none.
    pub fn position(&self) -> Option<Position> {
        (self.line > 0).then(|| Position::new(self.source.clone(), self.line))
    }

    /// A new value whose words are `prefix` followed by this value's words.
    /// Source and line are kept from `self`.
    pub fn prefixed(self, prefix: &[String]) -> Self {
        if prefix.is_empty() {
            return self;
        }
        let mut words = Vec::with_capacity(prefix.len() + self.words.len());
        words.extend_from_slice(prefix);
        words.extend(self.words);
        Self {
            words,
            source: self.source,
            line: self.line,
        }
    }

    pub fn into_words(self) -> Vec<String> {
        self.words
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write_word(f, word)?;
        }
        Ok(())
    }
}

/// Reports whether a word must be quoted to read back as the same word.
pub fn needs_quoting(word: &str) -> bool {
    word.is_empty()
        || word.starts_with("//")
        || word.starts_with(['\\', '"', '`'])
        || word
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '(' | ')' | ';'))
}

fn write_word(f: &mut fmt::Formatter<'_>, word: &str) -> fmt::Result {
    if !needs_quoting(word) {
        return f.write_str(word);
    }
    f.write_str("\"")?;
    for c in word.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() && (c as u32) < 0x80 => write!(f, "\\x{:02x}", c as u32)?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new("go.mod", 7).to_string(), "go.mod:7");
    }

    #[test]
    fn test_position_absent_without_line() {
        let v = Value::from_words(["a", "b"]);
        assert_eq!(v.position(), None);
        assert_eq!(v.words(), ["a", "b"]);
    }

    #[test]
    fn test_prefixed_keeps_position() {
        let inner = Value::new(vec!["b".into(), "c".into()], "f.txt", 3);
        let prefix = vec!["a".to_string()];
        let v = inner.prefixed(&prefix);
        assert_eq!(v.words(), ["a", "b", "c"]);
        assert_eq!(v.position(), Some(Position::new("f.txt", 3)));
    }

    #[test]
    fn test_display_quotes_when_needed() {
        let v = Value::from_words(["require", "a b", "", "x(y)", "say \"hi\"", "//c"]);
        assert_eq!(
            v.to_string(),
            r#"require "a b" "" "x(y)" "say \"hi\"" "//c""#
        );
    }

    #[test]
    fn test_display_leaves_inner_slashes() {
        let v = Value::from_words(["/path/name", "not//a", "b\\c"]);
        assert_eq!(v.to_string(), "/path/name not//a b\\c");
    }

    #[test]
    fn test_value_serde() {
        let v = Value::new(vec!["x".into()], "f", 2);
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
