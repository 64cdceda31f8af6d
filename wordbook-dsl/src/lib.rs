//! WORDBOOK DSL - Lexer & Parser
//!
//! Turns go.mod-style text into a flat list of [`Value`]s, one per logical
//! line, with parenthesized repetition blocks expanded.
//!
//! Architecture:
//! ```text
//! Source text
//!     ↓
//! Lexer (words, quoted strings, line breaks, parens)
//!     ↓
//! Parser (groups + repetition expansion, unquoting)
//!     ↓
//! Vec<Value> (handed to wordbook-decode)
//! ```

pub mod lexer;
pub mod parser;

pub use lexer::*;
pub use parser::*;

use std::fs;
use std::path::Path;
use tracing::debug;
use wordbook_core::{ParseError, ParseOptions, Value, WordbookError, WordbookResult};

/// Parse `source` with default options (no file name).
pub fn parse_text(source: &str) -> Result<Vec<Value>, ParseError> {
    let options = ParseOptions::default();
    Parser::new(source, &options).parse()
}

/// Parse `source` with explicit options. The options are validated first.
pub fn parse_text_with(source: &str, options: &ParseOptions) -> WordbookResult<Vec<Value>> {
    options.validate()?;
    let values = Parser::new(source, options).parse()?;
    debug!(
        source = %options.source_name,
        values = values.len(),
        "parsed wordbook text"
    );
    Ok(values)
}

/// Read and parse a file, reporting positions against its path.
pub fn parse_file(path: impl AsRef<Path>) -> WordbookResult<Vec<Value>> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| WordbookError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_text_with(&source, &ParseOptions::named(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordbook_core::{ConfigError, SyntaxError};

    #[test]
    fn test_parse_text_uses_no_file() {
        let values = parse_text("module example.com/m").unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].source(), "<no file>");
        assert_eq!(values[0].line(), 1);
    }

    #[test]
    fn test_parse_text_with_validates_options() {
        let options = ParseOptions::named("x").with_max_depth(0);
        let err = parse_text_with("a", &options).unwrap_err();
        assert!(matches!(
            err,
            WordbookError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_text_with_reports_source_name() {
        let err = parse_text_with("a\n)", &ParseOptions::named("go.mod")).unwrap_err();
        match err {
            WordbookError::Parse(e) => {
                assert_eq!(e.kind, SyntaxError::UnexpectedClose.into());
                assert_eq!(e.to_string(), "go.mod:2: unexpected close paren");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_file_missing() {
        let err = parse_file("/definitely/not/here.wb").unwrap_err();
        assert!(matches!(err, WordbookError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.wb"));
    }
}
