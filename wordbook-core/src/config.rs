//! Configuration types

use crate::{ConfigError, NO_FILE};
use serde::{Deserialize, Serialize};

/// Default limit on nested repetition blocks.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options for parsing one source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Name reported in positions (`source:line:`), usually a file path.
    pub source_name: String,
    /// Maximum nesting of parenthesized repetition blocks.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            source_name: NO_FILE.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Default options reporting positions against `source_name`.
    pub fn named(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Validate the options.
    ///
    /// Validates:
    /// - source_name is not blank
    /// - max_depth > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "source_name".to_string(),
            });
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_depth".to_string(),
                value: self.max_depth.to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}
