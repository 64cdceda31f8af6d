//! WORDBOOK Core - Shared Types
//!
//! Data types shared by the lexer/parser (`wordbook-dsl`) and the decode
//! engine (`wordbook-decode`). This crate holds no parsing or decoding logic:
//! only the parsed `Value`, source positions, scalar kinds, parse options and
//! the error taxonomy.

pub mod config;
pub mod error;
pub mod value;

pub use config::*;
pub use error::*;
pub use value::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// SCALAR KINDS
// ============================================================================

/// The family a scalar target type belongs to.
///
/// Used in shape descriptions and decode errors; the concrete Rust width
/// (`i8`, `u64`, ...) is validated by the parser of the target type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    String,
    Int,
    Uint,
    Float,
    Bool,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::String => "string",
            ScalarKind::Int => "integer",
            ScalarKind::Uint => "unsigned integer",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
        };
        f.write_str(name)
    }
}
