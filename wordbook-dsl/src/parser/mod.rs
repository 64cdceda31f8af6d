//! Parser module for WORDBOOK

pub mod parser;
mod unquote;

pub use parser::*;
pub use unquote::unquote;
