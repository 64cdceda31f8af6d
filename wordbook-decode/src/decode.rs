//! Decode entry points

use crate::program::Scope;
use crate::registry::Registry;
use crate::Decode;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use wordbook_core::{ShapeError, Value, WordbookError, WordbookResult};

/// Decode a single value into `target`.
///
/// Scalar targets take exactly one word. Record targets fill scalar fields
/// by position and dispatch nested records by selector word.
pub fn decode_one<T: Decode>(
    registry: &Registry,
    value: &Value,
    target: &mut T,
) -> WordbookResult<()> {
    let program = registry
        .program::<T>()
        .map_err(|e| WordbookError::from(e).at(value.position()))?;
    program
        .decode(target, value.words(), Scope::new(registry))
        .map_err(|fault| fault.at(value.position()))
}

/// Decode a sequence of values into one record.
///
/// The first word of each value selects a field of `T`:
/// - a scalar field takes exactly one more word, and may be set only once;
/// - a scalar collection appends the remaining words;
/// - a nested record collection appends (or merges, by identity) an element;
/// - a single nested record may be set only once.
///
/// Decoding stops at the first error.
pub fn decode_many<T: Decode>(
    registry: &Registry,
    values: &[Value],
    target: &mut T,
) -> WordbookResult<()> {
    let program = registry.program::<T>()?;
    if !program.is_record() {
        return Err(ShapeError::NotRecord {
            shape: program.shape().to_string(),
        }
        .into());
    }

    let scope = Scope::new(registry);
    let mut seen = HashSet::new();
    for value in values {
        program
            .apply_selected(target, value.words(), scope, &mut seen)
            .map_err(|fault| fault.at(value.position()))?;
    }

    debug!(shape = %program.shape(), values = values.len(), "decoded values");
    Ok(())
}

/// Parse `source` and decode all of its values into a new `T`.
pub fn decode_text<T: Decode>(registry: &Registry, source: &str) -> WordbookResult<T> {
    let values = wordbook_dsl::parse_text(source)?;
    let mut target = T::default();
    decode_many(registry, &values, &mut target)?;
    Ok(target)
}

/// Read, parse and decode a file into a new `T`.
pub fn decode_file<T: Decode>(registry: &Registry, path: impl AsRef<Path>) -> WordbookResult<T> {
    let values = wordbook_dsl::parse_file(path)?;
    let mut target = T::default();
    decode_many(registry, &values, &mut target)?;
    Ok(target)
}
