//! WORDBOOK Decode - Typed decoding of parsed values
//!
//! Maps the flat [`Value`](wordbook_core::Value)s produced by `wordbook-dsl`
//! onto Rust types. Each target type describes its fields once in a
//! [`Decode`] impl; the description is compiled into a [`Program`] and cached
//! in a [`Registry`].
//!
//! ```ignore
//! let registry = Registry::new();
//! let manifest: Manifest = decode_text(&registry, "require example.com/a v1")?;
//! ```

pub mod decode;
pub mod program;
pub mod registry;
pub mod scalar;
pub mod shape;

pub use decode::*;
pub use program::Program;
pub use registry::Registry;
pub use scalar::Scalar;
pub use shape::{Shape, ShapeBuilder};

/// A type that can be decoded from words.
///
/// Records implement this by hand with [`Shape::builder`]; the scalar types
/// (`String`, `bool`, the integer and float primitives) implement it via
/// [`Shape::scalar`].
pub trait Decode: Default + 'static {
    fn shape() -> Shape<Self>;
}
