//! Shape descriptions
//!
//! A [`Shape`] is the field table of a target type, written by hand in its
//! [`Decode`] impl:
//!
//! ```ignore
//! impl Decode for Command {
//!     fn shape() -> Shape<Self> {
//!         Shape::<Self>::builder()
//!             .identity("name", |c| &mut c.name)
//!             .records("args", |c| &mut c.args)
//!             .build()
//!     }
//! }
//! ```
//!
//! Field order is significant: scalar fields are filled by position, in the
//! order they are declared. Mistakes in the table (a scalar collection that is
//! not last, an identity that is not first) are collected here and reported
//! when the shape is compiled.

use crate::program::{Fault, Scope};
use crate::registry::{Compilation, Registry};
use crate::scalar::Scalar;
use crate::Decode;
use wordbook_core::{DecodeErrorKind, ScalarKind, ShapeError};

/// Runs one field operation: `(target, all words, cursor, scope)` to the
/// number of words consumed from the cursor.
pub(crate) type Apply<T> =
    Box<dyn Fn(&mut T, &[String], usize, Scope<'_>) -> Result<usize, Fault> + Send + Sync>;

/// Compiles an element shape ahead of its first use.
pub(crate) type Prepare = fn(&Registry, &mut Compilation) -> Result<(), ShapeError>;

/// How a field consumes words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// One word, by position.
    Scalar(ScalarKind),
    /// All remaining words, by position. Must be the last field.
    Scalars(ScalarKind),
    /// A repeatable nested record, selected by name.
    Records,
    /// A single nested record, selected by name.
    Record,
}

pub(crate) struct Field<T> {
    pub(crate) name: &'static str,
    pub(crate) selector: String,
    pub(crate) role: Role,
    pub(crate) apply: Apply<T>,
    pub(crate) prepare: Option<Prepare>,
}

pub(crate) enum Body<T> {
    Scalar {
        kind: ScalarKind,
        parse: fn(&str) -> Result<T, String>,
    },
    Record {
        identity: Option<fn(&mut T) -> &mut String>,
        fields: Vec<Field<T>>,
        errors: Vec<ShapeError>,
    },
}

/// Description of how words map onto a target type `T`.
pub struct Shape<T> {
    pub(crate) name: String,
    pub(crate) body: Body<T>,
}

impl<T: Decode> Shape<T> {
    /// The shape of a scalar type: exactly one word, parsed by [`Scalar`].
    pub fn scalar() -> Self
    where
        T: Scalar,
    {
        Self {
            name: short_type_name::<T>(),
            body: Body::Scalar {
                kind: T::KIND,
                parse: T::parse_word,
            },
        }
    }

    /// Start describing a record type.
    pub fn builder() -> ShapeBuilder<T> {
        ShapeBuilder {
            name: short_type_name::<T>(),
            identity: None,
            fields: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Name used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_record(&self) -> bool {
        matches!(self.body, Body::Record { .. })
    }
}

/// Builder for record shapes. See the module docs.
pub struct ShapeBuilder<T> {
    name: String,
    identity: Option<fn(&mut T) -> &mut String>,
    fields: Vec<Field<T>>,
    errors: Vec<ShapeError>,
}

impl<T: Decode> ShapeBuilder<T> {
    /// Override the name used in error messages.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Declare the identity field. Repeated occurrences of this record inside
    /// a parent collection are merged by it. Must come before every other
    /// field.
    pub fn identity(mut self, name: &'static str, get: fn(&mut T) -> &mut String) -> Self {
        if !self.fields.is_empty() || self.identity.is_some() {
            self.errors.push(ShapeError::IdentityNotFirst {
                shape: self.name.clone(),
                field: name.to_string(),
            });
        } else if name.is_empty() {
            self.errors.push(ShapeError::EmptyFieldName {
                shape: self.name.clone(),
            });
        } else {
            self.identity = Some(get);
        }
        self
    }

    /// A scalar field, filled from the word at its position.
    pub fn scalar<F: Scalar>(self, name: &'static str, get: fn(&mut T) -> &mut F) -> Self {
        let apply: Apply<T> = Box::new(move |target, words, at, _| {
            *get(target) = parse_at::<F>(words, at)?;
            Ok(1)
        });
        self.push(name, Role::Scalar(F::KIND), apply, None)
    }

    /// A scalar collection, filled from every remaining word.
    pub fn scalars<F: Scalar>(self, name: &'static str, get: fn(&mut T) -> &mut Vec<F>) -> Self {
        let apply: Apply<T> = Box::new(move |target, words, at, _| {
            let items = get(target);
            for offset in at..words.len() {
                items.push(parse_at::<F>(words, offset)?);
            }
            Ok(words.len().saturating_sub(at))
        });
        self.push(name, Role::Scalars(F::KIND), apply, None)
    }

    /// A repeatable nested record. Each occurrence appends an element, or
    /// merges into an existing one when `E` declares an identity.
    pub fn records<E: Decode>(self, name: &'static str, get: fn(&mut T) -> &mut Vec<E>) -> Self {
        self.collection(name, get, |e| e, |e| e)
    }

    /// Like [`records`](Self::records) for boxed elements.
    pub fn boxed_records<E: Decode>(
        self,
        name: &'static str,
        get: fn(&mut T) -> &mut Vec<Box<E>>,
    ) -> Self {
        self.collection(name, get, Box::new, |e| &mut **e)
    }

    /// A single nested record, created on first use.
    pub fn record<E: Decode>(self, name: &'static str, get: fn(&mut T) -> &mut Option<E>) -> Self {
        self.optional(name, get, |e| e, |e| e)
    }

    /// Like [`record`](Self::record) for a boxed record.
    pub fn boxed_record<E: Decode>(
        self,
        name: &'static str,
        get: fn(&mut T) -> &mut Option<Box<E>>,
    ) -> Self {
        self.optional(name, get, Box::new, |e| &mut **e)
    }

    /// Match the previous field by `selector` instead of its name.
    pub fn rename(mut self, selector: &'static str) -> Self {
        match self.fields.last_mut() {
            Some(field) if !selector.is_empty() => field.selector = selector.to_string(),
            Some(_) => self.errors.push(ShapeError::EmptyFieldName {
                shape: self.name.clone(),
            }),
            None => self.errors.push(ShapeError::RenameWithoutField {
                shape: self.name.clone(),
            }),
        }
        self
    }

    pub fn build(self) -> Shape<T> {
        Shape {
            name: self.name,
            body: Body::Record {
                identity: self.identity,
                fields: self.fields,
                errors: self.errors,
            },
        }
    }

    fn collection<E: Decode, W: 'static>(
        self,
        name: &'static str,
        get: fn(&mut T) -> &mut Vec<W>,
        wrap: fn(E) -> W,
        unwrap: fn(&mut W) -> &mut E,
    ) -> Self {
        let apply: Apply<T> = Box::new(move |target, words, at, scope| {
            let program = scope.registry.program::<E>()?;
            let inner = scope.nested()?;
            let items = get(target);
            let rest = &words[at..];

            let (index, rest) = match program.identity() {
                Some(identity) => {
                    let (key, rest) = rest.split_first().ok_or_else(|| {
                        DecodeErrorKind::MissingIdentity {
                            shape: program.shape().to_string(),
                        }
                    })?;
                    let found = items
                        .iter_mut()
                        .position(|item| identity(unwrap(item)).as_str() == key.as_str());
                    let index = match found {
                        Some(index) => index,
                        None => {
                            let mut element = E::default();
                            *identity(&mut element) = key.clone();
                            items.push(wrap(element));
                            items.len() - 1
                        }
                    };
                    (index, rest)
                }
                None => {
                    items.push(wrap(E::default()));
                    (items.len() - 1, rest)
                }
            };

            program.run(unwrap(&mut items[index]), rest, inner)?;
            Ok(words.len() - at)
        });
        self.push(name, Role::Records, apply, Some(Registry::prepare::<E>))
    }

    fn optional<E: Decode, W: 'static>(
        self,
        name: &'static str,
        get: fn(&mut T) -> &mut Option<W>,
        wrap: fn(E) -> W,
        unwrap: fn(&mut W) -> &mut E,
    ) -> Self {
        let apply: Apply<T> = Box::new(move |target, words, at, scope| {
            let program = scope.registry.program::<E>()?;
            let inner = scope.nested()?;
            let element = unwrap(get(target).get_or_insert_with(|| wrap(E::default())));
            let mut rest = &words[at..];

            if let Some(identity) = program.identity() {
                let (key, tail) = rest.split_first().ok_or_else(|| {
                    DecodeErrorKind::MissingIdentity {
                        shape: program.shape().to_string(),
                    }
                })?;
                *identity(element) = key.clone();
                rest = tail;
            }

            program.run(element, rest, inner)?;
            Ok(words.len() - at)
        });
        self.push(name, Role::Record, apply, Some(Registry::prepare::<E>))
    }

    fn push(
        mut self,
        name: &'static str,
        role: Role,
        apply: Apply<T>,
        prepare: Option<Prepare>,
    ) -> Self {
        if name.is_empty() {
            self.errors.push(ShapeError::EmptyFieldName {
                shape: self.name.clone(),
            });
        }
        self.fields.push(Field {
            name,
            selector: name.to_string(),
            role,
            apply,
            prepare,
        });
        self
    }
}

fn parse_at<F: Scalar>(words: &[String], at: usize) -> Result<F, Fault> {
    let word = words.get(at).map(String::as_str).unwrap_or_default();
    F::parse_word(word).map_err(|reason| {
        Fault::from(DecodeErrorKind::InvalidScalar {
            kind: F::KIND,
            word: word.to_string(),
            offset: at,
            reason,
        })
    })
}

/// `std::any::type_name` without module paths: `Vec<String>` rather than
/// `alloc::vec::Vec<alloc::string::String>`.
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut pieces = full.split("::").peekable();

    while let Some(piece) = pieces.next() {
        if pieces.peek().is_none() {
            out.push_str(piece);
            break;
        }
        // Keep whatever precedes the path segment, e.g. the `Vec<` of `Vec<alloc`.
        let cut = piece
            .char_indices()
            .rev()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(0, |(i, c)| i + c.len_utf8());
        out.push_str(&piece[..cut]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Pair {
        name: String,
        count: u32,
        rest: Vec<String>,
    }

    impl Decode for Pair {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .identity("name", |p| &mut p.name)
                .scalar("count", |p| &mut p.count)
                .scalars("rest", |p| &mut p.rest)
                .build()
        }
    }

    fn errors<T>(shape: Shape<T>) -> Vec<ShapeError> {
        match shape.body {
            Body::Record { errors, .. } => errors,
            Body::Scalar { .. } => Vec::new(),
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<i64>(), "i64");
        assert_eq!(short_type_name::<String>(), "String");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec<String>");
        assert_eq!(short_type_name::<Pair>(), "Pair");
        assert_eq!(
            short_type_name::<Option<Box<Pair>>>(),
            "Option<Box<Pair>>"
        );
    }

    #[test]
    fn test_builder_records_fields_in_order() {
        let shape = Pair::shape();
        assert_eq!(shape.name(), "Pair");
        assert!(shape.is_record());
        match shape.body {
            Body::Record {
                identity,
                fields,
                errors,
            } => {
                assert!(identity.is_some());
                assert!(errors.is_empty());
                let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
                assert_eq!(names, ["count", "rest"]);
                assert_eq!(fields[0].role, Role::Scalar(ScalarKind::Uint));
                assert_eq!(fields[1].role, Role::Scalars(ScalarKind::String));
            }
            Body::Scalar { .. } => panic!("expected record"),
        }
    }

    #[test]
    fn test_scalar_shape() {
        let shape = <f64 as Decode>::shape();
        assert_eq!(shape.name(), "f64");
        assert!(!shape.is_record());
    }

    #[test]
    fn test_identity_after_field_is_an_error() {
        let shape = Shape::<Pair>::builder()
            .scalar("count", |p| &mut p.count)
            .identity("name", |p| &mut p.name)
            .build();
        assert_eq!(
            errors(shape),
            vec![ShapeError::IdentityNotFirst {
                shape: "Pair".to_string(),
                field: "name".to_string(),
            }]
        );
    }

    #[test]
    fn test_rename() {
        let shape = Shape::<Pair>::builder()
            .scalar("count", |p| &mut p.count)
            .rename("n")
            .build();
        match shape.body {
            Body::Record { fields, .. } => assert_eq!(fields[0].selector, "n"),
            Body::Scalar { .. } => panic!("expected record"),
        }

        let shape = Shape::<Pair>::builder().named("P").rename("n").build();
        assert_eq!(
            errors(shape),
            vec![ShapeError::RenameWithoutField {
                shape: "P".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_field_name() {
        let shape = Shape::<Pair>::builder()
            .scalar("", |p| &mut p.count)
            .build();
        assert!(matches!(
            errors(shape).as_slice(),
            [ShapeError::EmptyFieldName { .. }]
        ));
    }
}
