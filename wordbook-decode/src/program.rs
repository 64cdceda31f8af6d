//! Compiled decode programs
//!
//! A [`Program`] is a [`Shape`] turned into lookup tables. Scalar fields are
//! keyed by word offset; nested records are keyed by selector word. The
//! executor walks the words of a value, preferring an operation at the
//! current offset and falling back to a selector match on the current word.

use crate::registry::{Compilation, Registry};
use crate::shape::{Apply, Body, Field, Role, Shape};
use crate::Decode;
use std::collections::{HashMap, HashSet};
use wordbook_core::{
    DecodeError, DecodeErrorKind, Position, ScalarKind, ShapeError, WordbookError,
};

/// Where a running program is: the registry nested programs come from, and
/// how many nested records deep the current value is.
#[derive(Clone, Copy)]
pub(crate) struct Scope<'r> {
    pub(crate) registry: &'r Registry,
    depth: usize,
}

impl<'r> Scope<'r> {
    pub(crate) fn new(registry: &'r Registry) -> Self {
        Self { registry, depth: 0 }
    }

    /// The scope of a nested record, or an error past the registry's limit.
    pub(crate) fn nested(self) -> Result<Self, Fault> {
        let limit = self.registry.max_depth();
        if self.depth >= limit {
            return Err(DecodeErrorKind::NestingTooDeep { limit }.into());
        }
        Ok(Self {
            registry: self.registry,
            depth: self.depth + 1,
        })
    }
}

/// Failure raised while running a program; gains a position at the API edge.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fault {
    Shape(ShapeError),
    Decode(DecodeErrorKind),
}

impl From<ShapeError> for Fault {
    fn from(error: ShapeError) -> Self {
        Fault::Shape(error)
    }
}

impl From<DecodeErrorKind> for Fault {
    fn from(kind: DecodeErrorKind) -> Self {
        Fault::Decode(kind)
    }
}

impl Fault {
    pub(crate) fn at(self, position: Option<Position>) -> WordbookError {
        match self {
            Fault::Shape(error) => WordbookError::from(error).at(position),
            Fault::Decode(kind) => DecodeError::new(position, kind).into(),
        }
    }
}

struct Slot<T> {
    role: Role,
    apply: Apply<T>,
}

struct Record<T> {
    identity: Option<fn(&mut T) -> &mut String>,
    slots: Vec<Slot<T>>,
    /// Offset to slot, for scalar and scalar collection fields.
    positional: HashMap<usize, usize>,
    /// Selector to slot, for nested record fields. Includes lower-first variants.
    named: HashMap<String, usize>,
    /// Selector to slot for every field; used when decoding a value sequence.
    selectors: HashMap<String, usize>,
}

enum Kind<T> {
    Scalar {
        kind: ScalarKind,
        parse: fn(&str) -> Result<T, String>,
    },
    Record(Record<T>),
}

/// The compiled decode strategy for one target type.
pub struct Program<T> {
    shape: String,
    kind: Kind<T>,
}

impl<T> std::fmt::Debug for Program<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl<T: Decode> Program<T> {
    /// Compile `shape`, compiling the shapes of its nested records first.
    pub(crate) fn compile(
        shape: Shape<T>,
        registry: &Registry,
        cx: &mut Compilation,
    ) -> Result<Self, ShapeError> {
        let Shape { name, body } = shape;
        let kind = match body {
            Body::Scalar { kind, parse } => Kind::Scalar { kind, parse },
            Body::Record {
                identity,
                fields,
                errors,
            } => {
                if let Some(error) = errors.into_iter().next() {
                    return Err(error);
                }
                Kind::Record(compile_record(&name, identity, fields, registry, cx)?)
            }
        };
        Ok(Self { shape: name, kind })
    }

    /// Name of the shape this program decodes.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn is_record(&self) -> bool {
        matches!(self.kind, Kind::Record(_))
    }

    /// Number of field operations (zero for scalars).
    pub fn op_count(&self) -> usize {
        match &self.kind {
            Kind::Scalar { .. } => 0,
            Kind::Record(record) => record.slots.len(),
        }
    }

    pub(crate) fn identity(&self) -> Option<fn(&mut T) -> &mut String> {
        match &self.kind {
            Kind::Record(record) => record.identity,
            Kind::Scalar { .. } => None,
        }
    }

    /// Decode one value's words into `target`.
    ///
    /// A scalar takes exactly one word. A record with an identity takes its
    /// key from the first word, then runs on the rest.
    pub(crate) fn decode(
        &self,
        target: &mut T,
        words: &[String],
        scope: Scope<'_>,
    ) -> Result<(), Fault> {
        match &self.kind {
            Kind::Scalar { kind, parse } => {
                let [word] = words else {
                    return Err(DecodeErrorKind::ScalarArity { count: words.len() }.into());
                };
                *target = parse(word).map_err(|reason| DecodeErrorKind::InvalidScalar {
                    kind: *kind,
                    word: word.clone(),
                    offset: 0,
                    reason,
                })?;
                Ok(())
            }
            Kind::Record(record) => match record.identity {
                Some(identity) => {
                    let (key, rest) =
                        words
                            .split_first()
                            .ok_or_else(|| DecodeErrorKind::MissingIdentity {
                                shape: self.shape.clone(),
                            })?;
                    *identity(target) = key.clone();
                    self.run(target, rest, scope)
                }
                None => self.run(target, words, scope),
            },
        }
    }

    /// Run the program over `words`; every word must be consumed.
    pub(crate) fn run(
        &self,
        target: &mut T,
        words: &[String],
        scope: Scope<'_>,
    ) -> Result<(), Fault> {
        let record = self.record()?;
        let mut at = 0;

        while at < words.len() {
            if let Some(&index) = record.positional.get(&at) {
                at += (record.slots[index].apply)(target, words, at, scope)?;
                continue;
            }

            let Some(index) = lookup(&record.named, &words[at]) else {
                return Err(DecodeErrorKind::Unmatched {
                    word: words[at].clone(),
                    offset: at,
                    shape: self.shape.clone(),
                    words: words.to_vec(),
                }
                .into());
            };
            // The selector word is not passed to the operation.
            at += 1;
            at += (record.slots[index].apply)(target, words, at, scope)?;
        }

        Ok(())
    }

    /// Apply one value of a sequence: its first word selects any field.
    ///
    /// `seen` tracks fields that may appear only once across the sequence.
    pub(crate) fn apply_selected(
        &self,
        target: &mut T,
        words: &[String],
        scope: Scope<'_>,
        seen: &mut HashSet<usize>,
    ) -> Result<(), Fault> {
        let record = self.record()?;
        let selector = words.first().ok_or(DecodeErrorKind::EmptyValue)?;

        let Some(index) = lookup(&record.selectors, selector) else {
            return Err(DecodeErrorKind::Unmatched {
                word: selector.clone(),
                offset: 0,
                shape: self.shape.clone(),
                words: words.to_vec(),
            }
            .into());
        };

        let slot = &record.slots[index];
        let unique = match slot.role {
            Role::Scalar(_) => {
                let count = words.len() - 1;
                if count != 1 {
                    return Err(DecodeErrorKind::ScalarArity { count }.into());
                }
                true
            }
            Role::Record => true,
            Role::Scalars(_) | Role::Records => false,
        };
        if unique && !seen.insert(index) {
            return Err(DecodeErrorKind::Duplicate {
                selector: selector.clone(),
            }
            .into());
        }

        (slot.apply)(target, words, 1, scope)?;
        Ok(())
    }

    fn record(&self) -> Result<&Record<T>, ShapeError> {
        match &self.kind {
            Kind::Record(record) => Ok(record),
            Kind::Scalar { .. } => Err(ShapeError::NotRecord {
                shape: self.shape.clone(),
            }),
        }
    }
}

fn compile_record<T: Decode>(
    shape: &str,
    identity: Option<fn(&mut T) -> &mut String>,
    fields: Vec<Field<T>>,
    registry: &Registry,
    cx: &mut Compilation,
) -> Result<Record<T>, ShapeError> {
    let last = fields.len().saturating_sub(1);
    let mut positional = HashMap::new();
    let mut named = HashMap::new();
    let mut selectors = HashMap::new();
    let mut slots = Vec::with_capacity(fields.len());
    let mut offset = 0;

    for (index, field) in fields.into_iter().enumerate() {
        match field.role {
            Role::Scalar(_) => {
                positional.insert(offset, index);
                offset += 1;
            }
            Role::Scalars(_) => {
                if index != last {
                    return Err(ShapeError::ScalarsNotLast {
                        shape: shape.to_string(),
                        field: field.name.to_string(),
                    });
                }
                positional.insert(offset, index);
            }
            Role::Records | Role::Record => {
                register(&mut named, shape, &field.selector, index)?;
            }
        }
        register(&mut selectors, shape, &field.selector, index)?;

        if let Some(prepare) = field.prepare {
            prepare(registry, cx)?;
        }

        slots.push(Slot {
            role: field.role,
            apply: field.apply,
        });
    }

    Ok(Record {
        identity,
        slots,
        positional,
        named,
        selectors,
    })
}

/// Register `selector` and its lower-first variant for `index`.
fn register(
    table: &mut HashMap<String, usize>,
    shape: &str,
    selector: &str,
    index: usize,
) -> Result<(), ShapeError> {
    for key in [selector.to_string(), lower_first(selector)] {
        match table.get(&key) {
            Some(&existing) if existing != index => {
                return Err(ShapeError::DuplicateSelector {
                    shape: shape.to_string(),
                    selector: key,
                });
            }
            Some(_) => {}
            None => {
                table.insert(key, index);
            }
        }
    }
    Ok(())
}

/// Find the slot for `word`: lower-first form, then its plural.
fn lookup(table: &HashMap<String, usize>, word: &str) -> Option<usize> {
    let word = lower_first(word);
    table
        .get(&word)
        .or_else(|| table.get(&plural(&word)))
        .copied()
}

pub(crate) fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Naive English plural: `es` after `s` or `x`, otherwise `s`.
pub(crate) fn plural(word: &str) -> String {
    if word.is_empty() {
        String::new()
    } else if word.ends_with(['s', 'x']) {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Thing {
        count: i64,
        good: bool,
    }

    impl Decode for Thing {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("count", |t| &mut t.count)
                .scalar("good", |t| &mut t.good)
                .build()
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Shelf {
        boxes: Vec<Thing>,
        taxes: Vec<Thing>,
    }

    impl Decode for Shelf {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .records("Boxes", |b| &mut b.boxes)
                .records("taxes", |b| &mut b.taxes)
                .build()
        }
    }

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn compile<T: Decode>(registry: &Registry) -> Program<T> {
        let mut cx = Compilation::default();
        Program::compile(T::shape(), registry, &mut cx).unwrap()
    }

    #[test]
    fn test_lower_first_and_plural() {
        assert_eq!(lower_first("Require"), "require");
        assert_eq!(lower_first("require"), "require");
        assert_eq!(lower_first("Élan"), "élan");
        assert_eq!(lower_first(""), "");
        assert_eq!(plural("require"), "requires");
        assert_eq!(plural("box"), "boxes");
        assert_eq!(plural("bus"), "buses");
        assert_eq!(plural(""), "");
    }

    #[test]
    fn test_positional_run() {
        let registry = Registry::new();
        let program = compile::<Thing>(&registry);
        let mut thing = Thing::default();
        program.run(&mut thing, &words("17 true"), Scope::new(&registry)).unwrap();
        assert_eq!(thing, Thing { count: 17, good: true });
    }

    #[test]
    fn test_short_value_leaves_defaults() {
        let registry = Registry::new();
        let program = compile::<Thing>(&registry);
        let mut thing = Thing::default();
        program.run(&mut thing, &words("4"), Scope::new(&registry)).unwrap();
        assert_eq!(thing, Thing { count: 4, good: false });
    }

    #[test]
    fn test_extra_word_is_unmatched() {
        let registry = Registry::new();
        let program = compile::<Thing>(&registry);
        let mut thing = Thing::default();
        let err = program
            .run(&mut thing, &words("1 false extra"), Scope::new(&registry))
            .unwrap_err();
        assert_eq!(
            err,
            Fault::Decode(DecodeErrorKind::Unmatched {
                word: "extra".to_string(),
                offset: 2,
                shape: "Thing".to_string(),
                words: words("1 false extra"),
            })
        );
    }

    #[test]
    fn test_invalid_scalar_names_offset() {
        let registry = Registry::new();
        let program = compile::<Thing>(&registry);
        let mut thing = Thing::default();
        let err = program
            .run(&mut thing, &words("1 yes"), Scope::new(&registry))
            .unwrap_err();
        assert!(matches!(
            err,
            Fault::Decode(DecodeErrorKind::InvalidScalar { offset: 1, ref word, .. }) if word == "yes"
        ));
    }

    #[test]
    fn test_selector_matching() {
        let registry = Registry::new();
        let program = compile::<Shelf>(&registry);
        let mut target = Shelf::default();
        for text in ["Boxes 1", "boxes 2", "box 3", "Box 4", "tax 5", "Taxes 6"] {
            program.run(&mut target, &words(text), Scope::new(&registry)).unwrap();
        }
        let counts: Vec<i64> = target.boxes.iter().map(|t| t.count).collect();
        assert_eq!(counts, [1, 2, 3, 4]);
        assert_eq!(target.taxes.len(), 2);

        let err = program
            .run(&mut target, &words("BOX 7"), Scope::new(&registry))
            .unwrap_err();
        assert!(matches!(err, Fault::Decode(DecodeErrorKind::Unmatched { .. })));
    }

    #[test]
    fn test_scalar_program_is_not_a_record() {
        let registry = Registry::new();
        let program = compile::<u8>(&registry);
        assert!(!program.is_record());
        assert_eq!(program.op_count(), 0);

        let mut n = 0u8;
        program.decode(&mut n, &words("200"), Scope::new(&registry)).unwrap();
        assert_eq!(n, 200);

        let err = program.run(&mut n, &words("1"), Scope::new(&registry)).unwrap_err();
        assert_eq!(
            err,
            Fault::Shape(ShapeError::NotRecord {
                shape: "u8".to_string()
            })
        );
    }

    #[test]
    fn test_scope_nesting_stops_at_limit() {
        let registry = Registry::with_max_depth(2);
        let scope = Scope::new(&registry).nested().unwrap().nested().unwrap();
        assert_eq!(scope.depth, 2);
        assert_eq!(
            scope.nested().err(),
            Some(Fault::Decode(DecodeErrorKind::NestingTooDeep { limit: 2 }))
        );
    }

    #[test]
    fn test_scalar_arity() {
        let registry = Registry::new();
        let program = compile::<String>(&registry);
        let mut s = String::new();
        let err = program
            .decode(&mut s, &words("x y"), Scope::new(&registry))
            .unwrap_err();
        assert_eq!(err, Fault::Decode(DecodeErrorKind::ScalarArity { count: 2 }));
    }
}
