//! Program registry
//!
//! Compiled programs are cached per target type. The registry is an explicit
//! object: build one at startup and share it (`Arc<Registry>` or `&Registry`)
//! with every decode call site.
//!
//! Concurrent first use of a type may compile it more than once. Programs for
//! the same type are equivalent, so the first one stored wins and the others
//! are dropped.
//!
//! The registry also bounds how deep nested records may go while decoding,
//! since a self-referential shape can otherwise recurse once per word.

use crate::program::Program;
use crate::Decode;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, trace};
use wordbook_core::{ShapeError, DEFAULT_MAX_DEPTH};

type ErasedProgram = Arc<dyn Any + Send + Sync>;

/// Types whose compilation has started but not finished.
///
/// A nested field that refers back to one of these is a cycle. It is left
/// for run time, when the program it needs is in the cache.
#[derive(Debug, Default)]
pub(crate) struct Compilation {
    in_progress: Vec<TypeId>,
}

impl Compilation {
    fn contains(&self, id: TypeId) -> bool {
        self.in_progress.contains(&id)
    }
}

/// Cache of compiled decode programs, keyed by target type.
pub struct Registry {
    programs: DashMap<TypeId, ErasedProgram>,
    max_depth: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            programs: DashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose decodes fail with `NestingTooDeep` past `limit`
    /// nested records.
    pub fn with_max_depth(limit: usize) -> Self {
        Self {
            max_depth: limit,
            ..Self::default()
        }
    }

    /// Maximum nesting of records within one decode.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of compiled programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Whether `T` has been compiled.
    pub fn contains<T: Decode>(&self) -> bool {
        self.programs.contains_key(&TypeId::of::<T>())
    }

    /// The program for `T`, compiling it (and its nested shapes) if needed.
    pub fn program<T: Decode>(&self) -> Result<Arc<Program<T>>, ShapeError> {
        self.compile_in::<T>(&mut Compilation::default())
    }

    /// Compile the element type of a nested field. Records only.
    pub(crate) fn prepare<T: Decode>(&self, cx: &mut Compilation) -> Result<(), ShapeError> {
        if cx.contains(TypeId::of::<T>()) {
            trace!(
                shape = %crate::shape::short_type_name::<T>(),
                "forward reference to shape under compilation"
            );
            return Ok(());
        }

        let program = self.compile_in::<T>(cx)?;
        if !program.is_record() {
            return Err(ShapeError::NotRecord {
                shape: program.shape().to_string(),
            });
        }
        Ok(())
    }

    fn compile_in<T: Decode>(&self, cx: &mut Compilation) -> Result<Arc<Program<T>>, ShapeError> {
        if let Some(program) = self.cached::<T>() {
            trace!(shape = %program.shape(), "program cache hit");
            return Ok(program);
        }

        let id = TypeId::of::<T>();
        cx.in_progress.push(id);
        let compiled = Program::compile(T::shape(), self, cx);
        cx.in_progress.pop();

        let program = Arc::new(compiled?);
        debug!(
            shape = %program.shape(),
            ops = program.op_count(),
            "compiled decode program"
        );

        let erased: ErasedProgram = program.clone();
        // Clone out of the entry so no shard lock outlives this statement.
        let stored = Arc::clone(self.programs.entry(id).or_insert(erased).value());
        Ok(stored.downcast::<Program<T>>().unwrap_or(program))
    }

    fn cached<T: Decode>(&self) -> Option<Arc<Program<T>>> {
        let erased = self
            .programs
            .get(&TypeId::of::<T>())
            .map(|entry| Arc::clone(entry.value()))?;
        erased.downcast::<Program<T>>().ok()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("programs", &self.programs.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;
    use std::thread;

    #[derive(Debug, Default)]
    struct Leaf {
        name: String,
    }

    impl Decode for Leaf {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("name", |l| &mut l.name)
                .build()
        }
    }

    #[derive(Debug, Default)]
    struct Tree {
        label: String,
        children: Vec<Tree>,
        leaves: Vec<Leaf>,
    }

    impl Decode for Tree {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .scalar("label", |t| &mut t.label)
                .records("children", |t| &mut t.children)
                .rename("child")
                .records("leaves", |t| &mut t.leaves)
                .build()
        }
    }

    #[derive(Debug, Default)]
    struct Tagged {
        tags: Vec<String>,
    }

    impl Decode for Tagged {
        fn shape() -> Shape<Self> {
            Shape::<Self>::builder()
                .records("tags", |t| &mut t.tags)
                .build()
        }
    }

    #[test]
    fn test_program_is_cached() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        let first = registry.program::<Leaf>().unwrap();
        let second = registry.program::<Leaf>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains::<Leaf>());
    }

    #[test]
    fn test_nested_shapes_compile_with_parent() {
        let registry = Registry::new();
        registry.program::<Tree>().unwrap();
        assert!(registry.contains::<Tree>());
        assert!(registry.contains::<Leaf>());
    }

    #[test]
    fn test_self_reference_terminates() {
        let registry = Registry::new();
        let program = registry.program::<Tree>().unwrap();
        assert_eq!(program.shape(), "Tree");
        assert_eq!(program.op_count(), 3);
    }

    #[test]
    fn test_scalar_element_is_rejected() {
        let registry = Registry::new();
        let err = registry.program::<Tagged>().unwrap_err();
        assert_eq!(
            err,
            ShapeError::NotRecord {
                shape: "String".to_string()
            }
        );
        assert!(!registry.contains::<Tagged>());
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(Registry::new().max_depth(), DEFAULT_MAX_DEPTH);
        let registry = Registry::with_max_depth(3);
        assert_eq!(registry.max_depth(), 3);
        assert!(registry.is_empty());
        assert!(format!("{registry:?}").contains("max_depth: 3"));
    }

    #[test]
    fn test_concurrent_first_use() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.program::<Tree>().map(|p| p.op_count()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(3));
        }
        assert_eq!(registry.len(), 2);
    }
}
