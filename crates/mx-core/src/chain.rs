//! Delegation-chain roots and the object model that issues instances.
//!
//! A chain root is a named ancestor with its own method table and an
//! optional parent.  Instances bound to a root see every method of that
//! root and of its ancestors, nearest first.  Roots form trees; a single
//! composed behavior only ever narrows along one path of such a tree.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::{ChainRootId, Instance, InstanceId, Method, ModelError, ModelResult};

// ── ObjectModel ───────────────────────────────────────────────────────────────

/// The collaborator the composition engine needs from an object system.
///
/// `mx-compose` only ever asks for ancestry and for fresh instances, so any
/// delegation-chain implementation can sit behind this trait.
pub trait ObjectModel: Send + Sync {
    /// Create an empty instance bound to `root` (or to no root).
    fn create_instance(&self, root: Option<ChainRootId>) -> ModelResult<Instance>;

    /// `true` if `a` is `b` or lies below `b` on `b`'s chain.
    fn is_descendant_or_same(&self, a: ChainRootId, b: ChainRootId) -> bool;

    /// `true` if instances bound to `root` find a method `name` on the chain.
    fn chain_defines(&self, root: ChainRootId, name: &str) -> bool;
}

// ── ChainRoot ─────────────────────────────────────────────────────────────────

/// One link of a delegation chain.
pub struct ChainRoot {
    id:      ChainRootId,
    name:    Arc<str>,
    parent:  Option<Arc<ChainRoot>>,
    methods: FxHashMap<Arc<str>, Method>,
}

impl ChainRoot {
    pub fn id(&self) -> ChainRootId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ChainRoot>> {
        self.parent.as_ref()
    }

    /// Find `name` on this root or the nearest ancestor defining it.
    pub fn lookup(&self, name: &str) -> Option<Method> {
        let mut cursor = Some(self);
        while let Some(root) = cursor {
            if let Some(m) = root.methods.get(name) {
                return Some(Arc::clone(m));
            }
            cursor = root.parent.as_deref();
        }
        None
    }

    /// `true` if `ancestor` is this root or one of its parents.
    pub fn descends_from(&self, ancestor: ChainRootId) -> bool {
        let mut cursor = Some(self);
        while let Some(root) = cursor {
            if root.id == ancestor {
                return true;
            }
            cursor = root.parent.as_deref();
        }
        false
    }
}

impl std::fmt::Debug for ChainRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainRoot")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.id))
            .finish()
    }
}

// ── ChainRegistry ─────────────────────────────────────────────────────────────

/// The in-process [`ObjectModel`]: an immutable set of chain roots.
///
/// Built once with [`ChainRegistryBuilder`] and then shared read-only; the
/// only mutable field is the diagnostic instance counter.
pub struct ChainRegistry {
    roots:         Vec<Arc<ChainRoot>>,
    next_instance: AtomicU64,
}

impl ChainRegistry {
    /// A registry with no roots; every instance it creates is unbound.
    pub fn empty() -> Self {
        Self { roots: Vec::new(), next_instance: AtomicU64::new(0) }
    }

    pub fn root(&self, id: ChainRootId) -> ModelResult<&Arc<ChainRoot>> {
        self.roots.get(id.index()).ok_or(ModelError::UnknownRoot(id))
    }

    /// Id of the root registered under `name`.
    pub fn find(&self, name: &str) -> Option<ChainRootId> {
        self.roots.iter().find(|r| r.name() == name).map(|r| r.id)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl ObjectModel for ChainRegistry {
    fn create_instance(&self, root: Option<ChainRootId>) -> ModelResult<Instance> {
        let root = root.map(|id| self.root(id).cloned()).transpose()?;
        let id = InstanceId(self.next_instance.fetch_add(1, Ordering::Relaxed));
        trace!(instance = %id, root = ?root.as_ref().map(|r| r.name()), "instance created");
        Ok(Instance::new(id, root))
    }

    fn is_descendant_or_same(&self, a: ChainRootId, b: ChainRootId) -> bool {
        self.root(a).is_ok_and(|root| root.descends_from(b))
    }

    fn chain_defines(&self, root: ChainRootId, name: &str) -> bool {
        self.root(root).is_ok_and(|r| r.lookup(name).is_some())
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

struct PendingRoot {
    name:    Arc<str>,
    parent:  Option<ChainRootId>,
    methods: FxHashMap<Arc<str>, Method>,
}

/// Fluent construction of a [`ChainRegistry`].
///
/// ```rust
/// use mx_core::{method, ChainRegistryBuilder, ObjectModel, Value};
///
/// let mut b = ChainRegistryBuilder::new();
/// let person = b.root("Person", None);
/// let student = b.root("Student", Some(person));
/// b.method(person, "greet", method(|_, _| Ok(Value::from("hello")))).unwrap();
/// let registry = b.build().unwrap();
///
/// assert!(registry.is_descendant_or_same(student, person));
/// let alice = registry.create_instance(Some(student)).unwrap();
/// assert_eq!(alice.call("greet", &[]).unwrap(), Value::from("hello"));
/// ```
#[derive(Default)]
pub struct ChainRegistryBuilder {
    pending: Vec<PendingRoot>,
}

impl ChainRegistryBuilder {
    pub fn new() -> Self {
        Self { pending: Vec::new() }
    }

    /// Declare a root.  Parents must be declared before their children.
    pub fn root(&mut self, name: &str, parent: Option<ChainRootId>) -> ChainRootId {
        let id = ChainRootId(self.pending.len() as u32);
        self.pending.push(PendingRoot {
            name: Arc::from(name),
            parent,
            methods: FxHashMap::default(),
        });
        id
    }

    /// Give `root` a method visible to every instance on or below it.
    pub fn method(&mut self, root: ChainRootId, name: &str, m: Method) -> ModelResult<()> {
        let pending = self
            .pending
            .get_mut(root.index())
            .ok_or(ModelError::UnknownRoot(root))?;
        pending.methods.insert(Arc::from(name), m);
        Ok(())
    }

    /// Link the roots.  Fails if a parent id was never declared before its child.
    pub fn build(self) -> ModelResult<ChainRegistry> {
        let mut roots: Vec<Arc<ChainRoot>> = Vec::with_capacity(self.pending.len());
        for (i, p) in self.pending.into_iter().enumerate() {
            let parent = match p.parent {
                Some(pid) if pid.index() < i => Some(Arc::clone(&roots[pid.index()])),
                Some(pid) => {
                    return Err(ModelError::UnknownParent {
                        name:   p.name.to_string(),
                        parent: pid,
                    });
                }
                None => None,
            };
            roots.push(Arc::new(ChainRoot {
                id: ChainRootId(i as u32),
                name: p.name,
                parent,
                methods: p.methods,
            }));
        }
        Ok(ChainRegistry { roots, next_instance: AtomicU64::new(0) })
    }
}
