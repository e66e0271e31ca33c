//! Behavior definitions: what authors write before encapsulation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mx_core::{Body, CallResult, ChainRootId, PrivateContext, Value};

/// The kind of one named entry in a [`BehaviorDefinition`].
///
/// Kinds are declared explicitly by the builder method used, never inferred
/// from the shape of a value or from naming conventions.
#[derive(Clone)]
pub enum Definition {
    /// Public method; its body runs against the receiver's private context.
    Implementation(Body),
    /// Callable only from inside the private context.
    Private(Body),
    /// Read-only data value published on the public surface.
    Property(Value),
    /// Declared but unimplemented: some composition partner (or the
    /// instance's chain root) must supply it.
    Dependency,
}

impl Definition {
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Implementation(_) => "implementation",
            Definition::Private(_)        => "private method",
            Definition::Property(_)       => "property",
            Definition::Dependency        => "dependency",
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// A named table of methods to be mixed into objects.
///
/// Declaring a name twice replaces the earlier declaration, so every name
/// has exactly one kind.
///
/// ```rust
/// use mx_behavior::BehaviorDefinition;
/// use mx_core::Value;
///
/// #[derive(Default, Clone)]
/// struct Songs(Vec<Value>);
///
/// let sings = BehaviorDefinition::new("SingsSongs")
///     .method("initialize", |ctx, _| {
///         ctx.with_state(|s: &mut Songs| s.0.clear());
///         Ok(ctx.this())
///     })
///     .method("songs", |ctx, _| Ok(Value::List(ctx.state::<Songs>().0)))
///     .dependency("name");
///
/// assert_eq!(sings.len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct BehaviorDefinition {
    name:       Arc<str>,
    chain_root: Option<ChainRootId>,
    entries:    BTreeMap<Arc<str>, Definition>,
}

impl BehaviorDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name:       Arc::from(name),
            chain_root: None,
            entries:    BTreeMap::new(),
        }
    }

    /// Require instances to delegate to `root` (or a descendant of it).
    pub fn chain_root(mut self, root: ChainRootId) -> Self {
        self.chain_root = Some(root);
        self
    }

    pub fn method<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&PrivateContext, &[Value]) -> CallResult<Value> + Send + Sync + 'static,
    {
        self.entry(name, Definition::Implementation(Arc::new(f)))
    }

    pub fn private<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&PrivateContext, &[Value]) -> CallResult<Value> + Send + Sync + 'static,
    {
        self.entry(name, Definition::Private(Arc::new(f)))
    }

    pub fn property(self, name: &str, value: impl Into<Value>) -> Self {
        self.entry(name, Definition::Property(value.into()))
    }

    pub fn dependency(self, name: &str) -> Self {
        self.entry(name, Definition::Dependency)
    }

    /// Insert an already-built entry.
    pub fn entry(mut self, name: &str, def: Definition) -> Self {
        self.entries.insert(Arc::from(name), def);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub fn root(&self) -> Option<ChainRootId> {
        self.chain_root
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.entries.get(name)
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&Arc<str>, &Definition)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
