//! Late-bound method lookup.
//!
//! Encapsulation and composition capture implementations when they run
//! (early binding).  A [`MethodRegistry`] is the other binding mode: methods
//! handed out by [`MethodRegistry::late_bound`] look their name up on every
//! call, so reassigning the name afterwards changes what already-wired
//! callers run.

use std::sync::Arc;

use mx_core::{CallError, CallResult, Instance, Method, method};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Mutable, shareable table of named methods.
///
/// Clones share the same table.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    table: Arc<RwLock<FxHashMap<Arc<str>, Method>>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind or rebind `name`, returning the previous implementation.
    pub fn define(&self, name: &str, m: Method) -> Option<Method> {
        tracing::trace!(method = name, "registry rebind");
        self.table.write().insert(Arc::from(name), m)
    }

    pub fn remove(&self, name: &str) -> Option<Method> {
        self.table.write().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.read().contains_key(name)
    }

    /// Current implementation of `name`.
    pub fn current(&self, name: &str) -> CallResult<Method> {
        self.table
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CallError::MissingImplementation { name: name.to_string() })
    }

    /// Capture the implementation bound to `name` right now.
    pub fn early_bound(&self, name: &str) -> CallResult<Method> {
        self.current(name)
    }

    /// A method that resolves `name` at call time.
    pub fn late_bound(&self, name: &str) -> Method {
        let registry = self.clone();
        let name: Arc<str> = Arc::from(name);
        method(move |this, args| {
            let m = registry.current(&name)?;
            m(this, args)
        })
    }
}

/// A method that forwards to `target`'s member `name`, looked up at call
/// time and run with `target` (not the caller) as receiver.
pub fn forward(target: Instance, name: &str) -> Method {
    let name: Arc<str> = Arc::from(name);
    method(move |_, args| target.call(&name, args))
}
