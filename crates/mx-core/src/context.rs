//! Private contexts: the hidden per-receiver scope of an encapsulated behavior.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{Body, CallError, CallResult, StateMap, Value};

// ── ContextKey ────────────────────────────────────────────────────────────────

struct KeyToken {
    behavior: Arc<str>,
}

/// Identity of one encapsulation, used to find its context on a receiver.
///
/// Two keys are equal only if cloned from the same [`ContextKey::new`] call.
/// The receiver's table holds a strong reference to the key, so an address
/// is never reused while a context is stored under it.
#[derive(Clone)]
pub struct ContextKey(Arc<KeyToken>);

impl ContextKey {
    pub fn new(behavior: Arc<str>) -> Self {
        Self(Arc::new(KeyToken { behavior }))
    }

    pub fn behavior(&self) -> &str {
        &self.0.behavior
    }
}

impl PartialEq for ContextKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ContextKey {}

impl Hash for ContextKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextKey").field(&self.0.behavior).finish()
    }
}

// ── PrivateContext ────────────────────────────────────────────────────────────

struct ContextInner {
    behavior: Arc<str>,
    scope:    FxHashMap<Arc<str>, Body>,
    state:    Mutex<StateMap>,
}

/// Execution scope of private method bodies.
///
/// A context exposes nothing of its receiver except the names placed in its
/// scope when it was built (dependency forwarders and private methods) plus
/// its own typed state.
#[derive(Clone)]
pub struct PrivateContext {
    inner: Arc<ContextInner>,
}

impl PrivateContext {
    pub fn new(behavior: Arc<str>, scope: FxHashMap<Arc<str>, Body>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                behavior,
                scope,
                state: Mutex::new(StateMap::new()),
            }),
        }
    }

    /// Name of the behavior this context belongs to.
    pub fn behavior(&self) -> &str {
        &self.inner.behavior
    }

    pub fn ptr_eq(&self, other: &PrivateContext) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The fluent return value: the wrapper turns it back into the receiver.
    pub fn this(&self) -> Value {
        Value::Context(self.clone())
    }

    /// `true` if `name` is callable from inside this scope.
    pub fn has(&self, name: &str) -> bool {
        self.inner.scope.contains_key(name)
    }

    /// Names callable from inside this scope, sorted.
    pub fn scope_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inner.scope.keys().map(|k| &**k).collect();
        names.sort_unstable();
        names
    }

    /// Invoke a dependency or private method.
    pub fn call(&self, name: &str, args: &[Value]) -> CallResult<Value> {
        let f = self.inner.scope.get(name).ok_or_else(|| CallError::NotInScope {
            name:     name.to_string(),
            behavior: self.inner.behavior.to_string(),
        })?;
        f(self, args)
    }

    /// Run `f` against the `T` state slot, creating it on first use.
    ///
    /// The state lock is held while `f` runs; do not call methods from
    /// inside `f`.
    pub fn with_state<T, R>(&self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Default + Send + Sync + 'static,
    {
        self.inner.state.lock().with(f)
    }

    /// Copy of the `T` state slot (default if never written).
    pub fn state<T>(&self) -> T
    where
        T: Default + Clone + Send + Sync + 'static,
    {
        self.with_state(|s: &mut T| s.clone())
    }
}

impl fmt::Debug for PrivateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateContext")
            .field("behavior", &self.inner.behavior)
            .field("scope", &self.scope_names())
            .finish()
    }
}
