//! Instances: the public receivers behaviors are mixed into.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::{
    CallError, CallResult, ChainRoot, ChainRootId, ContextKey, Function, InstanceId, Method,
    PrivateContext, Value,
};

/// One entry of an instance's public surface.
#[derive(Clone)]
pub enum Member {
    Method(Method),
    /// Read-only data value.
    Property(Value),
    /// Declared but unimplemented; resolved against the chain root at call time.
    Dependency,
}

impl Member {
    pub fn is_method(&self) -> bool {
        matches!(self, Member::Method(_))
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Method(_)   => f.write_str("Method(..)"),
            Member::Property(v) => f.debug_tuple("Property").field(v).finish(),
            Member::Dependency  => f.write_str("Dependency"),
        }
    }
}

struct InstanceInner {
    id:       InstanceId,
    root:     Option<Arc<ChainRoot>>,
    members:  RwLock<FxHashMap<Arc<str>, Member>>,
    contexts: Mutex<FxHashMap<ContextKey, PrivateContext>>,
}

/// Shared handle to an object.  Clones refer to the same object; equality is
/// identity ([`ptr_eq`](Self::ptr_eq)).
///
/// # Thread safety
///
/// `Instance` is `Send + Sync`.  Member and context tables sit behind
/// `parking_lot` locks that are never held while user code runs, so method
/// bodies may call back into the same instance.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    /// A bare instance.  Normally obtained via
    /// [`ObjectModel::create_instance`][crate::ObjectModel::create_instance].
    pub fn new(id: InstanceId, root: Option<Arc<ChainRoot>>) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                id,
                root,
                members:  RwLock::new(FxHashMap::default()),
                contexts: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    pub fn chain_root(&self) -> Option<ChainRootId> {
        self.inner.root.as_ref().map(|r| r.id())
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakInstance {
        WeakInstance(Arc::downgrade(&self.inner))
    }

    // ── Members ───────────────────────────────────────────────────────────

    /// Install `member` under `name`, returning what it replaced.
    pub fn define(&self, name: impl Into<Arc<str>>, member: Member) -> Option<Member> {
        self.inner.members.write().insert(name.into(), member)
    }

    /// `true` if the instance itself holds a member called `name`.
    pub fn has_member(&self, name: &str) -> bool {
        self.inner.members.read().contains_key(name)
    }

    /// Names of the instance's own members, sorted.
    pub fn member_names(&self) -> Vec<Arc<str>> {
        let mut names: Vec<_> = self.inner.members.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve `name` to a callable: own methods first, then the chain root.
    pub fn lookup(&self, name: &str) -> CallResult<Method> {
        let own = self.inner.members.read().get(name).cloned();
        match own {
            Some(Member::Method(m)) => Ok(m),
            Some(Member::Property(_)) => Err(CallError::NotCallable { name: name.to_string() }),
            Some(Member::Dependency) => self
                .chain_lookup(name)
                .ok_or_else(|| CallError::MissingImplementation { name: name.to_string() }),
            None => self.chain_lookup(name).ok_or_else(|| CallError::MethodNotFound {
                name:     name.to_string(),
                receiver: self.inner.id,
            }),
        }
    }

    fn chain_lookup(&self, name: &str) -> Option<Method> {
        self.inner.root.as_ref().and_then(|r| r.lookup(name))
    }

    /// Invoke method `name` with `self` as receiver.
    pub fn call(&self, name: &str, args: &[Value]) -> CallResult<Value> {
        let m = self.lookup(name)?;
        m(self, args)
    }

    /// Read member `name`.  Methods come back bound to `self`.
    pub fn get(&self, name: &str) -> CallResult<Value> {
        let own = self.inner.members.read().get(name).cloned();
        match own {
            Some(Member::Property(v)) => Ok(v),
            _ => self
                .lookup(name)
                .map(|m| Value::Function(Function::bind(m, self.clone()))),
        }
    }

    /// `true` if `name` currently resolves to a callable.
    pub fn responds_to(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    // ── Private contexts ──────────────────────────────────────────────────

    /// Return the context stored under `key`, creating it with `init` if this
    /// is the first request.
    ///
    /// Check and insert happen under one lock, so concurrent first calls
    /// from several threads still produce exactly one context.  `init` must
    /// not call back into this instance.
    pub fn context_or_init(
        &self,
        key:  &ContextKey,
        init: impl FnOnce(&Instance) -> PrivateContext,
    ) -> PrivateContext {
        let mut contexts = self.inner.contexts.lock();
        contexts
            .entry(key.clone())
            .or_insert_with(|| init(self))
            .clone()
    }

    /// Number of private contexts created on this instance so far.
    pub fn context_count(&self) -> usize {
        self.inner.contexts.lock().len()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.inner.id)
            .field("root", &self.chain_root())
            .finish()
    }
}

/// Non-owning handle, held by private-context forwarders so a context never
/// keeps its receiver alive.
#[derive(Clone)]
pub struct WeakInstance(Weak<InstanceInner>);

impl WeakInstance {
    pub fn upgrade(&self) -> Option<Instance> {
        self.0.upgrade().map(|inner| Instance { inner })
    }
}
