//! Private context construction.
//!
//! A private context is built lazily, once per (encapsulation, receiver)
//! pair.  Its scope holds a forwarder for every declared dependency and
//! every private method of the behavior, nothing else.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mx_core::{
    Body, CallError, ContextKey, Instance, PrivateContext, Value, WeakInstance, body,
};
use rustc_hash::FxHashMap;

/// Build a context over `receiver` exposing `dependencies` as forwarders and
/// `privates` as-is.
///
/// This always builds a fresh context; use [`ScopeTemplate::context_for`]
/// to get the at-most-once-per-receiver behavior.
pub fn build_context(
    receiver:     &Instance,
    behavior:     Arc<str>,
    dependencies: &[Arc<str>],
    privates:     &FxHashMap<Arc<str>, Body>,
) -> PrivateContext {
    let mut scope: FxHashMap<Arc<str>, Body> =
        FxHashMap::with_capacity_and_hasher(dependencies.len() + privates.len(), Default::default());
    for name in dependencies {
        scope.insert(Arc::clone(name), forwarder(receiver.downgrade(), Arc::clone(name)));
    }
    for (name, f) in privates {
        scope.insert(Arc::clone(name), Arc::clone(f));
    }
    PrivateContext::new(behavior, scope)
}

/// Call `name` on the receiver; a receiver returning itself is seen by the
/// private caller as returning the context.
fn forwarder(receiver: WeakInstance, name: Arc<str>) -> Body {
    body(move |ctx, args| {
        let target = receiver.upgrade().ok_or(CallError::ReceiverDropped)?;
        let out = target.call(&name, args)?;
        Ok(match out {
            Value::Instance(ref i) if i.ptr_eq(&target) => ctx.this(),
            other => other,
        })
    })
}

/// Everything an encapsulation needs to produce contexts on demand.
pub struct ScopeTemplate {
    key:          ContextKey,
    behavior:     Arc<str>,
    dependencies: Vec<Arc<str>>,
    privates:     FxHashMap<Arc<str>, Body>,
    created:      AtomicUsize,
}

impl ScopeTemplate {
    pub fn new(
        behavior:     Arc<str>,
        dependencies: Vec<Arc<str>>,
        privates:     FxHashMap<Arc<str>, Body>,
    ) -> Self {
        Self {
            key: ContextKey::new(Arc::clone(&behavior)),
            behavior,
            dependencies,
            privates,
            created: AtomicUsize::new(0),
        }
    }

    /// Locate `receiver`'s context for this encapsulation, building it on
    /// first use.
    pub fn context_for(&self, receiver: &Instance) -> PrivateContext {
        receiver.context_or_init(&self.key, |r| {
            self.created.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(behavior = %self.behavior, instance = %r.id(), "private context created");
            build_context(r, Arc::clone(&self.behavior), &self.dependencies, &self.privates)
        })
    }

    /// Total contexts created across all receivers.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn dependencies(&self) -> &[Arc<str>] {
        &self.dependencies
    }
}
