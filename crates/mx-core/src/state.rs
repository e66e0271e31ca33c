//! Type-erased private state, one slot per Rust type.
//!
//! # Design
//!
//! Each state type `T` is stored as a `Box<dyn StateSlot>` in a map keyed by
//! `TypeId`.  A slot is created with `T::default()` the first time a method
//! body touches it, which is the private-scope equivalent of "assign a field
//! on first use".
//!
//! # Usage
//!
//! ```rust
//! use mx_core::StateMap;
//!
//! #[derive(Default)]
//! struct Songs(Vec<String>);
//!
//! let mut map = StateMap::new();
//! map.with::<Songs, _>(|s| s.0.push("Helter Skelter".into()));
//! assert!(map.contains::<Songs>());
//! assert_eq!(map.get::<Songs>().map(|s| s.0.len()), Some(1));
//! ```

use std::any::{Any, TypeId};

use rustc_hash::FxHashMap;

// ── Trait object ──────────────────────────────────────────────────────────────

/// Type-erased interface for one state value.
///
/// Sealed via the private `Sealed` supertrait so only [`TypedSlot`] can be
/// stored.
pub trait StateSlot: Send + Sync + 'static + sealed::Sealed {
    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn as_any_mut(&mut self) -> &mut dyn Any;

    #[doc(hidden)]
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

mod sealed {
    pub trait Sealed {}
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// A `T` wrapped so it can be stored as `Box<dyn StateSlot>`.
pub struct TypedSlot<T: Send + Sync + 'static>(pub T);

impl<T: Send + Sync + 'static> sealed::Sealed for TypedSlot<T> {}

impl<T: Send + Sync + 'static> StateSlot for TypedSlot<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

// ── StateMap ──────────────────────────────────────────────────────────────────

/// Private state of one context: at most one value per type.
#[derive(Default)]
pub struct StateMap {
    map: FxHashMap<TypeId, Box<dyn StateSlot>>,
}

impl StateMap {
    pub fn new() -> Self {
        Self { map: FxHashMap::default() }
    }

    /// Run `f` against the `T` slot, creating it with `T::default()` first if
    /// it does not exist yet.
    pub fn with<T: Default + Send + Sync + 'static, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let slot = self
            .map
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(TypedSlot(T::default())));
        match slot.as_any_mut().downcast_mut::<TypedSlot<T>>() {
            Some(typed) => f(&mut typed.0),
            None => {
                let mut fresh = T::default();
                let out = f(&mut fresh);
                *slot = Box::new(TypedSlot(fresh));
                out
            }
        }
    }

    /// Replace the `T` slot, returning the previous value if any.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(TypedSlot(value)))
            .and_then(|old| old.into_any().downcast::<TypedSlot<T>>().ok())
            .map(|typed| typed.0)
    }

    /// Shared reference to the `T` slot; `None` if never written.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.as_any().downcast_ref::<TypedSlot<T>>())
            .map(|typed| &typed.0)
    }

    /// `true` if a `T` slot exists.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Number of distinct state types held.
    pub fn type_count(&self) -> usize {
        self.map.len()
    }
}
