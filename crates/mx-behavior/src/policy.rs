//! Conflict-resolution policies.
//!
//! A policy merges the method supplied by the participant being folded in
//! (`new`) with the method already present in the accumulator
//! (`existing`):
//!
//! | Tag         | Runs                                   | Returns            |
//! |-------------|----------------------------------------|--------------------|
//! | `overwrite` | nothing                                | `existing` itself  |
//! | `discard`   | nothing                                | `new` itself       |
//! | `before`    | `existing`, then `new`                 | `new`'s result     |
//! | `after`     | `new`, then `existing`                 | `existing`'s result|
//! | `around`    | `new`, given `existing` as `proceed`   | `new`'s result     |
//!
//! # Naming hazard
//!
//! The tags describe the historical mechanics, not their plain-English
//! reading: `overwrite` keeps the method that was already there and
//! `discard` keeps the incoming one; `before`/`after` name where the
//! *existing* method runs relative to the incoming one; `around` passes the
//! existing method to the incoming one as argument 0 (a
//! [`Function`][mx_core::Function]) followed by the original arguments.
//! Callers depending on these tags should read this table rather than the
//! names.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use mx_core::{Function, Method, Value, method};
use rustc_hash::FxHashMap;

use crate::BehaviorError;

/// A named strategy for merging two implementations of one method.
pub type PolicyFn = Arc<dyn Fn(Method, Method) -> Method + Send + Sync>;

// ── Built-in policies ─────────────────────────────────────────────────────────

pub fn overwrite(_new: Method, existing: Method) -> Method {
    existing
}

pub fn discard(new: Method, _existing: Method) -> Method {
    new
}

pub fn before(new: Method, existing: Method) -> Method {
    method(move |this, args| {
        existing(this, args)?;
        new(this, args)
    })
}

pub fn after(new: Method, existing: Method) -> Method {
    method(move |this, args| {
        new(this, args)?;
        existing(this, args)
    })
}

pub fn around(new: Method, existing: Method) -> Method {
    method(move |this, args| {
        let proceed = Function::bind(Arc::clone(&existing), this.clone());
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(Value::Function(proceed));
        full.extend_from_slice(args);
        new(this, &full)
    })
}

// ── PolicyTag ─────────────────────────────────────────────────────────────────

/// The built-in policy tags.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PolicyTag {
    Overwrite,
    Discard,
    Before,
    After,
    Around,
}

impl PolicyTag {
    pub const ALL: [PolicyTag; 5] = [
        PolicyTag::Overwrite,
        PolicyTag::Discard,
        PolicyTag::Before,
        PolicyTag::After,
        PolicyTag::Around,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyTag::Overwrite => "overwrite",
            PolicyTag::Discard   => "discard",
            PolicyTag::Before    => "before",
            PolicyTag::After     => "after",
            PolicyTag::Around    => "around",
        }
    }

    fn policy(self) -> fn(Method, Method) -> Method {
        match self {
            PolicyTag::Overwrite => overwrite,
            PolicyTag::Discard   => discard,
            PolicyTag::Before    => before,
            PolicyTag::After     => after,
            PolicyTag::Around    => around,
        }
    }
}

impl AsRef<str> for PolicyTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PolicyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyTag {
    type Err = BehaviorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyTag::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BehaviorError::UnknownPolicy(s.to_string()))
    }
}

// ── PolicyLibrary ─────────────────────────────────────────────────────────────

/// Lookup table from tag to policy, consulted at composition time.
///
/// `PolicyLibrary::default()` holds the five built-ins.  Applications may
/// register more; a directive naming a tag missing from the library fails
/// composition.
#[derive(Clone)]
pub struct PolicyLibrary {
    policies: FxHashMap<Arc<str>, PolicyFn>,
}

impl PolicyLibrary {
    /// A library with no policies at all.
    pub fn empty() -> Self {
        Self { policies: FxHashMap::default() }
    }

    /// Add or replace the policy stored under `tag`.
    pub fn register<F>(&mut self, tag: &str, policy: F) -> &mut Self
    where
        F: Fn(Method, Method) -> Method + Send + Sync + 'static,
    {
        self.policies.insert(Arc::from(tag), Arc::new(policy));
        self
    }

    pub fn get(&self, tag: &str) -> Option<&PolicyFn> {
        self.policies.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.policies.contains_key(tag)
    }

    /// Merge `new` into `existing` with the policy named `tag`.
    pub fn apply(&self, tag: &str, new: Method, existing: Method) -> Option<Method> {
        self.get(tag).map(|p| p(new, existing))
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.policies.keys().map(|k| &**k).collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for PolicyLibrary {
    fn default() -> Self {
        let mut lib = Self::empty();
        for tag in PolicyTag::ALL {
            lib.register(tag.as_str(), tag.policy());
        }
        lib
    }
}

impl fmt::Debug for PolicyLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyLibrary").field("tags", &self.tags()).finish()
    }
}
