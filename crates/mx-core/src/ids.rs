//! Strongly typed identifier wrappers.
//!
//! Ids are `Copy + Ord + Hash` so they can be used as map keys and log fields
//! without ceremony.  A `ChainRootId` is an index into the
//! [`ChainRegistry`][crate::ChainRegistry] that issued it; an `InstanceId` is
//! a per-registry sequence number used only for diagnostics (instance
//! identity itself is pointer identity, see [`Instance::ptr_eq`][crate::Instance::ptr_eq]).

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.  `$tag` is the
/// prefix used by `Display` (`root#3`).
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) as $tag:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.0)
            }
        }
    };
}

typed_id! {
    /// Handle of a delegation-chain root inside a [`ChainRegistry`][crate::ChainRegistry].
    pub struct ChainRootId(u32) as "root";
}

typed_id! {
    /// Diagnostic sequence number of an [`Instance`][crate::Instance].
    pub struct InstanceId(u64) as "inst";
}
