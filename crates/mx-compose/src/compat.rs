//! Chain-root compatibility.
//!
//! A composition binds all its instances to a single chain root.  A
//! participant may name a root on the same line of descent as the
//! accumulator's (ancestor, same, or descendant) but never one on a
//! different branch.  The accumulator keeps whichever of the two roots is
//! more specialized, so across a fold the root only ever moves down.

use mx_core::{ChainRootId, ObjectModel};

/// `true` if `candidate` may join an accumulator rooted at `accumulated`.
///
/// Both directions along one line of descent are accepted: a candidate the
/// accumulated root already descends from (the candidate is more general,
/// the root stays put) and a candidate that descends from the accumulated
/// root (the candidate is more specialized, the root narrows to it).  Only
/// roots on different branches are rejected.  A missing root on either side
/// places no constraint.
pub fn is_compatible(
    model:       &dyn ObjectModel,
    candidate:   Option<ChainRootId>,
    accumulated: Option<ChainRootId>,
) -> bool {
    match (candidate, accumulated) {
        (Some(c), Some(a)) => {
            c == a || model.is_descendant_or_same(a, c) || model.is_descendant_or_same(c, a)
        }
        _ => true,
    }
}

/// The more specialized of two compatible roots.
pub fn narrowest(
    model:       &dyn ObjectModel,
    candidate:   Option<ChainRootId>,
    accumulated: Option<ChainRootId>,
) -> Option<ChainRootId> {
    match (candidate, accumulated) {
        (Some(c), Some(a)) if model.is_descendant_or_same(c, a) => Some(c),
        (_, Some(a)) => Some(a),
        (c, None) => c,
    }
}
