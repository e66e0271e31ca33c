//! The result of a composition.

use std::fmt;
use std::sync::Arc;

use mx_behavior::{Behavior, Participant, SlotTable};
use mx_core::ChainRootId;

/// A folded behavior: the union of its participants' public surfaces with
/// conflicts resolved, the dependencies nobody satisfied, and one chain
/// root.
///
/// Immutable and cheap to clone.  It is itself a [`Participant`], so it can
/// be resolved and composed again.
#[derive(Clone)]
pub struct ComposedBehavior {
    name:         Arc<str>,
    chain_root:   Option<ChainRootId>,
    slots:        Arc<SlotTable>,
    participants: Arc<[Arc<str>]>,
}

impl ComposedBehavior {
    pub(crate) fn new(
        name:         Arc<str>,
        chain_root:   Option<ChainRootId>,
        slots:        SlotTable,
        participants: Vec<Arc<str>>,
    ) -> Self {
        Self {
            name,
            chain_root,
            slots: Arc::new(slots),
            participants: participants.into(),
        }
    }

    /// Names of the participants, in fold order.
    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.participants.iter().map(|p| &**p)
    }
}

impl Participant for ComposedBehavior {
    fn name(&self) -> &str {
        &self.name
    }

    fn chain_root(&self) -> Option<ChainRootId> {
        self.chain_root
    }

    fn slots(&self) -> &SlotTable {
        &self.slots
    }
}

impl Behavior for ComposedBehavior {}

impl fmt::Debug for ComposedBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedBehavior")
            .field("name", &self.name)
            .field("chain_root", &self.chain_root)
            .field("participants", &self.participants)
            .field("slots", &self.slots)
            .finish()
    }
}
