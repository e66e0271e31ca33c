//! The encapsulation wrapper.

use std::fmt;
use std::sync::Arc;

use mx_core::{Body, ChainRootId, Method, Value, method};
use rustc_hash::FxHashMap;

use crate::context::ScopeTemplate;
use crate::{Behavior, BehaviorDefinition, Definition, Participant, Slot, SlotTable};

/// A behavior whose public methods run against per-receiver private
/// contexts rather than against the receiver itself.
///
/// Immutable once built and cheap to clone; share it freely across threads
/// and instances.
#[derive(Clone)]
pub struct EncapsulatedBehavior {
    name:       Arc<str>,
    chain_root: Option<ChainRootId>,
    slots:      Arc<SlotTable>,
    template:   Arc<ScopeTemplate>,
}

/// Wrap `def` so each of its implementations runs against the caller's
/// private context.
///
/// Private methods move into the context scope, properties and dependency
/// markers are carried on the public surface unchanged.
pub fn encapsulate(def: &BehaviorDefinition) -> EncapsulatedBehavior {
    let mut dependencies = Vec::new();
    let mut privates: FxHashMap<Arc<str>, Body> = FxHashMap::default();
    for (name, entry) in def.entries() {
        match entry {
            Definition::Dependency => dependencies.push(Arc::clone(name)),
            Definition::Private(f) => {
                privates.insert(Arc::clone(name), Arc::clone(f));
            }
            Definition::Implementation(_) | Definition::Property(_) => {}
        }
    }

    let template = Arc::new(ScopeTemplate::new(def.name_arc(), dependencies, privates));

    let mut slots = SlotTable::new();
    for (name, entry) in def.entries() {
        let slot = match entry {
            Definition::Implementation(f) => Slot::Method(wrap(Arc::clone(&template), Arc::clone(f))),
            Definition::Property(v) => Slot::Property(v.clone()),
            Definition::Dependency => Slot::Dependency,
            Definition::Private(_) => continue,
        };
        slots.insert(Arc::clone(name), slot);
    }

    tracing::debug!(
        behavior = def.name(),
        public = slots.values().filter(|s| s.is_method()).count(),
        dependencies = template.dependencies().len(),
        "encapsulated"
    );

    EncapsulatedBehavior {
        name: def.name_arc(),
        chain_root: def.root(),
        slots: Arc::new(slots),
        template,
    }
}

/// Public face of one private body: locate the context, run the body there,
/// and map a fluent context return back to the receiver.
fn wrap(template: Arc<ScopeTemplate>, body: Body) -> Method {
    method(move |receiver, args| {
        let ctx = template.context_for(receiver);
        let out = body(&ctx, args)?;
        Ok(match out {
            Value::Context(ref c) if c.ptr_eq(&ctx) => Value::Instance(receiver.clone()),
            other => other,
        })
    })
}

impl EncapsulatedBehavior {
    /// Private contexts created so far, across every receiver.
    pub fn contexts_created(&self) -> usize {
        self.template.created()
    }
}

impl Participant for EncapsulatedBehavior {
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

impl Behavior for EncapsulatedBehavior {}

impl fmt::Debug for EncapsulatedBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncapsulatedBehavior")
            .field("name", &self.name)
            .field("chain_root", &self.chain_root)
            .field("slots", &self.slots)
            .finish()
    }
}
