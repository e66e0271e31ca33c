//! Public-surface entries shared by encapsulated, annotated and composed
//! behaviors.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mx_core::{ChainRootId, Instance, Member, Method, ModelResult, ObjectModel, Value};

/// A policy tag attached to the method supplied by one participant.
///
/// Produced only by [`resolve`][crate::resolve]; consumed by composition.
#[derive(Clone)]
pub struct ResolutionDirective {
    pub policy: Arc<str>,
    pub method: Method,
}

impl fmt::Debug for ResolutionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionDirective").field("policy", &self.policy).finish()
    }
}

#[derive(Clone)]
pub enum Slot {
    Method(Method),
    Property(Value),
    Dependency,
    Resolution(ResolutionDirective),
}

impl Slot {
    pub fn kind(&self) -> &'static str {
        match self {
            Slot::Method(_)     => "method",
            Slot::Property(_)   => "property",
            Slot::Dependency    => "dependency",
            Slot::Resolution(_) => "resolution",
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Slot::Method(_))
    }

    pub fn is_dependency(&self) -> bool {
        matches!(self, Slot::Dependency)
    }

    /// The instance member this slot installs as; directives install nothing.
    pub fn to_member(&self) -> Option<Member> {
        match self {
            Slot::Method(m)     => Some(Member::Method(Arc::clone(m))),
            Slot::Property(v)   => Some(Member::Property(v.clone())),
            Slot::Dependency    => Some(Member::Dependency),
            Slot::Resolution(_) => None,
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Property(v)   => f.debug_tuple("Property").field(v).finish(),
            Slot::Resolution(d) => f.debug_tuple("Resolution").field(&d.policy).finish(),
            other               => f.write_str(other.kind()),
        }
    }
}

/// Name-ordered slot table.  Ordering keeps composition deterministic.
pub type SlotTable = BTreeMap<Arc<str>, Slot>;

// ── Participant ───────────────────────────────────────────────────────────────

/// Anything that can be folded into a composition.
pub trait Participant {
    fn name(&self) -> &str;

    fn chain_root(&self) -> Option<ChainRootId>;

    fn slots(&self) -> &SlotTable;

    /// Names of public methods, in name order.
    fn method_names(&self) -> Vec<&str> {
        self.names_where(Slot::is_method)
    }

    /// Names of outstanding Dependency Markers, in name order.
    fn dependency_names(&self) -> Vec<&str> {
        self.names_where(Slot::is_dependency)
    }

    #[doc(hidden)]
    fn names_where(&self, pred: fn(&Slot) -> bool) -> Vec<&str> {
        self.slots()
            .iter()
            .filter(|(_, s)| pred(s))
            .map(|(n, _)| &**n)
            .collect()
    }
}

/// A participant whose surface can be installed on instances.
pub trait Behavior: Participant {
    /// Mix the public surface into an existing instance.
    ///
    /// A dependency marker never replaces a member the instance already has.
    fn attach(&self, instance: &Instance) {
        for (name, slot) in self.slots() {
            if slot.is_dependency() && instance.has_member(name) {
                continue;
            }
            if let Some(member) = slot.to_member() {
                instance.define(Arc::clone(name), member);
            }
        }
    }

    /// Create an instance bound to this behavior's chain root and attach the
    /// public surface.  The caller is expected to invoke `initialize` next,
    /// if the behavior has one.
    fn instantiate(&self, model: &dyn ObjectModel) -> ModelResult<Instance> {
        let instance = model.create_instance(self.chain_root())?;
        self.attach(&instance);
        tracing::trace!(behavior = self.name(), instance = %instance.id(), "instantiated");
        Ok(instance)
    }
}
