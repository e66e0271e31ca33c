//! Attaching resolution directives to a copy of a behavior.

use std::fmt;
use std::sync::Arc;

use mx_core::ChainRootId;

use crate::{BehaviorError, BehaviorResult, Participant, ResolutionDirective, Slot, SlotTable};

/// A copy of a participant with some public methods tagged by policy.
///
/// Only meaningful as a composition participant; it cannot be instantiated.
#[derive(Clone)]
pub struct AnnotatedBehavior {
    name:       Arc<str>,
    chain_root: Option<ChainRootId>,
    slots:      SlotTable,
}

/// Tag methods of `behavior` with policies, leaving `behavior` untouched.
///
/// Tags are looked up when the result is composed, not here, so custom
/// policies registered later are accepted.  Re-tagging an already annotated
/// method replaces its tag.
///
/// ```rust
/// use mx_behavior::{encapsulate, resolve, BehaviorDefinition, Participant, PolicyTag};
/// use mx_core::Value;
///
/// let awards = encapsulate(&BehaviorDefinition::new("HasAwards")
///     .method("initialize", |ctx, _| Ok(ctx.this())));
/// let tagged = resolve(&awards, [("initialize", PolicyTag::After)]).unwrap();
///
/// assert!(awards.slots()["initialize"].is_method());
/// assert_eq!(tagged.slots()["initialize"].kind(), "resolution");
/// ```
pub fn resolve<P, I, K, V>(behavior: &P, directives: I) -> BehaviorResult<AnnotatedBehavior>
where
    P: Participant + ?Sized,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut slots = behavior.slots().clone();
    for (name, policy) in directives {
        let (name, policy) = (name.as_ref(), policy.as_ref());
        let slot = slots.get_mut(name).ok_or_else(|| not_a_method(behavior, name))?;
        let method = match slot {
            Slot::Method(m) => Arc::clone(m),
            Slot::Resolution(d) => Arc::clone(&d.method),
            Slot::Property(_) | Slot::Dependency => return Err(not_a_method(behavior, name)),
        };
        *slot = Slot::Resolution(ResolutionDirective { policy: Arc::from(policy), method });
        tracing::trace!(behavior = behavior.name(), method = name, policy, "resolution attached");
    }
    Ok(AnnotatedBehavior {
        name: Arc::from(behavior.name()),
        chain_root: behavior.chain_root(),
        slots,
    })
}

fn not_a_method<P: Participant + ?Sized>(behavior: &P, name: &str) -> BehaviorError {
    BehaviorError::NotAMethod {
        behavior: behavior.name().to_string(),
        name:     name.to_string(),
    }
}

impl Participant for AnnotatedBehavior {
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

impl fmt::Debug for AnnotatedBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedBehavior")
            .field("name", &self.name)
            .field("slots", &self.slots)
            .finish()
    }
}
