//! The composition engine: a strict left fold over participants.
//!
//! ```text
//! acc = {}                         root = none
//! for p in participants:
//!   ① chain root:  p's root must share a line of descent with acc's;
//!                    acc keeps the more specialized one
//!   ② methods/properties: install if absent or filling a dependency,
//!                    otherwise Conflict (properties never fill dependencies)
//!   ③ dependencies: install if absent, keep an existing method
//!   ④ directives:  merge with acc's existing method via the named policy
//! ```
//!
//! The accumulator is private to one call; any error drops it, so callers
//! never observe a partially composed behavior.

use std::sync::Arc;

use mx_behavior::{Participant, PolicyLibrary, ResolutionDirective, Slot, SlotTable};
use mx_core::{ChainRootId, ObjectModel};
use tracing::debug;

use crate::compat::{is_compatible, narrowest};
use crate::{ComposeConfig, ComposeError, ComposeObserver, ComposeResult, ComposedBehavior, NoopObserver};

/// Compose `participants` with the built-in policies and default options.
pub fn compose(
    model:        &dyn ObjectModel,
    participants: &[&dyn Participant],
) -> ComposeResult<ComposedBehavior> {
    participants
        .iter()
        .fold(Composer::new(model), |c, p| c.with(*p))
        .compose()
}

/// Fluent front end to the composition engine.
///
/// # Example
///
/// ```rust,ignore
/// let singer = Composer::new(&registry)
///     .with(&sings_songs)
///     .with(&resolve(&has_awards, [("initialize", PolicyTag::After)])?)
///     .config(ComposeConfig::named("Singer"))
///     .compose()?;
/// ```
pub struct Composer<'a> {
    model:        &'a dyn ObjectModel,
    policies:     PolicyLibrary,
    config:       ComposeConfig,
    participants: Vec<&'a dyn Participant>,
}

impl<'a> Composer<'a> {
    pub fn new(model: &'a dyn ObjectModel) -> Self {
        Self {
            model,
            policies:     PolicyLibrary::default(),
            config:       ComposeConfig::default(),
            participants: Vec::new(),
        }
    }

    /// Append a participant; participants are folded in call order.
    pub fn with(mut self, participant: &'a dyn Participant) -> Self {
        self.participants.push(participant);
        self
    }

    /// Replace the policy library (defaults to the five built-ins).
    pub fn policies(mut self, policies: PolicyLibrary) -> Self {
        self.policies = policies;
        self
    }

    pub fn config(mut self, config: ComposeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn compose(self) -> ComposeResult<ComposedBehavior> {
        self.compose_observed(&mut NoopObserver)
    }

    /// Run the fold, reporting each successful step to `observer`.
    pub fn compose_observed(self, observer: &mut dyn ComposeObserver) -> ComposeResult<ComposedBehavior> {
        if self.participants.is_empty() {
            return Err(ComposeError::NoParticipants);
        }

        let mut fold = Fold {
            model:    self.model,
            policies: &self.policies,
            observer,
            root:     None,
            slots:    SlotTable::new(),
        };
        for (index, p) in self.participants.iter().enumerate() {
            fold.step(index, *p)?;
        }
        let Fold { root, slots, observer, .. } = fold;

        // Markers the chain root answers are satisfied at call time.
        let outstanding: Vec<String> = slots
            .iter()
            .filter(|(_, s)| s.is_dependency())
            .filter(|(n, _)| !root.is_some_and(|r| self.model.chain_defines(r, n)))
            .map(|(n, _)| n.to_string())
            .collect();
        if self.config.require_complete && !outstanding.is_empty() {
            return Err(ComposeError::Incomplete { names: outstanding });
        }

        let names: Vec<Arc<str>> = self.participants.iter().map(|p| Arc::from(p.name())).collect();
        let name: Arc<str> = match &self.config.name {
            Some(n) => Arc::from(n.as_str()),
            None => Arc::from(names.join("+")),
        };
        let composed = ComposedBehavior::new(name, root, slots, names);
        debug!(
            behavior = composed.name(),
            root = ?composed.chain_root(),
            members = composed.slots().len(),
            outstanding = outstanding.len(),
            "composed"
        );
        observer.on_complete(&composed);
        Ok(composed)
    }
}

// ── Fold state ────────────────────────────────────────────────────────────────

struct Fold<'a, 'o> {
    model:    &'a dyn ObjectModel,
    policies: &'a PolicyLibrary,
    observer: &'o mut dyn ComposeObserver,
    root:     Option<ChainRootId>,
    slots:    SlotTable,
}

impl Fold<'_, '_> {
    fn step(&mut self, index: usize, p: &dyn Participant) -> ComposeResult<()> {
        let who = p.name();
        self.observer.on_participant(index, who, p.chain_root());
        debug!(participant = who, index, root = ?p.chain_root(), "folding");

        // ① chain root
        let candidate = p.chain_root();
        if !is_compatible(self.model, candidate, self.root) {
            return Err(ComposeError::IncompatibleChain {
                behavior:    who.to_string(),
                candidate,
                accumulated: self.root,
            });
        }
        self.root = narrowest(self.model, candidate, self.root);

        // ② methods and properties
        for (name, slot) in p.slots() {
            match slot {
                Slot::Method(_) | Slot::Property(_) => self.assign(who, name, slot)?,
                Slot::Dependency | Slot::Resolution(_) => {}
            }
        }

        // ③ dependency markers
        for (name, slot) in p.slots() {
            if slot.is_dependency() {
                self.require(who, name)?;
            }
        }

        // ④ resolution directives
        for (name, slot) in p.slots() {
            if let Slot::Resolution(directive) = slot {
                self.resolve(who, name, directive)?;
            }
        }
        Ok(())
    }

    fn assign(&mut self, who: &str, name: &Arc<str>, slot: &Slot) -> ComposeResult<()> {
        match (self.slots.get(name), slot) {
            (None, _) | (Some(Slot::Dependency), Slot::Method(_)) => {}
            (Some(Slot::Dependency), _) => {
                return Err(ComposeError::DependencyType {
                    method:   name.to_string(),
                    behavior: who.to_string(),
                    found:    slot.kind(),
                });
            }
            (Some(_), _) => {
                return Err(ComposeError::Conflict {
                    method:   name.to_string(),
                    behavior: who.to_string(),
                });
            }
        }
        self.slots.insert(Arc::clone(name), slot.clone());
        self.observer.on_install(who, name, slot.kind());
        Ok(())
    }

    fn require(&mut self, who: &str, name: &Arc<str>) -> ComposeResult<()> {
        match self.slots.get(name) {
            None => {
                self.slots.insert(Arc::clone(name), Slot::Dependency);
                self.observer.on_install(who, name, Slot::Dependency.kind());
                Ok(())
            }
            Some(Slot::Method(_) | Slot::Dependency) => Ok(()),
            Some(other) => Err(ComposeError::DependencyType {
                method:   name.to_string(),
                behavior: who.to_string(),
                found:    other.kind(),
            }),
        }
    }

    fn resolve(&mut self, who: &str, name: &Arc<str>, directive: &ResolutionDirective) -> ComposeResult<()> {
        let existing = match self.slots.get(name) {
            Some(Slot::Method(m)) => Arc::clone(m),
            Some(Slot::Property(_)) => {
                return Err(ComposeError::Conflict {
                    method:   name.to_string(),
                    behavior: who.to_string(),
                });
            }
            None | Some(Slot::Dependency | Slot::Resolution(_)) => {
                return Err(ComposeError::UnexpectedResolution {
                    method:   name.to_string(),
                    behavior: who.to_string(),
                });
            }
        };
        let merged = self
            .policies
            .apply(&directive.policy, Arc::clone(&directive.method), existing)
            .ok_or_else(|| ComposeError::UnknownPolicy {
                method:   name.to_string(),
                policy:   directive.policy.to_string(),
                behavior: who.to_string(),
            })?;
        self.slots.insert(Arc::clone(name), Slot::Method(merged));
        debug!(participant = who, method = &**name, policy = &*directive.policy, "resolved");
        self.observer.on_resolve(who, name, &directive.policy);
        Ok(())
    }
}
