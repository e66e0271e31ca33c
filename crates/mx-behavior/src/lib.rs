//! `mx-behavior` — behaviors, encapsulation and conflict policies.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                   |
//! |------------------|------------------------------------------------------------|
//! | [`definition`]   | `BehaviorDefinition`, `Definition` (entry kinds)           |
//! | [`slot`]         | `Slot`, `SlotTable`, `Participant` / `Behavior` traits     |
//! | [`encapsulate`]  | `encapsulate`, `EncapsulatedBehavior`                      |
//! | [`context`]      | `build_context`, `ScopeTemplate` (lazy per-receiver scope) |
//! | [`policy`]       | Built-in policies, `PolicyTag`, `PolicyLibrary`            |
//! | [`resolve`]      | `resolve`, `AnnotatedBehavior`                             |
//! | [`registry`]     | `MethodRegistry` (late binding), `forward`                 |
//! | [`error`]        | `BehaviorError`, `BehaviorResult<T>`                       |
//!
//! # Pipeline
//!
//! ```text
//! BehaviorDefinition ──encapsulate──▶ EncapsulatedBehavior ──resolve──▶ AnnotatedBehavior
//!                                              │                               │
//!                                              └──────────── mx-compose ◀──────┘
//! ```
//!
//! Behaviors are build-time artifacts: construct them once, then share them
//! read-only.  Private contexts are the only runtime state and live on the
//! receiving [`Instance`][mx_core::Instance].

pub mod context;
pub mod definition;
pub mod encapsulate;
pub mod error;
pub mod policy;
pub mod registry;
pub mod resolve;
pub mod slot;

#[cfg(test)]
mod tests;

pub use context::{ScopeTemplate, build_context};
pub use definition::{BehaviorDefinition, Definition};
pub use encapsulate::{EncapsulatedBehavior, encapsulate};
pub use error::{BehaviorError, BehaviorResult};
pub use policy::{PolicyFn, PolicyLibrary, PolicyTag};
pub use registry::{MethodRegistry, forward};
pub use resolve::{AnnotatedBehavior, resolve};
pub use slot::{Behavior, Participant, ResolutionDirective, Slot, SlotTable};
