//! `mx-core` — object model for the `rust_mixin` framework.
//!
//! Every other `mx-*` crate depends on this one.  It knows nothing about
//! behaviors or composition; it only provides the things those crates
//! operate on.
//!
//! # What lives here
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`ids`]        | `ChainRootId`, `InstanceId`                                  |
//! | [`value`]      | `Value`, `Function`, `Method`, `Body`                        |
//! | [`instance`]   | `Instance`, `Member`, `WeakInstance`                         |
//! | [`context`]    | `PrivateContext`, `ContextKey`                               |
//! | [`state`]      | `StateMap` — typed private state                             |
//! | [`chain`]      | `ObjectModel` trait, `ChainRoot`, `ChainRegistry` + builder  |
//! | [`error`]      | `CallError`, `ModelError`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                       |
//! |---------|----------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the ids.   |

pub mod chain;
pub mod context;
pub mod error;
pub mod ids;
pub mod instance;
pub mod state;
pub mod value;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use chain::{ChainRegistry, ChainRegistryBuilder, ChainRoot, ObjectModel};
pub use context::{ContextKey, PrivateContext};
pub use error::{CallError, CallResult, ModelError, ModelResult};
pub use ids::{ChainRootId, InstanceId};
pub use instance::{Instance, Member, WeakInstance};
pub use state::{StateMap, StateSlot, TypedSlot};
pub use value::{Body, Function, Method, Value, arg, body, method};
