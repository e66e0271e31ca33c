//! `mx-compose` — the composition engine for the `rust_mixin` framework.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`engine`]    | `compose`, `Composer` — the left fold                         |
//! | [`compat`]    | Chain-root compatibility checks                               |
//! | [`composed`]  | `ComposedBehavior`                                            |
//! | [`config`]    | `ComposeConfig`                                               |
//! | [`observer`]  | `ComposeObserver` trait, `NoopObserver`                       |
//! | [`error`]     | `ComposeError`, `ComposeResult<T>`                            |
//!
//! # Quick-start
//!
//! ```rust
//! use mx_behavior::{encapsulate, resolve, Behavior, BehaviorDefinition, PolicyTag};
//! use mx_compose::Composer;
//! use mx_core::{ChainRegistry, Value};
//!
//! let registry = ChainRegistry::empty();
//! let songs = encapsulate(&BehaviorDefinition::new("SingsSongs")
//!     .method("initialize", |ctx, _| Ok(ctx.this())));
//! let awards = encapsulate(&BehaviorDefinition::new("HasAwards")
//!     .method("initialize", |ctx, _| Ok(ctx.this())));
//! let awards = resolve(&awards, [("initialize", PolicyTag::After)]).unwrap();
//!
//! let singer = Composer::new(&registry).with(&songs).with(&awards).compose().unwrap();
//! let star = singer.instantiate(&registry).unwrap();
//! assert_eq!(star.call("initialize", &[]).unwrap(), Value::Instance(star.clone()));
//! ```
//!
//! # Policy naming
//!
//! The conflict policies keep their historical, surprising semantics; see
//! [`mx_behavior::policy`] before relying on a tag's name.

pub mod compat;
pub mod composed;
pub mod config;
pub mod engine;
pub mod error;
pub mod observer;


pub use compat::{is_compatible, narrowest};
pub use composed::ComposedBehavior;
pub use config::ComposeConfig;
pub use engine::{Composer, compose};
pub use error::{ComposeError, ComposeResult};
pub use observer::{ComposeObserver, NoopObserver};
