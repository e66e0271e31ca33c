//! Call-time and object-model errors.
//!
//! Composition errors live in `mx-compose`; everything here can only happen
//! once instances exist and methods are being invoked.

use thiserror::Error;

use crate::{ChainRootId, InstanceId};

/// Failure raised while invoking a method on an instance or private context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    #[error("{receiver} has no method `{name}`")]
    MethodNotFound {
        name:     String,
        receiver: InstanceId,
    },

    /// A Dependency Marker was never satisfied by any composition partner
    /// nor by the instance's chain root.
    #[error("dependency `{name}` has no implementation")]
    MissingImplementation { name: String },

    #[error("member `{name}` is a property, not a method")]
    NotCallable { name: String },

    /// A private body asked its context for a name the behavior neither
    /// declared as a dependency nor defined as a private method.
    #[error("`{name}` is not in the private scope of behavior `{behavior}`")]
    NotInScope {
        name:     String,
        behavior: String,
    },

    #[error("receiver of a private context was dropped")]
    ReceiverDropped,

    #[error("argument {index} of `{method}`: expected {expected}")]
    BadArgument {
        method:   String,
        index:    usize,
        expected: &'static str,
    },

    /// Raised by method bodies themselves.
    #[error("{0}")]
    Failed(String),
}

/// Failure raised by an [`ObjectModel`][crate::ObjectModel].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("chain root {0} is not registered")]
    UnknownRoot(ChainRootId),

    #[error("chain root `{name}` names unregistered parent {parent}")]
    UnknownParent {
        name:   String,
        parent: ChainRootId,
    },
}

pub type CallResult<T> = Result<T, CallError>;

pub type ModelResult<T> = Result<T, ModelError>;
