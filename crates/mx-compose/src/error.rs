use mx_core::ChainRootId;
use thiserror::Error;

/// Why a composition was rejected.  Every variant aborts the whole fold; no
/// partial result is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    #[error("nothing to compose")]
    NoParticipants,

    /// Two participants implement the same name and the later one supplied
    /// no resolution directive for it.
    #[error("`{behavior}` redefines `{method}` without a resolution")]
    Conflict {
        method:   String,
        behavior: String,
    },

    /// A directive targets a name that has no implementation to resolve
    /// against.
    #[error("`{behavior}` resolves `{method}`, which has no implementation to conflict with")]
    UnexpectedResolution {
        method:   String,
        behavior: String,
    },

    #[error("chain root {candidate:?} of `{behavior}` is not on the same chain as {accumulated:?}")]
    IncompatibleChain {
        behavior:    String,
        candidate:   Option<ChainRootId>,
        accumulated: Option<ChainRootId>,
    },

    /// A dependency name met a non-callable value.
    #[error("`{behavior}` gives dependency `{method}` a {found}")]
    DependencyType {
        method:   String,
        behavior: String,
        found:    &'static str,
    },

    #[error("`{behavior}` resolves `{method}` with unknown policy `{policy}`")]
    UnknownPolicy {
        method:   String,
        policy:   String,
        behavior: String,
    },

    /// Strict mode only: dependencies left unsatisfied after the fold.
    #[error("unsatisfied dependencies: {}", names.join(", "))]
    Incomplete { names: Vec<String> },
}

pub type ComposeResult<T> = Result<T, ComposeError>;
