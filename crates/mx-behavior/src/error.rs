use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BehaviorError {
    /// `resolve` was asked to attach a policy to something that is not a
    /// public method of the behavior.
    #[error("behavior `{behavior}` has no public method `{name}` to resolve")]
    NotAMethod {
        behavior: String,
        name:     String,
    },

    #[error("unknown policy `{0}`")]
    UnknownPolicy(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
