//! Composition options.

/// Options for one composition.
///
/// The default composes anonymously and defers unsatisfied dependencies to
/// call time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ComposeConfig {
    /// Name of the composed behavior.  `None` joins the participant names
    /// with `+`.
    pub name: Option<String>,

    /// Fail with [`ComposeError::Incomplete`][crate::ComposeError::Incomplete]
    /// when dependency markers remain after the fold and the composed chain
    /// root does not define them either, instead of letting the first call
    /// to them fail.
    pub require_complete: bool,
}

impl ComposeConfig {
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()), ..Self::default() }
    }

    pub fn strict(mut self) -> Self {
        self.require_complete = true;
        self
    }
}
