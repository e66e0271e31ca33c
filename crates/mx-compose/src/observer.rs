//! Composition observer hooks.

use mx_core::ChainRootId;

use crate::ComposedBehavior;

/// Callbacks invoked by the composition engine as it folds participants.
///
/// All methods have no-op defaults.  Hooks only fire for steps that
/// succeeded; if the fold later fails, `on_complete` is never called.
///
/// # Example — install recorder
///
/// ```rust,ignore
/// struct Installs(Vec<String>);
///
/// impl ComposeObserver for Installs {
///     fn on_install(&mut self, participant: &str, member: &str, _kind: &'static str) {
///         self.0.push(format!("{participant}.{member}"));
///     }
/// }
/// ```
pub trait ComposeObserver {
    /// Called before participant `index` is folded in.
    fn on_participant(&mut self, _index: usize, _name: &str, _root: Option<ChainRootId>) {}

    /// Called when a method, property or dependency marker is added to the
    /// accumulator.
    fn on_install(&mut self, _participant: &str, _member: &str, _kind: &'static str) {}

    /// Called after a policy merged two implementations of `member`.
    fn on_resolve(&mut self, _participant: &str, _member: &str, _policy: &str) {}

    /// Called once with the finished composition.
    fn on_complete(&mut self, _composed: &ComposedBehavior) {}
}

/// A [`ComposeObserver`] that does nothing.
pub struct NoopObserver;

impl ComposeObserver for NoopObserver {}
