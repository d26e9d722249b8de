//! Listeners observe one tracked entity type.

use crate::delta::ChangePair;

/// Observes changes of a tracked entity and reports counter deltas.
pub trait Listener<E>: Send + Sync {
    /// Relation paths that must be loaded on both snapshots before comparison.
    fn relation_dependencies(&self) -> &'static [&'static str];

    /// Compares the old and new snapshot.
    ///
    /// `old` is absent on creation, `new` is absent on deletion. Returns `None`
    /// if the change does not affect any derived counter.
    fn has_value_changed(&self, old: Option<&E>, new: Option<&E>) -> Option<ChangePair>;
}
