//! Snapshot/confirm-or-rollback helper for optimistic writes.

/// Captures the pre-mutation value so a failed remote mutation can be
/// undone.
///
/// Usage is three steps: `begin` with the current value, write the
/// provisional value wherever it lives, then either `confirm` after the
/// remote call succeeds or take the snapshot back via `rollback` and
/// restore it. `None` as the snapshot means there was no prior value and
/// rollback should evict the provisional one.
#[derive(Debug)]
#[must_use = "an unconfirmed optimistic write still holds the rollback snapshot"]
pub struct OptimisticWrite<T> {
    snapshot: Option<T>,
}

impl<T> OptimisticWrite<T> {
    /// Capture the value as it was before the provisional write.
    pub fn begin(snapshot: Option<T>) -> Self {
        Self { snapshot }
    }

    /// Peek at the captured value.
    pub fn snapshot(&self) -> Option<&T> {
        self.snapshot.as_ref()
    }

    /// The remote mutation succeeded; the snapshot is no longer needed.
    pub fn confirm(self) {}

    /// The remote mutation failed; hand the snapshot back for restoring.
    pub fn rollback(self) -> Option<T> {
        self.snapshot
    }
}
