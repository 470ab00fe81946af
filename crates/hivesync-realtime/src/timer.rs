//! Named, cancellable timer registry.
//!
//! All periodic and one-shot background work in the engine runs through
//! this registry. Starting a name that is already scheduled aborts the
//! previous task first, so restart is idempotent by construction and a
//! component can never leak a duplicate timer.

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::trace;

/// Registry of named background tasks.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    tasks: DashMap<String, JoinHandle<()>>,
}

impl TimerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    /// Spawn `future` under `name`, aborting any task previously
    /// registered under the same name.
    pub fn start<F>(&self, name: &str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Some((_, previous)) = self.tasks.remove(name) {
            trace!(name, "Replacing scheduled timer");
            previous.abort();
        }
        self.tasks.insert(name.to_string(), tokio::spawn(future));
    }

    /// Cancel the task registered under `name`, if any.
    ///
    /// The pending timer is cleared synchronously; calling this for an
    /// unknown or already-cancelled name is a no-op.
    pub fn cancel(&self, name: &str) {
        if let Some((_, handle)) = self.tasks.remove(name) {
            handle.abort();
        }
    }

    /// Cancel every registered task.
    pub fn cancel_all(&self) {
        let names: Vec<String> = self.tasks.iter().map(|e| e.key().clone()).collect();
        for name in names {
            self.cancel(&name);
        }
    }

    /// Whether a task is currently registered under `name`.
    pub fn is_scheduled(&self, name: &str) -> bool {
        self.tasks
            .get(name)
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
