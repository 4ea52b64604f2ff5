//! Per-load registry of spawned request tasks.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::task::AbortHandle;

/// Handles of every task spawned by one load cycle.
///
/// Tasks run to completion unless the load is abandoned, which aborts every
/// registered task and any task registered afterwards. Once the load has
/// reported its outcome the handles are released and later registrations
/// are not tracked.
#[derive(Debug, Default)]
pub(crate) struct TaskRegistry {
    handles: Mutex<Vec<AbortHandle>>,
    spawned: AtomicUsize,
    abandoned: AtomicBool,
    finished: AtomicBool,
}

impl TaskRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Tracks a spawned task. Aborts it right away if the load was abandoned.
    pub(crate) fn register(&self, handle: AbortHandle) {
        let mut handles = self.handles.lock();
        self.spawned.fetch_add(1, Ordering::Relaxed);
        if self.is_abandoned() {
            handle.abort();
            return;
        }
        if !self.is_finished() {
            handles.push(handle);
        }
    }

    /// Drops every tracked handle without aborting. Called once the load has
    /// delivered its outcome.
    pub(crate) fn release(&self) {
        let mut handles = self.handles.lock();
        self.finished.store(true, Ordering::Release);
        handles.clear();
    }

    /// Aborts every tracked task. Returns how many handles were aborted.
    pub(crate) fn abandon(&self) -> usize {
        let mut handles = self.handles.lock();
        self.abandoned.store(true, Ordering::Release);
        let count = handles.len();
        for handle in handles.drain(..) {
            handle.abort();
        }
        count
    }

    pub(crate) fn is_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::Acquire)
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Number of tasks registered over the life of the load.
    pub(crate) fn spawned(&self) -> usize {
        self.spawned.load(Ordering::Relaxed)
    }

    /// Number of tasks currently tracked.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.handles.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_abandon_aborts_registered_tasks() {
        let registry = TaskRegistry::new();
        let task = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        registry.register(task.abort_handle());
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.abandon(), 1);

        assert!(registry.is_abandoned());
        assert_eq!(registry.len(), 0);
        assert!(task.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_register_after_abandon_aborts_immediately() {
        let registry = TaskRegistry::new();
        registry.abandon();

        let task = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        registry.register(task.abort_handle());

        assert_eq!(registry.len(), 0);
        assert_eq!(registry.spawned(), 1);
        assert!(task.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_release_drops_handles_without_aborting() {
        let registry = TaskRegistry::new();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let task = tokio::spawn(async move {
            rx.await.unwrap_or(0u8)
        });
        registry.register(task.abort_handle());

        registry.release();
        assert!(registry.is_finished());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.abandon(), 0);

        tx.send(7).unwrap();
        assert_eq!(task.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_register_after_release_is_not_tracked() {
        let registry = TaskRegistry::new();
        registry.release();

        let task = tokio::spawn(async {});
        registry.register(task.abort_handle());

        assert_eq!(registry.len(), 0);
        assert_eq!(registry.spawned(), 1);
        task.await.unwrap();
    }
}
