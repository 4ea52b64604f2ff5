//! Fan-in for per-level requests.
//!
//! A [`JoinContext`] is shared by every level request of one load cycle. Each
//! request reports exactly once through [`JoinContext::complete`]. The report
//! that brings the remaining count to zero sorts the collected entries and
//! hands them to the completion continuation. No lock is held while counting
//! down, so completions only contend on the short buffer append.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::types::ListItem;

type Completion = Box<dyn FnOnce(Vec<ListItem>) + Send>;

/// Shared state joining the per-level requests of one load cycle.
pub(crate) struct JoinContext {
    remaining: AtomicUsize,
    results: Mutex<Vec<ListItem>>,
    on_complete: Mutex<Option<Completion>>,
}

impl JoinContext {
    /// Creates a context expecting `expected` completions.
    ///
    /// `expected` must be non-zero; an empty manifest is handled before any
    /// context exists.
    pub(crate) fn new<F>(expected: usize, on_complete: F) -> Arc<Self>
    where
        F: FnOnce(Vec<ListItem>) + Send + 'static,
    {
        debug_assert!(expected > 0);
        Arc::new(Self {
            remaining: AtomicUsize::new(expected),
            results: Mutex::new(Vec::with_capacity(expected)),
            on_complete: Mutex::new(Some(Box::new(on_complete))),
        })
    }

    /// Records one finished request, with its entry if it produced one.
    ///
    /// Returns true for the call that finished the join.
    pub(crate) fn complete(&self, item: Option<ListItem>) -> bool {
        if let Some(item) = item {
            self.results.lock().push(item);
        }

        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Ok(1) => {
                self.finish();
                true
            }
            Ok(_) => false,
            Err(_) => {
                warn!("join completed more times than requests were dispatched");
                false
            }
        }
    }

    /// Requests that have not reported yet.
    pub(crate) fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    fn finish(&self) {
        let mut items = std::mem::take(&mut *self.results.lock());
        // Stable, so duplicate positions keep arrival order.
        items.sort_by_key(|item| item.position);

        if let Some(on_complete) = self.on_complete.lock().take() {
            on_complete(items);
        }
    }
}
