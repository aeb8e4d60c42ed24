//! Counting of requests that were accepted for dispatch but have not completed yet.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts accepted-but-unresolved requests.
#[derive(Debug, Default, Clone)]
pub(crate) struct OutstandingTracker(Arc<AtomicUsize>);

impl OutstandingTracker {
    /// Counts one more outstanding request and returns the ticket that will settle it.
    pub(crate) fn accept(&self) -> Arc<Ticket> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Arc::new(Ticket {
            counter: self.0.clone(),
            settled: AtomicBool::new(false),
        })
    }

    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// One outstanding request. Settling it decrements the tracker exactly once.
#[derive(Debug)]
pub(crate) struct Ticket {
    counter: Arc<AtomicUsize>,
    settled: AtomicBool,
}

impl Ticket {
    /// Decrements the tracker unless this ticket was already settled.
    ///
    /// Returns `true` for the call that did the decrement.
    pub(crate) fn settle(&self) -> bool {
        if self.settled.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.counter.fetch_sub(1, Ordering::SeqCst);
        true
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.settled.load(Ordering::SeqCst)
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.settle();
    }
}
