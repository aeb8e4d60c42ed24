//! A single-resolution release signal shared by deferred completions.

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

/// A gate was dropped before it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abandoned;

/// Releases every waiter exactly once.
///
/// Waiters obtained from [`FlushGate::wait`] complete with `Ok(())` once [`FlushGate::resolve`]
/// is called, or with `Err(Abandoned)` if the gate is dropped unresolved. Any number of waiters
/// may share one gate.
pub struct FlushGate {
    trigger: Mutex<Option<oneshot::Sender<()>>>,
    signal: Shared<oneshot::Receiver<()>>,
    resolved: AtomicBool,
}

impl FlushGate {
    /// Creates an unresolved gate.
    pub fn new() -> Self {
        let (trigger, signal) = oneshot::channel();
        Self {
            trigger: Mutex::new(Some(trigger)),
            signal: signal.shared(),
            resolved: AtomicBool::new(false),
        }
    }

    /// Creates a gate that is already resolved.
    pub fn resolved() -> Self {
        let gate = Self::new();
        gate.resolve();
        gate
    }

    /// Resolves the gate, releasing every waiter.
    ///
    /// Returns `true` for the call that actually resolved it; later calls do nothing.
    pub fn resolve(&self) -> bool {
        let Some(trigger) = self.trigger.lock().take() else {
            return false;
        };
        self.resolved.store(true, Ordering::SeqCst);
        // The receiver half lives in `self.signal`, so the send cannot fail.
        let _ = trigger.send(());
        true
    }

    /// Whether [`resolve`](Self::resolve) has been called.
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::SeqCst)
    }

    /// A future that completes once the gate is resolved.
    pub fn wait(&self) -> GateWait {
        GateWait(self.signal.clone())
    }
}

impl Default for FlushGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FlushGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlushGate")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Future returned by [`FlushGate::wait`].
#[must_use = "futures do nothing unless polled"]
pub struct GateWait(Shared<oneshot::Receiver<()>>);

impl Future for GateWait {
    type Output = Result<(), Abandoned>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.poll_unpin(cx).map(|res| res.map_err(|_| Abandoned))
    }
}

impl fmt::Debug for GateWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GateWait").finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures::FutureExt;

    #[test]
    fn test_waiters_block_until_resolved() {
        let gate = FlushGate::new();
        let mut first = gate.wait();
        let second = gate.wait();

        assert_eq!((&mut first).now_or_never(), None);
        assert!(gate.resolve());
        assert_eq!(first.now_or_never(), Some(Ok(())));
        assert_eq!(second.now_or_never(), Some(Ok(())));
    }

    #[test]
    fn test_resolve_is_single_shot() {
        let gate = FlushGate::new();

        assert!(!gate.is_resolved());
        assert!(gate.resolve());
        assert!(!gate.resolve());
        assert!(gate.is_resolved());
    }

    #[test]
    fn test_pre_resolved_gate_releases_immediately() {
        let gate = FlushGate::resolved();

        assert!(gate.is_resolved());
        assert_eq!(gate.wait().now_or_never(), Some(Ok(())));
    }

    #[test]
    fn test_dropped_gate_abandons_waiters() {
        let gate = FlushGate::new();
        let wait = gate.wait();

        drop(gate);

        assert_eq!(wait.now_or_never(), Some(Err(Abandoned)));
    }
}
