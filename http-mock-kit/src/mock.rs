//! Mocks an HTTP transport.
//!
//! [`MockTransport`] keeps two rule sets. Expectations are one-shot and must be met in the order
//! they were registered; backend definitions answer any number of matching requests. While at
//! least one expectation is pending, only the head of the expectation queue is consulted: if it
//! does not match, the request gets the fallback response and backend definitions are skipped.
//!
//! Matched requests complete through a flush gate. With auto-flush on (the default) the gate is
//! already open. With auto-flush off every request waits until [`MockTransport::flush`] or
//! [`MockTransport::flush_count`] releases it, in the order the requests arrived.

use crate::error::{InvalidState, TransportError};
use crate::gate::{Abandoned, FlushGate};
use crate::matchers::Match;
use crate::request::HttpRequest;
use crate::respond::{Respond, ResponseFuture};
use crate::response::{HttpResponse, NO_MATCHING_HANDLER};
use crate::rule::{Rule, RuleBuilder, RuleHandle};
use crate::tracker::{OutstandingTracker, Ticket};
use crate::transport::HttpTransport;
use futures::FutureExt;
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Weak};

/// An in-memory [`HttpTransport`] answering requests from registered rules.
///
/// Cloning yields another handle to the same transport, so one clone can be handed to the code
/// under test while the test keeps another to register rules, flush and verify.
///
/// Matchers run while the transport's internal lock is held and must not call back into it.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Engine>,
}

#[derive(Default)]
struct Engine {
    state: Mutex<State>,
    outstanding: OutstandingTracker,
}

struct State {
    expectations: VecDeque<Rule>,
    definitions: Vec<Rule>,
    auto_flush: bool,
    // Shared by every request dispatched while auto-flush is on.
    open_gate: FlushGate,
    // One entry per request dispatched while auto-flush is off, oldest first.
    pending: VecDeque<PendingFlush>,
    fallback: Option<HttpResponse>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            expectations: VecDeque::new(),
            definitions: Vec::new(),
            auto_flush: true,
            open_gate: FlushGate::resolved(),
            pending: VecDeque::new(),
            fallback: None,
        }
    }
}

/// A dispatched request waiting for a flush.
struct PendingFlush {
    gate: FlushGate,
    ticket: Weak<Ticket>,
    request: String,
}

impl PendingFlush {
    /// Settles the outstanding count, then opens the gate.
    ///
    /// Returns `false` if the caller already gave up on the response.
    fn release(self) -> bool {
        let Some(ticket) = self.ticket.upgrade() else {
            debug!("Skipping flush of abandoned request {}", self.request);
            return false;
        };
        ticket.settle();
        self.gate.resolve();
        debug!("Released {}", self.request);
        true
    }

    fn is_abandoned(&self) -> bool {
        self.ticket.upgrade().is_none_or(|ticket| ticket.is_settled())
    }
}

impl State {
    /// Picks the responder for `request`, consuming the head expectation if it matches.
    fn select(&mut self, request: &HttpRequest) -> Arc<dyn Respond> {
        if let Some(head) = self.expectations.front() {
            if !head.matches(request) {
                warn!(
                    "{request} does not match the next expectation ({}); using the fallback response",
                    head.describe()
                );
                return self.fallback_responder();
            }
            if let Some(expectation) = self.expectations.pop_front() {
                debug!("{request} matched expectation ({})", expectation.describe());
                return expectation.dispatch();
            }
        }
        match self.definitions.iter().find(|rule| rule.matches(request)) {
            Some(definition) => {
                debug!("{request} matched backend definition ({})", definition.describe());
                definition.dispatch()
            }
            None => {
                warn!("No mock handler matches {request}; using the fallback response");
                self.fallback_responder()
            }
        }
    }

    fn fallback(&mut self) -> &HttpResponse {
        self.fallback
            .get_or_insert_with(|| HttpResponse::not_found(NO_MATCHING_HANDLER))
    }

    fn fallback_responder(&mut self) -> Arc<dyn Respond> {
        Arc::new(self.fallback().clone())
    }

    /// Releases up to `count` live pending requests, oldest first.
    fn release(&mut self, count: usize) -> usize {
        let mut released = 0;
        while released < count {
            let Some(entry) = self.pending.pop_front() else {
                break;
            };
            if entry.release() {
                released += 1;
            }
        }
        released
    }

    /// Drops entries whose response future is gone.
    fn prune_abandoned(&mut self) {
        let before = self.pending.len();
        self.pending.retain(|entry| !entry.is_abandoned());
        let pruned = before - self.pending.len();
        if pruned > 0 {
            debug!("Pruned {pruned} abandoned requests");
        }
    }

    fn live_pending(&self) -> usize {
        self.pending
            .iter()
            .filter(|entry| !entry.is_abandoned())
            .count()
    }
}

impl MockTransport {
    /// Creates a transport with auto-flush on, no rules and the default fallback response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder to configure a transport.
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder::new()
    }

    /// Appends `rule` to the queue of one-shot, ordered expectations.
    pub fn register_expectation(&self, rule: Rule) -> RuleHandle {
        let handle = rule.handle();
        let mut state = self.inner.state.lock();
        state.expectations.push_back(rule);
        debug!(
            "Registered expectation #{} ({})",
            state.expectations.len(),
            handle.describe()
        );
        handle
    }

    /// Appends `rule` to the list of repeatable backend definitions.
    pub fn register_backend_definition(&self, rule: Rule) -> RuleHandle {
        let handle = rule.handle();
        let mut state = self.inner.state.lock();
        state.definitions.push(rule);
        debug!(
            "Registered backend definition #{} ({})",
            state.definitions.len(),
            handle.describe()
        );
        handle
    }

    /// Starts an expectation for requests accepted by `matcher`.
    pub fn expect<M: Match + 'static>(&self, matcher: M) -> PendingRule<'_> {
        PendingRule {
            transport: self,
            kind: RuleKind::Expectation,
            builder: Rule::given(matcher),
        }
    }

    /// Starts a backend definition for requests accepted by `matcher`.
    pub fn when<M: Match + 'static>(&self, matcher: M) -> PendingRule<'_> {
        PendingRule {
            transport: self,
            kind: RuleKind::BackendDefinition,
            builder: Rule::given(matcher),
        }
    }

    /// Dispatches `request` and returns its deferred response.
    ///
    /// The rule is selected, and the request counted as outstanding, before this returns. The
    /// returned future completes once the request is released: immediately with auto-flush on,
    /// otherwise on a later flush. Dropping the future before that abandons the request and
    /// removes it from the outstanding count.
    pub fn send(&self, request: HttpRequest) -> ResponseFuture {
        let (responder, ticket, released) = {
            let mut state = self.inner.state.lock();
            let responder = state.select(&request);
            let ticket = self.inner.outstanding.accept();
            let released = if state.auto_flush {
                ticket.settle();
                state.open_gate.wait()
            } else {
                state.prune_abandoned();
                let gate = FlushGate::new();
                let released = gate.wait();
                state.pending.push_back(PendingFlush {
                    gate,
                    ticket: Arc::downgrade(&ticket),
                    request: request.to_string(),
                });
                debug!("Deferred {request} until the next flush");
                released
            };
            (responder, ticket, released)
        };

        async move {
            let outcome = released.await;
            drop(ticket);
            match outcome {
                Ok(()) => responder.respond(&request).await,
                Err(Abandoned) => Err(TransportError::Dropped),
            }
        }
        .boxed()
    }

    /// Whether dispatched requests complete without an explicit flush.
    pub fn auto_flush(&self) -> bool {
        self.inner.state.lock().auto_flush
    }

    /// Switches auto-flush on or off.
    ///
    /// Switching it on first releases every pending request.
    pub fn set_auto_flush(&self, auto_flush: bool) {
        let mut state = self.inner.state.lock();
        if auto_flush {
            let released = state.release(usize::MAX);
            state.open_gate = FlushGate::resolved();
            debug!("Auto-flush enabled, released {released} pending requests");
        } else if state.auto_flush {
            debug!("Auto-flush disabled");
        }
        state.auto_flush = auto_flush;
    }

    /// Releases every pending request, oldest first. Returns how many were released.
    ///
    /// Requests dispatched after this call wait for the next flush.
    pub fn flush(&self) -> usize {
        let mut state = self.inner.state.lock();
        let released = state.release(usize::MAX);
        debug!("Flushed {released} requests");
        released
    }

    /// Releases at most `count` of the oldest pending requests. Returns how many were released.
    ///
    /// Requests whose response future was dropped are discarded without using up `count`.
    pub fn flush_count(&self, count: usize) -> usize {
        let mut state = self.inner.state.lock();
        let released = state.release(count);
        debug!(
            "Flushed {released} of {count} requested, {} still pending",
            state.live_pending()
        );
        released
    }

    /// Returns the response given to requests that no rule matches.
    pub fn fallback_response(&self) -> HttpResponse {
        self.inner.state.lock().fallback().clone()
    }

    /// Replaces the response given to requests that no rule matches.
    pub fn set_fallback_response(&self, response: HttpResponse) {
        self.inner.state.lock().fallback = Some(response);
    }

    /// Removes every unconsumed expectation. Backend definitions are kept.
    pub fn reset_expectations(&self) {
        let mut state = self.inner.state.lock();
        let dropped = state.expectations.len();
        state.expectations.clear();
        debug!("Reset {dropped} expectations");
    }

    /// Returns the number of dispatched requests whose completion has not been released.
    pub fn outstanding_requests(&self) -> usize {
        self.inner.outstanding.count()
    }

    /// Returns the number of registered expectations not yet matched.
    pub fn outstanding_expectations(&self) -> usize {
        self.inner.state.lock().expectations.len()
    }

    /// Returns the number of requests waiting for a flush.
    pub fn pending_flushes(&self) -> usize {
        self.inner.state.lock().live_pending()
    }

    /// Fails if any dispatched request has not been released yet.
    pub fn verify_no_outstanding_requests(&self) -> Result<(), InvalidState> {
        match self.outstanding_requests() {
            0 => Ok(()),
            count => Err(InvalidState::OutstandingRequests(count)),
        }
    }

    /// Fails if any registered expectation has not been matched.
    pub fn verify_no_outstanding_expectations(&self) -> Result<(), InvalidState> {
        let state = self.inner.state.lock();
        if state.expectations.is_empty() {
            return Ok(());
        }
        Err(InvalidState::OutstandingExpectations {
            count: state.expectations.len(),
            descriptions: state.expectations.iter().map(Rule::describe).collect(),
        })
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: HttpRequest) -> ResponseFuture {
        MockTransport::send(self, request)
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("MockTransport")
            .field("expectations", &state.expectations.len())
            .field("definitions", &state.definitions.len())
            .field("auto_flush", &state.auto_flush)
            .field("pending", &state.live_pending())
            .field("outstanding", &self.inner.outstanding.count())
            .finish()
    }
}

#[derive(Debug, Clone, Copy)]
enum RuleKind {
    Expectation,
    BackendDefinition,
}

/// A rule being built against a transport; registered by [`PendingRule::respond_with`].
#[must_use = "the rule is only registered once `respond_with` is called"]
pub struct PendingRule<'a> {
    transport: &'a MockTransport,
    kind: RuleKind,
    builder: RuleBuilder,
}

impl PendingRule<'_> {
    /// Additionally requires `matcher` to accept the request.
    pub fn and<M: Match + 'static>(mut self, matcher: M) -> Self {
        self.builder = self.builder.and(matcher);
        self
    }

    /// Registers the rule with `responder` as its action.
    pub fn respond_with<R: Respond + 'static>(self, responder: R) -> RuleHandle {
        let rule = self.builder.respond_with(responder);
        match self.kind {
            RuleKind::Expectation => self.transport.register_expectation(rule),
            RuleKind::BackendDefinition => self.transport.register_backend_definition(rule),
        }
    }
}

impl fmt::Debug for PendingRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRule")
            .field("kind", &self.kind)
            .field("builder", &self.builder)
            .finish()
    }
}

/// A builder for a [`MockTransport`].
#[derive(Debug)]
pub struct MockTransportBuilder {
    auto_flush: bool,
    fallback: Option<HttpResponse>,
}

impl MockTransportBuilder {
    /// Creates a builder with auto-flush on and the default fallback response.
    pub fn new() -> Self {
        Self {
            auto_flush: true,
            fallback: None,
        }
    }

    /// Sets whether requests complete without an explicit flush.
    pub fn auto_flush(mut self, auto_flush: bool) -> Self {
        self.auto_flush = auto_flush;
        self
    }

    /// Sets the response given to requests that no rule matches.
    pub fn fallback_response(mut self, response: HttpResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Builds the transport.
    pub fn build(self) -> MockTransport {
        let transport = MockTransport::new();
        {
            let mut state = transport.inner.state.lock();
            state.auto_flush = self.auto_flush;
            state.fallback = self.fallback;
        }
        transport
    }
}

impl Default for MockTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
