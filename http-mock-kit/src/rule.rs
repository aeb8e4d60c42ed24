//! Rules pair a matcher with the action that produces the response.

use crate::matchers::{AllOf, Match};
use crate::request::HttpRequest;
use crate::respond::Respond;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A matcher plus a response-producing action.
///
/// Registered either as an expectation (one-shot, ordered) or as a backend definition
/// (repeatable). See [`MockTransport`](crate::MockTransport).
pub struct Rule {
    matcher: AllOf,
    responder: Arc<dyn Respond>,
    times_matched: Arc<AtomicU64>,
}

impl Rule {
    /// Starts building a rule that applies to requests accepted by `matcher`.
    pub fn given<M: Match + 'static>(matcher: M) -> RuleBuilder {
        RuleBuilder {
            matcher: AllOf::new(Box::new(matcher)),
        }
    }

    /// Whether this rule applies to `request`.
    pub fn matches(&self, request: &HttpRequest) -> bool {
        self.matcher.matches(request)
    }

    /// Description of the requests this rule applies to.
    pub fn describe(&self) -> String {
        self.matcher.describe()
    }

    /// A handle that stays valid after the rule has been moved into a transport.
    pub fn handle(&self) -> RuleHandle {
        RuleHandle {
            description: self.describe(),
            times_matched: self.times_matched.clone(),
        }
    }

    /// Records a match and returns the action that will produce the response.
    pub(crate) fn dispatch(&self) -> Arc<dyn Respond> {
        self.times_matched.fetch_add(1, Ordering::SeqCst);
        self.responder.clone()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("matcher", &self.describe())
            .field("times_matched", &self.times_matched.load(Ordering::SeqCst))
            .finish()
    }
}

/// A builder for a [`Rule`].
pub struct RuleBuilder {
    matcher: AllOf,
}

impl RuleBuilder {
    /// Additionally requires `matcher` to accept the request.
    pub fn and<M: Match + 'static>(mut self, matcher: M) -> Self {
        self.matcher.push(Box::new(matcher));
        self
    }

    /// Finishes the rule with the action that produces its response.
    pub fn respond_with<R: Respond + 'static>(self, responder: R) -> Rule {
        Rule {
            matcher: self.matcher,
            responder: Arc::new(responder),
            times_matched: Arc::default(),
        }
    }
}

impl fmt::Debug for RuleBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleBuilder")
            .field("matcher", &self.matcher.describe())
            .finish()
    }
}

/// Observes a registered rule.
#[derive(Debug, Clone)]
pub struct RuleHandle {
    description: String,
    times_matched: Arc<AtomicU64>,
}

impl RuleHandle {
    /// Returns the number of requests this rule has been matched against.
    pub fn times_called(&self) -> u64 {
        self.times_matched.load(Ordering::SeqCst)
    }

    /// Description of the requests the rule applies to.
    pub fn describe(&self) -> &str {
        &self.description
    }
}
