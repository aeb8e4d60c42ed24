//! Errors surfaced by the mock transport.

/// A verification call found leftover work.
///
/// Returned by [`MockTransport::verify_no_outstanding_requests`](crate::MockTransport::verify_no_outstanding_requests)
/// and [`MockTransport::verify_no_outstanding_expectations`](crate::MockTransport::verify_no_outstanding_expectations).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidState {
    /// Requests were dispatched but their completions were never released.
    #[error("there are {0} outstanding requests; call `flush` before verifying")]
    OutstandingRequests(usize),
    /// Registered expectations were never matched.
    #[error("there are {count} unconsumed expectations: [{}]", .descriptions.join(", "))]
    OutstandingExpectations {
        /// Number of unconsumed expectations.
        count: usize,
        /// Descriptions of the unconsumed expectations, in queue order.
        descriptions: Vec<String>,
    },
}

impl InvalidState {
    /// The offending count carried by the error.
    pub fn count(&self) -> usize {
        match self {
            InvalidState::OutstandingRequests(count) => *count,
            InvalidState::OutstandingExpectations { count, .. } => *count,
        }
    }
}

/// The error type of a transport `send`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// A rule was configured to fail the request instead of responding.
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// Status code attached to the rejection.
        status: u16,
        /// Human readable reason.
        message: String,
    },
    /// The transport was dropped while the request was waiting for a flush.
    #[error("the mock transport was dropped before the request was flushed")]
    Dropped,
}
