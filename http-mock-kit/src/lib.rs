//! A mock HTTP transport for unit testing code that talks HTTP.
//!
//! Code under test sends requests through the [`HttpTransport`] trait. In tests a
//! [`MockTransport`] stands in for the real client: it answers from pre-configured rules instead
//! of touching the network, and lets the test decide when each response is delivered.
//!
//! ## Features
//!
//! - Ordered, one-shot expectations for asserting an exact sequence of calls
//! - Repeatable backend definitions for stubbing stable dependencies
//! - Manual flushing to hold responses back and release them one at a time
//! - A configurable fallback response for requests no rule matches
//! - Verification of outstanding requests and unconsumed expectations
//!
//! ## Examples
//!
//! ### Stubbing a backend
//!
//! ```rust
//! # use futures::FutureExt;
//! use http_mock_kit::matchers::{method, path};
//! use http_mock_kit::{HttpMethod, MockTransport, create_request, create_response};
//!
//! let transport = MockTransport::new();
//! transport
//!     .when(method(HttpMethod::GET))
//!     .and(path("/todos/1"))
//!     .respond_with(create_response().body_str(r#"{"id":1}"#).build());
//!
//! let request = create_request().get("https://example.com/todos/1").build();
//! # let response = transport.send(request).now_or_never().unwrap().unwrap();
//! # assert_eq!(response.status, 200);
//! ```
//!
//! ### Controlling when responses arrive
//!
//! ```rust
//! # use futures::FutureExt;
//! use http_mock_kit::matchers::url;
//! use http_mock_kit::{MockTransport, create_request, create_response};
//!
//! let transport = MockTransport::builder().auto_flush(false).build();
//! transport.expect(url("https://example.com/a")).respond_with(create_response().build());
//! transport.expect(url("https://example.com/b")).respond_with(create_response().build());
//!
//! let mut a = transport.send(create_request().get("https://example.com/a").build());
//! let mut b = transport.send(create_request().get("https://example.com/b").build());
//! assert!(transport.verify_no_outstanding_requests().is_err());
//!
//! transport.flush_count(1);
//! assert!((&mut a).now_or_never().is_some());
//! assert!((&mut b).now_or_never().is_none());
//!
//! transport.flush();
//! assert!(b.now_or_never().is_some());
//! assert!(transport.verify_no_outstanding_requests().is_ok());
//! assert!(transport.verify_no_outstanding_expectations().is_ok());
//! ```
//!
//! ### Unmatched requests
//!
//! Requests that no rule matches are not errors. They receive the fallback response, a `404`
//! with the body [`NO_MATCHING_HANDLER`] unless replaced with
//! [`MockTransport::set_fallback_response`].

#![warn(
    elided_lifetimes_in_paths,
    missing_debug_implementations,
    missing_docs
)]

mod error;
mod gate;
pub mod matchers;
mod mock;
mod request;
mod respond;
mod response;
mod rule;
mod tracker;
mod transport;

pub use error::*;
pub use gate::{Abandoned, FlushGate, GateWait};
pub use mock::*;
pub use request::*;
pub use respond::*;
pub use response::*;
pub use rule::*;
pub use transport::*;
