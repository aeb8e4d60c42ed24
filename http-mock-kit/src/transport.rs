//! The transport seam that code under test depends on.

use crate::request::HttpRequest;
use crate::respond::ResponseFuture;
use std::sync::Arc;

/// Sends a request and eventually yields its response.
///
/// Application code should depend on this trait (or on `Arc<dyn HttpTransport>`) instead of on a
/// concrete client, so that tests can substitute [`MockTransport`](crate::MockTransport).
pub trait HttpTransport: Send + Sync {
    /// Sends `request`.
    fn send(&self, request: HttpRequest) -> ResponseFuture;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn send(&self, request: HttpRequest) -> ResponseFuture {
        (**self).send(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn send(&self, request: HttpRequest) -> ResponseFuture {
        (**self).send(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for Box<T> {
    fn send(&self, request: HttpRequest) -> ResponseFuture {
        (**self).send(request)
    }
}
