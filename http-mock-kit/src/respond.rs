//! Response-producing actions attached to rules.

use crate::error::TransportError;
use crate::request::HttpRequest;
use crate::response::HttpResponse;
use futures::future::{self, BoxFuture, FutureExt};
use std::time::Duration;

/// The future returned by a transport `send` and by [`Respond::respond`].
pub type ResponseFuture = BoxFuture<'static, Result<HttpResponse, TransportError>>;

/// Produces the response for a request a rule was matched against.
///
/// Production runs only after the request has been released by a flush, so implementations
/// see requests in release order.
pub trait Respond: Send + Sync {
    /// Produces the outcome for `request`.
    fn respond(&self, request: &HttpRequest) -> ResponseFuture;
}

impl Respond for HttpResponse {
    fn respond(&self, _request: &HttpRequest) -> ResponseFuture {
        future::ready(Ok(self.clone())).boxed()
    }
}

impl<F> Respond for F
where
    F: Fn(&HttpRequest) -> HttpResponse + Send + Sync,
{
    fn respond(&self, request: &HttpRequest) -> ResponseFuture {
        future::ready(Ok(self(request))).boxed()
    }
}

/// Fails the request with a configured [`TransportError`].
#[derive(Debug, Clone)]
pub struct Failure(pub TransportError);

impl Failure {
    /// A [`TransportError::Rejected`] failure.
    pub fn rejected(status: u16, message: &str) -> Self {
        Self(TransportError::Rejected {
            status,
            message: message.to_string(),
        })
    }
}

impl Respond for Failure {
    fn respond(&self, _request: &HttpRequest) -> ResponseFuture {
        future::ready(Err(self.0.clone())).boxed()
    }
}

/// Waits for `delay` before delegating to the wrapped responder, to simulate latency.
///
/// The wait starts once the request has been released, so a delayed rule under manual flushing
/// completes `delay` after the flush, not after the dispatch. Requires a tokio runtime with the
/// timer enabled.
pub fn delayed<R: Respond>(delay: Duration, inner: R) -> Delayed<R> {
    Delayed { delay, inner }
}

/// See [`delayed`].
#[derive(Debug, Clone)]
pub struct Delayed<R> {
    delay: Duration,
    inner: R,
}

impl<R: Respond> Respond for Delayed<R> {
    fn respond(&self, request: &HttpRequest) -> ResponseFuture {
        let delay = self.delay;
        let outcome = self.inner.respond(request);
        async move {
            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
            outcome.await
        }
        .boxed()
    }
}
