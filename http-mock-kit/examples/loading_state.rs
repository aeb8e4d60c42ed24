//! Observes a client's "loading" flag between dispatching a request and receiving its response.
//!
//! Run with `RUST_LOG=debug cargo run --example loading_state`.

use http_mock_kit::matchers::{method, path};
use http_mock_kit::{
    create_request, create_response, HttpMethod, HttpTransport, MockTransport, TransportError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Fetches a quote and tracks whether a fetch is in flight.
struct QuoteWidget<T> {
    transport: T,
    loading: Arc<AtomicBool>,
}

impl<T: HttpTransport> QuoteWidget<T> {
    async fn refresh(&self) -> Result<String, TransportError> {
        self.loading.store(true, Ordering::SeqCst);
        let request = create_request()
            .get("https://dummyjson.com/quotes/1")
            .header("User-Agent", "http-mock-kit-example")
            .build();
        let response = self.transport.send(request).await;
        self.loading.store(false, Ordering::SeqCst);

        let response = response?;
        if response.status != 200 {
            return Ok(format!("Unexpected status: {}", response.status));
        }
        let quote: serde_json::Value = response.json().unwrap_or_default();
        Ok(quote["author"].as_str().unwrap_or_default().to_string())
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let transport = MockTransport::builder().auto_flush(false).build();
    transport
        .expect(method(HttpMethod::GET))
        .and(path("/quotes/1"))
        .respond_with(
            create_response()
                .body_json(&serde_json::json!({
                    "quote": "Be yourself; everyone else is taken.",
                    "author": "Oscar Wilde"
                }))
                .build(),
        );

    let loading = Arc::new(AtomicBool::new(false));
    let widget = QuoteWidget {
        transport: transport.clone(),
        loading: loading.clone(),
    };
    let task = tokio::spawn(async move { widget.refresh().await });

    while transport.pending_flushes() == 0 {
        tokio::task::yield_now().await;
    }
    println!("loading before flush: {}", loading.load(Ordering::SeqCst));

    transport.flush();
    match task.await {
        Ok(Ok(author)) => println!("author: {author}"),
        Ok(Err(error)) => println!("error: {error}"),
        Err(error) => println!("task failed: {error}"),
    }
    println!("loading after flush: {}", loading.load(Ordering::SeqCst));

    if let Err(error) = transport.verify_no_outstanding_expectations() {
        println!("{error}");
    }
}
