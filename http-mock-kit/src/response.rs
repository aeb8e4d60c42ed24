//! HTTP response values and a builder for constructing them.

use crate::request::{find_header, HttpHeader};
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

const STATUS_CODE_OK: u16 = 200;
const STATUS_CODE_NOT_FOUND: u16 = 404;

/// Body of the response synthesized when no rule matches a request.
pub const NO_MATCHING_HANDLER: &str = "No matching mock handler";

/// An HTTP response produced by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers, in insertion order.
    pub headers: Vec<HttpHeader>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A 404 response whose body carries `reason`.
    pub fn not_found(reason: &str) -> Self {
        create_response()
            .status(STATUS_CODE_NOT_FOUND)
            .body_str(reason)
            .build()
    }

    /// Returns the value of the header named `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Returns the body decoded as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self {
            status: STATUS_CODE_OK,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// Creates a new HTTP response builder.
pub fn create_response() -> HttpResponseBuilder {
    HttpResponseBuilder::new()
}

/// A builder for a HTTP response.
#[derive(Debug)]
pub struct HttpResponseBuilder(HttpResponse);

impl HttpResponseBuilder {
    /// Creates a new HTTP response builder.
    pub fn new() -> Self {
        Self(HttpResponse::default())
    }

    /// Sets the HTTP status code.
    pub fn status(mut self, status: u16) -> Self {
        self.0.status = status;
        self
    }

    /// Adds a HTTP header to the HTTP response.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.0.headers.push(HttpHeader::new(name, value));
        self
    }

    /// Sets the HTTP response body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.0.body = body;
        self
    }

    /// Sets the HTTP response body text.
    pub fn body_str(mut self, body: &str) -> Self {
        self.0.body = body.as_bytes().to_vec();
        self
    }

    /// Serializes `value` as the JSON body and sets the content type.
    ///
    /// A value that fails to serialize leaves the body untouched and logs a warning.
    pub fn body_json<T: Serialize>(self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => self.header("Content-Type", "application/json").body(body),
            Err(error) => {
                warn!("Failed to serialize JSON body: {error}");
                self
            }
        }
    }

    /// Builds the HTTP response.
    pub fn build(self) -> HttpResponse {
        self.0
    }
}

impl Default for HttpResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
