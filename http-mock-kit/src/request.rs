//! HTTP request values and a builder for constructing them.

use log::warn;
use serde::Serialize;
use std::fmt;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    GET,
    /// POST
    POST,
    /// PUT
    PUT,
    /// PATCH
    PATCH,
    /// DELETE
    DELETE,
    /// HEAD
    HEAD,
    /// OPTIONS
    OPTIONS,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        };
        f.write_str(verb)
    }
}

/// A single HTTP header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpHeader {
    /// Header name. Compared case-insensitively.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl HttpHeader {
    /// Creates a header from a name and a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Returns the value of the first header named `name`, ignoring ASCII case.
pub(crate) fn find_header<'a>(headers: &'a [HttpHeader], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case(name))
        .map(|header| header.value.as_str())
}

/// An outgoing HTTP request as seen by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL of the request.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Request headers, in insertion order.
    pub headers: Vec<HttpHeader>,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the value of the header named `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Returns the path component of the URL, or an empty string if the URL does not parse.
    pub fn path(&self) -> String {
        url::Url::parse(&self.url)
            .map(|parsed| parsed.path().to_string())
            .unwrap_or_default()
    }

    /// Returns the decoded query string pairs of the URL.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        match url::Url::parse(&self.url) {
            Ok(parsed) => parsed
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Returns the body decoded as UTF-8, lossily. An absent body is an empty string.
    pub fn body_text(&self) -> String {
        self.body
            .as_deref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Creates a new HTTP request builder.
pub fn create_request() -> HttpRequestBuilder {
    HttpRequestBuilder::new()
}

/// A builder for a HTTP request.
#[derive(Debug)]
pub struct HttpRequestBuilder(HttpRequest);

impl HttpRequestBuilder {
    /// Creates a new HTTP request builder.
    pub fn new() -> Self {
        Self(HttpRequest {
            url: String::new(),
            method: HttpMethod::GET,
            headers: Vec::new(),
            body: None,
        })
    }

    /// Sets the URL of the HTTP request.
    pub fn url(mut self, url: &str) -> Self {
        self.0.url = url.to_string();
        self
    }

    /// Sets the HTTP method to GET and the URL of the HTTP request.
    pub fn get(self, url: &str) -> Self {
        self.method(HttpMethod::GET).url(url)
    }

    /// Sets the HTTP method to POST and the URL of the HTTP request.
    pub fn post(self, url: &str) -> Self {
        self.method(HttpMethod::POST).url(url)
    }

    /// Sets the HTTP method to PUT and the URL of the HTTP request.
    pub fn put(self, url: &str) -> Self {
        self.method(HttpMethod::PUT).url(url)
    }

    /// Sets the HTTP method to DELETE and the URL of the HTTP request.
    pub fn delete(self, url: &str) -> Self {
        self.method(HttpMethod::DELETE).url(url)
    }

    /// Sets the HTTP method to HEAD and the URL of the HTTP request.
    pub fn head(self, url: &str) -> Self {
        self.method(HttpMethod::HEAD).url(url)
    }

    /// Sets the HTTP method of the HTTP request.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.0.method = method;
        self
    }

    /// Adds a HTTP header to the HTTP request.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.0.headers.push(HttpHeader::new(name, value));
        self
    }

    /// Sets the HTTP request body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.0.body = Some(body);
        self
    }

    /// Sets the HTTP request body text.
    pub fn body_str(self, body: &str) -> Self {
        self.body(body.as_bytes().to_vec())
    }

    /// Serializes `value` as the JSON body and sets the content type.
    ///
    /// A value that fails to serialize leaves the body unset and logs a warning.
    pub fn body_json<T: Serialize>(self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => self.header("Content-Type", "application/json").body(body),
            Err(error) => {
                warn!("Failed to serialize JSON body: {error}");
                self
            }
        }
    }

    /// Builds the HTTP request.
    pub fn build(self) -> HttpRequest {
        self.0
    }
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builder_sets_method_and_url() {
        let request = create_request().post("https://example.com/a").build();

        assert_eq!(request.method, HttpMethod::POST);
        assert_eq!(request.url, "https://example.com/a");
        assert_eq!(request.to_string(), "POST https://example.com/a");
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = create_request()
            .get("https://example.com")
            .header("X-Trace-Id", "42")
            .build();

        assert_eq!(request.header("x-trace-id"), Some("42"));
        assert_eq!(request.header("accept"), None);
    }

    #[test]
    fn test_path_and_query_pairs() {
        let request = create_request()
            .get("https://example.com/todos/1?page=2&q=a%20b")
            .build();

        assert_eq!(request.path(), "/todos/1");
        assert_eq!(
            request.query_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("q".to_string(), "a b".to_string())
            ]
        );
    }

    #[test]
    fn test_unparsable_url_has_no_path() {
        let request = create_request().get("not a url").build();

        assert_eq!(request.path(), "");
        assert!(request.query_pairs().is_empty());
    }

    #[test]
    fn test_body_json_sets_content_type() {
        let request = create_request()
            .post("https://example.com")
            .body_json(&serde_json::json!({"id": 1}))
            .build();

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.body_text(), r#"{"id":1}"#);
    }

    #[test]
    fn test_body_json_failure_leaves_body_unset() {
        let unserializable = std::collections::BTreeMap::from([((1u8, 2u8), 3u8)]);

        let request = create_request()
            .post("https://example.com")
            .body_json(&unserializable)
            .build();

        assert_eq!(request.body, None);
        assert_eq!(request.header("content-type"), None);
    }
}
