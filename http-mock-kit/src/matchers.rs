//! Request predicates used to decide whether a rule applies to a request.
//!
//! Every matcher is a pure predicate over an [`HttpRequest`] that can also describe itself;
//! the description shows up in logs and in [`InvalidState`](crate::InvalidState) messages.
//!
//! ```rust
//! use http_mock_kit::matchers::{header, method, path};
//! use http_mock_kit::{HttpMethod, Rule, create_response};
//!
//! let rule = Rule::given(method(HttpMethod::GET))
//!     .and(path("/todos/1"))
//!     .and(header("Accept", "application/json"))
//!     .respond_with(create_response().body_str("{}").build());
//! assert_eq!(rule.describe(), "method GET and path /todos/1 and header Accept: application/json");
//! ```

use crate::request::{HttpMethod, HttpRequest};
use regex::Regex;
use std::fmt;

/// A predicate over a request that can render itself as a description.
pub trait Match: Send + Sync {
    /// Whether the request satisfies this matcher.
    fn matches(&self, request: &HttpRequest) -> bool;

    /// A short, human readable description of what this matcher accepts.
    fn describe(&self) -> String;
}

impl<F> Match for F
where
    F: Fn(&HttpRequest) -> bool + Send + Sync,
{
    fn matches(&self, request: &HttpRequest) -> bool {
        self(request)
    }

    fn describe(&self) -> String {
        "custom matcher".to_string()
    }
}

/// Conjunction of matchers. Matches when every inner matcher does; an empty set matches anything.
pub struct AllOf(Vec<Box<dyn Match>>);

impl AllOf {
    pub(crate) fn new(first: Box<dyn Match>) -> Self {
        Self(vec![first])
    }

    pub(crate) fn push(&mut self, matcher: Box<dyn Match>) {
        self.0.push(matcher);
    }
}

impl fmt::Debug for AllOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AllOf").field(&self.describe()).finish()
    }
}

impl Match for AllOf {
    fn matches(&self, request: &HttpRequest) -> bool {
        self.0.iter().all(|matcher| matcher.matches(request))
    }

    fn describe(&self) -> String {
        if self.0.is_empty() {
            return "any request".to_string();
        }
        self.0
            .iter()
            .map(|matcher| matcher.describe())
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

/// Matches every request.
pub fn any() -> AnyMatcher {
    AnyMatcher
}

/// See [`any`].
#[derive(Debug, Clone, Copy)]
pub struct AnyMatcher;

impl Match for AnyMatcher {
    fn matches(&self, _request: &HttpRequest) -> bool {
        true
    }

    fn describe(&self) -> String {
        "any request".to_string()
    }
}

/// Matches requests with the given HTTP method.
pub fn method(method: HttpMethod) -> MethodMatcher {
    MethodMatcher(method)
}

/// See [`method`].
#[derive(Debug, Clone, Copy)]
pub struct MethodMatcher(HttpMethod);

impl Match for MethodMatcher {
    fn matches(&self, request: &HttpRequest) -> bool {
        request.method == self.0
    }

    fn describe(&self) -> String {
        format!("method {}", self.0)
    }
}

/// Matches the absolute request URL against `pattern`.
///
/// `*` in the pattern matches any run of characters. When the pattern has no query string,
/// the query string of the request is ignored.
pub fn url(pattern: &str) -> UrlMatcher {
    let expression = format!("^{}$", regex::escape(pattern).replace(r"\*", ".*"));
    UrlMatcher {
        pattern: pattern.to_string(),
        wildcard: Regex::new(&expression).ok(),
    }
}

/// See [`url`].
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    wildcard: Option<Regex>,
}

impl Match for UrlMatcher {
    fn matches(&self, request: &HttpRequest) -> bool {
        let target = if self.pattern.contains('?') {
            request.url.as_str()
        } else {
            request
                .url
                .split_once('?')
                .map_or(request.url.as_str(), |(base, _)| base)
        };
        match &self.wildcard {
            Some(regex) => regex.is_match(target),
            None => target == self.pattern,
        }
    }

    fn describe(&self) -> String {
        format!("url {}", self.pattern)
    }
}

/// Matches requests whose URL path equals `path` exactly.
pub fn path(path: &str) -> PathMatcher {
    PathMatcher(path.to_string())
}

/// See [`path`].
#[derive(Debug, Clone)]
pub struct PathMatcher(String);

impl Match for PathMatcher {
    fn matches(&self, request: &HttpRequest) -> bool {
        request.path() == self.0
    }

    fn describe(&self) -> String {
        format!("path {}", self.0)
    }
}

/// Matches requests carrying the decoded query pair `key=value`.
pub fn query_param(key: &str, value: &str) -> QueryParamMatcher {
    QueryParamMatcher {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// See [`query_param`].
#[derive(Debug, Clone)]
pub struct QueryParamMatcher {
    key: String,
    value: String,
}

impl Match for QueryParamMatcher {
    fn matches(&self, request: &HttpRequest) -> bool {
        request
            .query_pairs()
            .iter()
            .any(|(key, value)| *key == self.key && *value == self.value)
    }

    fn describe(&self) -> String {
        format!("query {}={}", self.key, self.value)
    }
}

/// Matches requests carrying header `name` (case-insensitive) with exactly `value`.
pub fn header(name: &str, value: &str) -> HeaderMatcher {
    HeaderMatcher {
        name: name.to_string(),
        value: Some(value.to_string()),
    }
}

/// Matches requests carrying header `name`, whatever its value.
pub fn header_exists(name: &str) -> HeaderMatcher {
    HeaderMatcher {
        name: name.to_string(),
        value: None,
    }
}

/// See [`header`] and [`header_exists`].
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    name: String,
    value: Option<String>,
}

impl Match for HeaderMatcher {
    fn matches(&self, request: &HttpRequest) -> bool {
        request
            .headers
            .iter()
            .filter(|header| header.name.eq_ignore_ascii_case(&self.name))
            .any(|header| self.value.as_ref().is_none_or(|v| *v == header.value))
    }

    fn describe(&self) -> String {
        match &self.value {
            Some(value) => format!("header {}: {}", self.name, value),
            None => format!("header {} present", self.name),
        }
    }
}

/// Matches requests whose body, decoded as UTF-8, equals `body`.
pub fn body_string(body: &str) -> BodyMatcher {
    BodyMatcher {
        text: body.to_string(),
        contains: false,
    }
}

/// Matches requests whose body, decoded as UTF-8, contains `fragment`.
pub fn body_contains(fragment: &str) -> BodyMatcher {
    BodyMatcher {
        text: fragment.to_string(),
        contains: true,
    }
}

/// See [`body_string`] and [`body_contains`].
#[derive(Debug, Clone)]
pub struct BodyMatcher {
    text: String,
    contains: bool,
}

impl Match for BodyMatcher {
    fn matches(&self, request: &HttpRequest) -> bool {
        let body = request.body_text();
        if self.contains {
            body.contains(&self.text)
        } else {
            body == self.text
        }
    }

    fn describe(&self) -> String {
        if self.contains {
            format!("body containing {:?}", self.text)
        } else {
            format!("body {:?}", self.text)
        }
    }
}

/// Matches requests whose body parses as JSON structurally equal to `value`.
pub fn body_json(value: serde_json::Value) -> BodyJsonMatcher {
    BodyJsonMatcher(value)
}

/// See [`body_json`].
#[derive(Debug, Clone)]
pub struct BodyJsonMatcher(serde_json::Value);

impl Match for BodyJsonMatcher {
    fn matches(&self, request: &HttpRequest) -> bool {
        request
            .body
            .as_deref()
            .and_then(|body| serde_json::from_slice::<serde_json::Value>(body).ok())
            .is_some_and(|parsed| parsed == self.0)
    }

    fn describe(&self) -> String {
        format!("json body {}", self.0)
    }
}

/// Wraps an arbitrary predicate with a description.
pub fn custom<F>(description: &str, predicate: F) -> CustomMatcher<F>
where
    F: Fn(&HttpRequest) -> bool + Send + Sync,
{
    CustomMatcher {
        description: description.to_string(),
        predicate,
    }
}

/// See [`custom`].
pub struct CustomMatcher<F> {
    description: String,
    predicate: F,
}

impl<F> fmt::Debug for CustomMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F> Match for CustomMatcher<F>
where
    F: Fn(&HttpRequest) -> bool + Send + Sync,
{
    fn matches(&self, request: &HttpRequest) -> bool {
        (self.predicate)(request)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::create_request;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/todos", "https://example.com/todos", true)]
    #[case("https://example.com/todos", "https://example.com/todos?page=2", true)]
    #[case("https://example.com/todos?page=1", "https://example.com/todos?page=2", false)]
    #[case("https://example.com/todos/*", "https://example.com/todos/17", true)]
    #[case("https://*.example.com/a", "https://api.example.com/a", true)]
    #[case("https://example.com/todos/*", "https://example.com/users/17", false)]
    #[case("https://example.com/a.b", "https://example.com/aXb", false)]
    fn test_url_matcher(#[case] pattern: &str, #[case] request_url: &str, #[case] expected: bool) {
        let request = create_request().get(request_url).build();

        assert_eq!(url(pattern).matches(&request), expected);
    }

    #[rstest]
    #[case(HttpMethod::GET, true)]
    #[case(HttpMethod::POST, false)]
    fn test_method_matcher(#[case] expected_method: HttpMethod, #[case] expected: bool) {
        let request = create_request().get("https://example.com").build();

        assert_eq!(method(expected_method).matches(&request), expected);
    }

    #[test]
    fn test_header_matchers() {
        let request = create_request()
            .get("https://example.com")
            .header("Accept", "text/plain")
            .header("accept", "application/json")
            .build();

        assert!(header("ACCEPT", "application/json").matches(&request));
        assert!(!header("Accept", "text/html").matches(&request));
        assert!(header_exists("accept").matches(&request));
        assert!(!header_exists("Authorization").matches(&request));
    }

    #[test]
    fn test_query_and_path_matchers() {
        let request = create_request()
            .get("https://example.com/search?q=rust&page=2")
            .build();

        assert!(path("/search").matches(&request));
        assert!(query_param("q", "rust").matches(&request));
        assert!(!query_param("page", "3").matches(&request));
    }

    #[test]
    fn test_body_matchers() {
        let request = create_request()
            .post("https://example.com")
            .body_str(r#"{ "id": 1, "tags": ["a"] }"#)
            .build();

        assert!(body_contains(r#""id": 1"#).matches(&request));
        assert!(!body_string("{}").matches(&request));
        assert!(body_json(serde_json::json!({"tags": ["a"], "id": 1})).matches(&request));
        assert!(!body_json(serde_json::json!({"id": 2})).matches(&request));
    }

    #[test]
    fn test_all_of_describes_every_part() {
        let mut all = AllOf::new(Box::new(method(HttpMethod::DELETE)));
        all.push(Box::new(custom("admin only", |r: &HttpRequest| {
            r.header("x-role") == Some("admin")
        })));
        let request = create_request()
            .delete("https://example.com/users/1")
            .header("X-Role", "admin")
            .build();

        assert!(all.matches(&request));
        assert_eq!(all.describe(), "method DELETE and admin only");
    }

    #[test]
    fn test_closure_is_a_matcher() {
        let matcher = |r: &HttpRequest| r.url.ends_with("/ping");
        let request = create_request().get("https://example.com/ping").build();

        assert!(matcher.matches(&request));
        assert_eq!(matcher.describe(), "custom matcher");
    }
}
