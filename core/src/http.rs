//! HTTP requests and responses as plain data.
//!
//! # Design
//! `ProductClient` builds `HttpRequest` values and parses `HttpResponse`
//! values; a `Transport` implementation sits in between and performs the
//! actual round-trip. Keeping the wire shapes as owned data lets the request
//! builder and response parser be tested without a network.

use serde_json::Value;

/// Header that tells the tunnelling service in front of the backend to skip
/// its browser interstitial page. Sent on every request.
pub const TUNNEL_BYPASS_HEADER: (&str, &str) = ("ngrok-skip-browser-warning", "true");

/// Content type sent on every request that carries a body.
pub const JSON_CONTENT_TYPE: (&str, &str) = ("content-type", "application/json");

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: the client joins its base URL with the resource path
/// when building the request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Look up a header value, ignoring the case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Best-effort JSON view of the body. An empty or malformed body yields
    /// `None` instead of an error.
    pub fn json(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }
}
