//! The network seam: executes `HttpRequest`s and hands back `HttpResponse`s.
//!
//! # Design
//! `Transport` is deliberately dumb. It moves bytes and reports status; it
//! does not decide what counts as success, does not retry, and does not
//! follow anything beyond the HTTP library's defaults. A non-2xx answer is a
//! normal `Ok(HttpResponse)` here and becomes an error only in
//! `ProductClient::parse_*`.
//!
//! The trait is declared `?Send`: the client runs on a single-threaded
//! cooperative runtime, and test transports are free to use `RefCell`.

use std::rc::Rc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait(?Send)]
pub trait Transport {
    /// Perform one HTTP round-trip. Fails only when no response was received.
    async fn execute(&self, request: HttpRequest) -> ApiResult<HttpResponse>;
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let method = request.method;
        debug!(method = method.as_str(), url = %request.url, "sending request");

        let mut builder = match method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(method = method.as_str(), url = %request.url, error = %e, "request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status().as_u16();
        // A body cut off mid-read is a transport failure, not an empty body.
        let body = response.text().await.map_err(|e| {
            warn!(method = method.as_str(), url = %request.url, status, error = %e, "reading response body failed");
            ApiError::Network(e.to_string())
        })?;
        debug!(method = method.as_str(), url = %request.url, status, "received response");

        Ok(HttpResponse { status, body })
    }
}

#[async_trait(?Send)]
impl<T: Transport + ?Sized> Transport for Rc<T> {
    async fn execute(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        (**self).execute(request).await
    }
}
