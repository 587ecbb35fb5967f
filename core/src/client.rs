//! Stateless request builder and response parser for the products API.
//!
//! # Design
//! `ProductClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`; `ProductApi` glues the two together
//! through a `Transport`.
//!
//! Parsing is defensive. Any 2xx counts as success. A malformed success body
//! never fails the call: create and update fall back to `None`, and list
//! falls back to an empty collection, so the UI always has something to
//! render.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, JSON_CONTENT_TYPE, TUNNEL_BYPASS_HEADER};
use crate::types::{Product, ProductBody, ProductId};

/// Synchronous, stateless client for the products API.
#[derive(Debug, Clone)]
pub struct ProductClient {
    base_url: String,
}

impl ProductClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_products(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.collection_url(),
            headers: headers(false),
            body: None,
        }
    }

    pub fn build_create_product(&self, input: &ProductBody) -> ApiResult<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.collection_url(),
            headers: headers(true),
            body: Some(encode(input)?),
        })
    }

    pub fn build_update_product(&self, id: &ProductId, input: &ProductBody) -> ApiResult<HttpRequest> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.item_url(id),
            headers: headers(true),
            body: Some(encode(input)?),
        })
    }

    pub fn build_delete_product(&self, id: &ProductId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.item_url(id),
            headers: headers(false),
            body: None,
        }
    }

    /// Anything but a JSON array degrades to an empty list. Elements that
    /// are not objects are skipped.
    pub fn parse_list_products(&self, response: HttpResponse) -> ApiResult<Vec<Product>> {
        check_status(&response)?;
        let items = match response.json() {
            Some(Value::Array(items)) => items,
            other => {
                warn!(
                    kind = value_kind(other.as_ref()),
                    "product list response is not an array, treating as empty"
                );
                return Ok(Vec::new());
            }
        };

        let total = items.len();
        let products: Vec<Product> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Product>(item) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "skipping malformed product in list response");
                    None
                }
            })
            .collect();
        debug!(total, parsed = products.len(), "parsed product list");
        Ok(products)
    }

    pub fn parse_create_product(&self, response: HttpResponse) -> ApiResult<Option<Product>> {
        check_status(&response)?;
        Ok(parse_product(&response))
    }

    pub fn parse_update_product(&self, response: HttpResponse) -> ApiResult<Option<Product>> {
        check_status(&response)?;
        Ok(parse_product(&response))
    }

    pub fn parse_delete_product(&self, response: HttpResponse) -> ApiResult<bool> {
        check_status(&response)?;
        Ok(true)
    }

    fn collection_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    fn item_url(&self, id: &ProductId) -> String {
        format!("{}/products/{}", self.base_url, urlencoding::encode(id.as_str()))
    }
}

fn headers(with_body: bool) -> Vec<(String, String)> {
    let mut headers = Vec::with_capacity(2);
    if with_body {
        headers.push((JSON_CONTENT_TYPE.0.to_string(), JSON_CONTENT_TYPE.1.to_string()));
    }
    headers.push((TUNNEL_BYPASS_HEADER.0.to_string(), TUNNEL_BYPASS_HEADER.1.to_string()));
    headers
}

fn encode(input: &ProductBody) -> ApiResult<String> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Map non-2xx responses to `ApiError::Http` carrying the raw body text.
fn check_status(response: &HttpResponse) -> ApiResult<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn parse_product(response: &HttpResponse) -> Option<Product> {
    match response.json() {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => {
            debug!(status = response.status, "response body is not a product, ignoring");
            None
        }
    }
}

fn value_kind(value: Option<&Value>) -> &'static str {
    match value {
        None => "unparsable",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "bool",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}
