//! Product DTOs for the inventory API.
//!
//! # Design
//! The backend's product shape is loose: the identifier may arrive as `_id`
//! or `id`, as a string or a number, and every other field is optional.
//! `Product` is the normalized form. All the leniency lives in one place,
//! the private `WireProduct` that `Product` deserializes through, so nothing
//! downstream has to care which spelling the server used.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::image::ImageRef;

/// Opaque, server-assigned product identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A product as returned by the backend, after normalization.
///
/// `id` is `None` only when the server sent neither `_id` nor `id`; the
/// client never invents one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireProduct")]
pub struct Product {
    pub id: Option<ProductId>,
    pub name: String,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl Product {
    /// Name to show in a list row.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed"
        } else {
            &self.name
        }
    }

    /// Price label for a list row, `None` when the product has no price.
    pub fn display_price(&self) -> Option<String> {
        self.price.map(|price| format!("€{price}"))
    }

    pub fn image_ref(&self) -> Option<ImageRef<'_>> {
        self.image.as_deref().map(ImageRef::parse)
    }
}

/// Raw product JSON as the server may send it.
#[derive(Deserialize)]
struct WireProduct {
    #[serde(rename = "_id", default)]
    underscore_id: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    image: Option<Value>,
}

impl From<WireProduct> for Product {
    fn from(wire: WireProduct) -> Self {
        // `_id` wins when both are present.
        let id = wire
            .underscore_id
            .as_ref()
            .and_then(id_from_value)
            .or_else(|| wire.id.as_ref().and_then(id_from_value));

        Product {
            id,
            name: wire
                .name
                .as_ref()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            price: wire.price.as_ref().and_then(price_from_value),
            description: wire
                .description
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string),
            image: wire
                .image
                .as_ref()
                .and_then(Value::as_str)
                .filter(|image| !image.is_empty())
                .map(str::to_string),
        }
    }
}

fn id_from_value(value: &Value) -> Option<ProductId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(ProductId(s.clone())),
        Value::Number(n) => Some(ProductId(n.to_string())),
        _ => None,
    }
}

fn price_from_value(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    price.is_finite().then_some(price)
}

/// Request payload for create (POST) and update (PUT).
///
/// PUT replaces the whole record, so create and update share one shape.
/// `price` is omitted when the draft had no price text; `image` is always
/// sent, as `null` when there is no photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBody {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}
