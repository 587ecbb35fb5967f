//! Product synchronization client for the inventory app.
//!
//! # Overview
//! Maps form state to the backend's `/products` REST calls and keeps an
//! in-memory copy of the product list for the UI to render from.
//!
//! # Design
//! - `ProductClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. Parsing is defensive.
//! - `Transport` executes requests; `ReqwestTransport` is the production
//!   implementation. `ProductApi` glues client and transport together.
//! - `SyncStore` owns the product list and the `loading`/`posting` flags and
//!   refetches the full list after every write.
//! - `Session` holds the add/edit draft and decides between create and
//!   update on save.
//! - Everything runs on one thread; the async traits are `?Send`.

pub mod api;
pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod http;
pub mod image;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use api::ProductApi;
pub use client::ProductClient;
pub use config::ClientConfig;
pub use device::{Camera, Confirm};
pub use error::{ApiError, ApiResult, CaptureError, SessionError, SessionResult, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use image::{CapturedPhoto, ImageRef};
pub use session::{DeleteIntent, DeleteOutcome, Draft, SaveOutcome, Session};
pub use store::SyncStore;
pub use transport::{ReqwestTransport, Transport};
pub use types::{Product, ProductBody, ProductId};
