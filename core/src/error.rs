//! Error types for the inventory client.
//!
//! # Design
//! Each layer gets its own enum: `ApiError` for anything that went wrong on
//! the way to or from the backend, `ValidationError` for drafts rejected
//! before any I/O, `CaptureError` for the camera. `SessionError` is what the
//! UI-facing session returns and wraps all three. Malformed success bodies
//! are not errors at all; the client degrades them to `None` or an empty
//! list.

use thiserror::Error;

/// Errors from a call against the products backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("Server: {status} {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (DNS, connection, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// A draft rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    EmptyName,

    /// Carries the offending price text.
    #[error("Price must be a number")]
    InvalidPrice(String),
}

/// Errors raised by the camera collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("We need camera access to take photos.")]
    PermissionDenied,

    #[error("Camera error: {0}")]
    Device(String),
}

/// Everything a session action can surface to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Permission(#[from] CaptureError),
}

pub type SessionResult<T> = Result<T, SessionError>;
