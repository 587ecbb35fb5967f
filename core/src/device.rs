//! Contracts for the two device facilities the session depends on.
//!
//! The platform UI implements these; the core only ever sees a captured
//! photo (or a cancellation) and a yes/no answer.

use async_trait::async_trait;

use crate::error::CaptureError;
use crate::image::CapturedPhoto;

#[async_trait(?Send)]
pub trait Camera {
    /// Take a photo. `Ok(None)` means the user cancelled.
    async fn capture_photo(&self) -> Result<Option<CapturedPhoto>, CaptureError>;
}

#[async_trait(?Send)]
pub trait Confirm {
    /// Ask the user a yes/no question.
    async fn confirm(&self, message: &str) -> bool;
}
