//! Product photos: captured payloads and inline `data:` URIs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// MIME type the camera produces by default.
pub const JPEG_MIME: &str = "image/jpeg";

/// A photo handed over by the camera, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub mime: String,
    pub base64: String,
}

impl CapturedPhoto {
    /// A JPEG payload the platform camera already base64-encoded.
    pub fn jpeg(base64: impl Into<String>) -> Self {
        Self {
            mime: JPEG_MIME.to_string(),
            base64: base64.into(),
        }
    }

    pub fn from_bytes(mime: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime: mime.into(),
            base64: STANDARD.encode(bytes),
        }
    }

    /// `data:<mime>;base64,<payload>`, the form stored in `Product::image`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

/// What a product's `image` string points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRef<'a> {
    /// Inline base64 image carried in the record itself.
    Inline { mime: &'a str, payload: &'a str },
    /// Anything else: a URL or a storage reference.
    Remote(&'a str),
}

impl<'a> ImageRef<'a> {
    pub fn parse(image: &'a str) -> Self {
        let inline = image
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .and_then(|(header, payload)| {
                header
                    .strip_suffix(";base64")
                    .map(|mime| ImageRef::Inline { mime, payload })
            });
        inline.unwrap_or(ImageRef::Remote(image))
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageRef::Inline { .. })
    }

    /// Raw bytes of an inline image. `None` for remote references and for
    /// payloads that are not valid base64.
    pub fn decode(&self) -> Option<Vec<u8>> {
        match self {
            ImageRef::Inline { payload, .. } => STANDARD.decode(payload).ok(),
            ImageRef::Remote(_) => None,
        }
    }
}
