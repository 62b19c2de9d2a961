//! Displayable image handles.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;

/// An image payload ready for display, tagged with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub mime: String,
    pub bytes: Bytes,
}

impl ImageHandle {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Encodes the image as a `data:` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
