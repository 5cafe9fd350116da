use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{GeminiError, Result};

/// An image returned by the model (or loaded locally to be edited).
///
/// Immutable once built: an edit always produces a new value. The encoded
/// form and the data URL are derived from the stored bytes, so the three
/// views can never drift apart.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    media_type: String,
    bytes: Vec<u8>,
}

impl GeneratedImage {
    /// Build from raw bytes. Fails on an empty payload.
    pub fn from_bytes(media_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(GeminiError::NoImageData { reason: None });
        }
        Ok(Self {
            media_type: media_type.into(),
            bytes,
        })
    }

    /// Build from the base64 payload of an inline-data part.
    pub fn from_base64(media_type: impl Into<String>, data: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| GeminiError::InvalidResponse(format!("inline data is not base64: {}", e)))?;
        Self::from_bytes(media_type, bytes)
    }

    /// MIME type, e.g. `image/png`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Decoded image payload.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Base64 (standard alphabet, padded) form of the payload.
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// A `data:` URL suitable for direct display.
    pub fn url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64())
    }

    /// File suffix matching the media type (`png` when unknown).
    pub fn file_extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
