//! Request and response shapes for the `generateContent` REST method, plus
//! normalization of a response into a single image or a text payload.
//!
//! Only the fields this crate reads or writes are modelled; everything else in
//! a response is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GeminiError, Result};
use crate::image::GeneratedImage;

// ── Request ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One element of a request or response. A part carries either text or
/// inline binary data; unknown kinds deserialize to an empty part.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set on reasoning summaries; never part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn image(image: &GeneratedImage) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: image.media_type().to_string(),
                data: image.base64(),
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: u32,
}

impl GenerateRequest {
    /// Single-turn user request built from `parts`.
    pub fn user(parts: Vec<Part>, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(generation_config),
        }
    }
}

// ── Response ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// `{"error": {"code": .., "message": .., "status": ..}}`
#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GenerateResponse {
    /// Parts of the first candidate, or an empty slice.
    pub fn parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Why nothing usable came back, when the service says.
    pub fn refusal_reason(&self) -> Option<String> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Some(format!("prompt blocked: {}", reason));
        }
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .filter(|r| r != "STOP")
            .map(|r| format!("finish reason: {}", r))
    }

    /// Select the first part carrying inline image data, ignoring text and
    /// anything else.
    pub fn first_inline_image(&self) -> Result<GeneratedImage> {
        let found = self.parts().iter().find_map(|part| {
            part.inline_data
                .as_ref()
                .filter(|d| !d.data.trim().is_empty())
        });

        match found {
            Some(data) => {
                let media_type = if data.mime_type.is_empty() {
                    "image/png"
                } else {
                    data.mime_type.as_str()
                };
                GeneratedImage::from_base64(media_type, &data.data)
            }
            None => Err(GeminiError::NoImageData {
                reason: self.refusal_reason(),
            }),
        }
    }

    /// Concatenate all non-thought text parts.
    pub fn text(&self) -> Result<String> {
        let text: String = self
            .parts()
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect();
        let text = text.trim();

        if text.is_empty() {
            return Err(GeminiError::EmptyText {
                reason: self.refusal_reason(),
            });
        }
        Ok(text.to_string())
    }
}

/// Pull the remote error message out of a non-success body. Falls back to the
/// raw body when it is not the standard envelope.
pub fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) if !env.error.message.is_empty() => match env.error.status {
            Some(status) => format!("{} ({})", env.error.message, status),
            None => env.error.message,
        },
        _ => body.trim().to_string(),
    }
}

/// At most `max` bytes of `text`, cut on a char boundary.
pub fn excerpt(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let end = (0..=max).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0);
    &text[..end]
}
