use std::error::Error;

use gemini_image::{ErrorKind, GeminiError};

const SERVICE_GUIDANCE: &str = "API call failures, especially 'Rpc failed due to xhr error' or \
'500 Internal Server Error', often point at a problem with your Google Gemini API key or its \
billing account. Make sure the key is valid and linked to a project with billing enabled. See \
ai.google.dev/gemini-api/docs/billing for more information.";

const CONTENT_GUIDANCE: &str = "The model returned no usable result, which usually means the \
request was declined by a safety filter. Rephrase the prompt and try again.";

/// How a failed workflow is turned into the message shown to the user.
///
/// The message always carries the user-facing context and the full error
/// chain (so the remote error text appears verbatim). When a [`GeminiError`]
/// is found in the chain its category is named, and the advice configured for
/// that category is appended.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Advice for transport and configuration failures (default: API key / billing hint)
    pub service_guidance: Option<String>,
    /// Advice for filtered or empty replies (default: rephrase the prompt)
    pub content_guidance: Option<String>,
}

impl Default for ErrorReport {
    fn default() -> Self {
        Self {
            service_guidance: Some(SERVICE_GUIDANCE.to_string()),
            content_guidance: Some(CONTENT_GUIDANCE.to_string()),
        }
    }
}

impl ErrorReport {
    /// Context, error details and category only.
    pub fn plain() -> Self {
        Self {
            service_guidance: None,
            content_guidance: None,
        }
    }

    pub fn with_service_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.service_guidance = Some(guidance.into());
        self
    }

    pub fn with_content_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.content_guidance = Some(guidance.into());
        self
    }

    pub fn format(&self, context: &str, error: &(dyn Error + 'static)) -> String {
        let mut message = format!("{}\nError details: {}", context, chain(error));

        let Some(kind) = gemini_kind(error) else {
            return message;
        };
        message.push_str(&format!("\nCategory: {}", kind));

        let guidance = match kind {
            ErrorKind::Transport | ErrorKind::Configuration => self.service_guidance.as_deref(),
            ErrorKind::ContentFilter => self.content_guidance.as_deref(),
            ErrorKind::InvalidResponse => None,
        };
        if let Some(guidance) = guidance {
            message.push_str("\n\nAction required: ");
            message.push_str(guidance);
        }
        message
    }
}

/// Category of the first [`GeminiError`] in the chain.
fn gemini_kind(error: &(dyn Error + 'static)) -> Option<ErrorKind> {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(gemini) = err.downcast_ref::<GeminiError>() {
            return Some(gemini.kind());
        }
        current = err.source();
    }
    None
}

/// Render `error` and its sources, skipping sources whose text is already
/// part of the message.
fn chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut current = error.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        current = source.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComicError;

    #[test]
    fn plain_report() {
        let err = GeminiError::Api {
            status: 400,
            message: "User location is not supported".into(),
        };
        let msg = ErrorReport::plain().format("Failed to generate the image.", &err);
        assert_eq!(
            msg,
            "Failed to generate the image.\nError details: Gemini returned HTTP 400: User location is not supported\nCategory: service unreachable or rejected the request"
        );
    }

    #[test]
    fn transport_gets_billing_advice() {
        let err = GeminiError::Api {
            status: 500,
            message: "Internal error".into(),
        };
        let msg = ErrorReport::default().format("ctx", &err);
        assert!(msg.contains("\nCategory: service unreachable"));
        assert!(msg.contains("\n\nAction required: "));
        assert!(msg.contains("billing"));
    }

    #[test]
    fn configuration_gets_billing_advice() {
        let err = GeminiError::MissingApiKey("GEMINI_API_KEY");
        let msg = ErrorReport::default().format("ctx", &err);
        assert!(msg.contains("\nCategory: configuration"));
        assert!(msg.contains("API key"));
    }

    #[test]
    fn content_filter_gets_rephrase_advice() {
        let err = GeminiError::NoImageData {
            reason: Some("prompt blocked: SAFETY".into()),
        };
        let msg = ErrorReport::default().format("ctx", &err);
        assert!(msg.starts_with("ctx\nError details: no image data in response (prompt blocked: SAFETY)"));
        assert!(msg.contains("\nCategory: content filtered"));
        assert!(msg.contains("Rephrase the prompt"));
        assert!(!msg.contains("billing"));
    }

    #[test]
    fn invalid_response_has_no_advice() {
        let err = GeminiError::InvalidResponse("expected value at line 1".into());
        let msg = ErrorReport::default().format("ctx", &err);
        assert!(msg.ends_with("\nCategory: unexpected response"));
        assert!(!msg.contains("Action required"));
    }

    #[test]
    fn category_found_through_wrapping_error() {
        let err = ComicError::Panel {
            index: 2,
            source: GeminiError::EmptyText { reason: None },
        };
        let msg = ErrorReport::default().format("ctx", &err);
        assert!(msg.contains("Panel 2 of 4 failed"));
        assert!(msg.contains("\nCategory: content filtered"));
    }

    #[test]
    fn non_service_errors_have_no_category() {
        let err = ComicError::PanelCount { got: 3 };
        let msg = ErrorReport::default().format("ctx", &err);
        assert_eq!(msg, "ctx\nError details: expected 4 panel descriptions, got 3");
    }

    #[test]
    fn custom_guidance() {
        let err = GeminiError::NoImageData { reason: None };
        let msg = ErrorReport::plain()
            .with_content_guidance("Call the help desk.")
            .format("ctx", &err);
        assert!(msg.ends_with("Action required: Call the help desk."));

        let msg = ErrorReport::plain()
            .with_service_guidance("Check the proxy.")
            .format("ctx", &err);
        assert!(!msg.contains("Check the proxy."));
    }

    #[test]
    fn nested_sources_not_repeated() {
        let err = ComicError::Story(GeminiError::Api {
            status: 500,
            message: "Internal error".into(),
        });
        let msg = ErrorReport::plain().format("ctx", &err);
        assert_eq!(msg.matches("Internal error").count(), 1);
        assert!(msg.contains("Story generation failed"));
    }
}
