use thiserror::Error;

/// Errors returned by Gemini operations.
#[derive(Error, Debug)]
pub enum GeminiError {
    /// No credential was found in the environment.
    #[error("API key is not set: export {0} before starting")]
    MissingApiKey(&'static str),

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// Gemini answered with a non-success HTTP status. `message` is the
    /// remote error text, verbatim.
    #[error("Gemini returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The call succeeded but no part carried inline image data. This is what
    /// a safety-filtered request looks like.
    #[error("no image data in response{}", suffix(.reason))]
    NoImageData { reason: Option<String> },

    /// A structured-output call returned no text parts.
    #[error("no text in response{}", suffix(.reason))]
    EmptyText { reason: Option<String> },

    /// The response body was not the expected envelope, or inline data was
    /// not valid base64.
    #[error("Invalid response from Gemini: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default()
}

/// Coarse category of a [`GeminiError`], used when deciding how to present it.
///
/// `Display` gives the short label shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote call could not complete (network, auth, quota).
    Transport,
    /// The call completed but nothing usable came back, usually a safety block.
    ContentFilter,
    /// The reply could not be understood.
    InvalidResponse,
    /// Local configuration is missing or wrong.
    Configuration,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::Transport => "service unreachable or rejected the request",
            ErrorKind::ContentFilter => "content filtered",
            ErrorKind::InvalidResponse => "unexpected response",
            ErrorKind::Configuration => "configuration",
        };
        f.write_str(label)
    }
}

impl GeminiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeminiError::MissingApiKey(_) => ErrorKind::Configuration,
            GeminiError::Network { .. } | GeminiError::Api { .. } => ErrorKind::Transport,
            GeminiError::NoImageData { .. } | GeminiError::EmptyText { .. } => {
                ErrorKind::ContentFilter
            }
            GeminiError::InvalidResponse(_) | GeminiError::Json(_) => ErrorKind::InvalidResponse,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GeminiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_image_data_message() {
        let plain = GeminiError::NoImageData { reason: None };
        assert_eq!(plain.to_string(), "no image data in response");

        let blocked = GeminiError::NoImageData {
            reason: Some("SAFETY".into()),
        };
        assert_eq!(blocked.to_string(), "no image data in response (SAFETY)");
    }

    #[test]
    fn api_error_keeps_remote_text() {
        let err = GeminiError::Api {
            status: 403,
            message: "API key not valid. Please pass a valid API key.".into(),
        };
        assert!(err
            .to_string()
            .ends_with("API key not valid. Please pass a valid API key."));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn kinds() {
        assert_eq!(
            GeminiError::MissingApiKey("GEMINI_API_KEY").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            GeminiError::EmptyText { reason: None }.kind(),
            ErrorKind::ContentFilter
        );
        assert_eq!(
            GeminiError::InvalidResponse("x".into()).kind(),
            ErrorKind::InvalidResponse
        );
    }

    #[test]
    fn kind_labels() {
        assert_eq!(ErrorKind::ContentFilter.to_string(), "content filtered");
        assert_eq!(ErrorKind::Configuration.to_string(), "configuration");
    }
}
