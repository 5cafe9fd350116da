use std::time::Duration;

use crate::error::{GeminiError, Result};

/// Environment variable checked first for the API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Fallback variable for the API key.
pub const API_KEY_FALLBACK_VAR: &str = "API_KEY";
/// Optional endpoint override.
pub const ENDPOINT_VAR: &str = "GEMINI_ENDPOINT";

/// Configuration for the Gemini client.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API root (e.g., "https://generativelanguage.googleapis.com")
    pub endpoint: String,
    /// API key sent as `x-goog-api-key`
    pub api_key: String,
    /// Model used for generate and edit calls
    pub image_model: String,
    /// Model used for structured text output
    pub text_model: String,
    /// Aspect ratio requested for every image (default: "1:1")
    pub aspect_ratio: String,
    /// Thinking budget for structured text calls (default: 10000, None disables)
    pub thinking_budget: Option<u32>,
    /// Request timeout (default: 120s)
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            image_model: "gemini-2.5-flash-image".to_string(),
            text_model: "gemini-3-flash-preview".to_string(),
            aspect_ratio: "1:1".to_string(),
            thinking_budget: Some(10_000),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiConfig {
    /// Create a config with the given API key and default models.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Load the API key (and optional endpoint) from the process environment.
    ///
    /// A missing or blank key is an error; callers treat it as fatal.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key = [API_KEY_VAR, API_KEY_FALLBACK_VAR]
            .iter()
            .filter_map(|name| lookup(name))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
            .ok_or(GeminiError::MissingApiKey(API_KEY_VAR))?;

        let mut config = Self::with_api_key(key);
        if let Some(endpoint) = lookup(ENDPOINT_VAR).filter(|e| !e.trim().is_empty()) {
            config = config.endpoint(endpoint.trim());
        }
        Ok(config)
    }

    /// Set the API root.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the image model.
    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// Set the text model.
    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Set the requested aspect ratio.
    pub fn aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = ratio.into();
        self
    }

    /// Set the thinking budget for structured calls.
    pub fn thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.thinking_budget = budget;
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// URL of the `generateContent` method for `model`.
    pub fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            model
        )
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("image_model", &self.image_model)
            .field("text_model", &self.text_model)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("thinking_budget", &self.thinking_budget)
            .field("timeout", &self.timeout)
            .finish()
    }
}
