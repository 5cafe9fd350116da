use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::error::{GeminiError, Result};
use crate::image::GeneratedImage;
use crate::service::ImageService;
use crate::wire::{
    api_error_message, excerpt, GenerateRequest, GenerateResponse, GenerationConfig, ImageConfig,
    Part, ThinkingConfig,
};

/// Async client for the Gemini `generateContent` API.
///
/// # Example
/// ```no_run
/// use gemini_image::{GeminiClient, GeminiConfig, ImageService};
///
/// # async fn example() -> gemini_image::Result<()> {
/// let client = GeminiClient::new(GeminiConfig::from_env()?);
/// let image = client.generate("a red bicycle").await?;
/// let blue = client.edit("make it blue", &image).await?;
/// std::fs::write("bicycle.png", blue.bytes()).unwrap();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn image_generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            image_config: Some(ImageConfig {
                aspect_ratio: self.config.aspect_ratio.clone(),
            }),
            ..Default::default()
        }
    }

    fn structured_generation_config(&self, schema: &Value) -> GenerationConfig {
        GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema.clone()),
            thinking_config: self
                .config
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            ..Default::default()
        }
    }

    /// Build the body for a text-to-image call.
    pub fn generate_request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest::user(vec![Part::text(prompt)], self.image_generation_config())
    }

    /// Build the body for an edit call: source image first, then the instruction.
    pub fn edit_request(&self, prompt: &str, source: &GeneratedImage) -> GenerateRequest {
        GenerateRequest::user(
            vec![Part::image(source), Part::text(prompt)],
            self.image_generation_config(),
        )
    }

    /// Build the body for a schema-constrained text call.
    pub fn structured_request(
        &self,
        prompt: &str,
        context: &GeneratedImage,
        schema: &Value,
    ) -> GenerateRequest {
        GenerateRequest::user(
            vec![Part::image(context), Part::text(prompt)],
            self.structured_generation_config(schema),
        )
    }

    async fn send(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = self.config.generate_url(model);
        debug!(model, "POST generateContent");

        let resp = self
            .http
            .post(&url)
            .timeout(self.config.timeout)
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GeminiError::Network {
                context: format!("Cannot reach Gemini at {}", self.config.endpoint),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let message = api_error_message(&body);
            warn!(model, status, %message, "Gemini request failed");
            return Err(GeminiError::Api { status, message });
        }

        let text = resp.text().await.map_err(|e| GeminiError::Network {
            context: "Failed to read Gemini response".into(),
            source: e,
        })?;

        serde_json::from_str(&text)
            .map_err(|e| GeminiError::InvalidResponse(format!("{}: {}", e, excerpt(&text, 200))))
    }
}

impl ImageService for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = self.generate_request(prompt);
        let response = self.send(&self.config.image_model, &request).await?;
        let image = response.first_inline_image()?;
        debug!(media_type = image.media_type(), len = image.bytes().len(), "image generated");
        Ok(image)
    }

    async fn edit(&self, prompt: &str, source: &GeneratedImage) -> Result<GeneratedImage> {
        let request = self.edit_request(prompt, source);
        let response = self.send(&self.config.image_model, &request).await?;
        let image = response.first_inline_image()?;
        debug!(media_type = image.media_type(), len = image.bytes().len(), "image edited");
        Ok(image)
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        context: &GeneratedImage,
        schema: &Value,
    ) -> Result<String> {
        let request = self.structured_request(prompt, context, schema);
        let response = self.send(&self.config.text_model, &request).await?;
        response.text()
    }
}
