//! # gemini-image
//!
//! Async Gemini client for text-to-image generation, reference-conditioned
//! image edits, and schema-constrained text output.
//!
//! ## Features
//!
//! - **Generate** a square image from a prompt
//! - **Edit** an existing image with a new instruction (the image is sent
//!   inline as the visual reference)
//! - **Structured output** from the text model with a declared response schema
//! - **Response normalization**: every reply is scanned for the first inline
//!   image part; text and other parts are ignored
//! - **[`ImageService`] trait** so callers can swap in a fake for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemini_image::{GeminiClient, GeminiConfig, ImageService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY (or API_KEY)
//!     let client = GeminiClient::new(GeminiConfig::from_env()?);
//!
//!     let image = client.generate("a red bicycle").await?;
//!     let edited = client.edit("make it blue", &image).await?;
//!
//!     std::fs::write("bicycle.png", edited.bytes())?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod image;
pub mod schema;
pub mod service;
pub mod wire;

// Re-export main types at crate root
pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use error::{ErrorKind, GeminiError, Result};
pub use image::GeneratedImage;
pub use service::ImageService;
