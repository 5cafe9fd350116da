//! Generate an image, apply one edit, and save both.
//!
//! ```sh
//! GEMINI_API_KEY=... cargo run --example generate_image -- "a red bicycle" "make it blue"
//! ```

use gemini_image::{GeminiClient, GeminiConfig, ImageService};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let prompt = args.next().unwrap_or_else(|| "a red bicycle".to_string());
    let edit = args.next();

    let client = GeminiClient::new(GeminiConfig::from_env()?);

    let image = client.generate(&prompt).await?;
    let name = format!("generated.{}", image.file_extension());
    std::fs::write(&name, image.bytes())?;
    println!("Saved: {}", name);

    if let Some(edit) = edit {
        let edited = client.edit(&edit, &image).await?;
        let name = format!("edited.{}", edited.file_extension());
        std::fs::write(&name, edited.bytes())?;
        println!("Saved: {}", name);
    }

    Ok(())
}
