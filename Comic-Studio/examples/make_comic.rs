//! Build a comic from a prompt without a session, printing progress.
//!
//! ```sh
//! GEMINI_API_KEY=... cargo run --example make_comic -- "a girl flying a kite on a hill"
//! ```

use comic_studio::{build_comic_with_progress, ComicOptions, ComicProgress, Compositor};
use gemini_image::{GeminiClient, GeminiConfig, ImageService};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "a girl flying a kite on a hill".to_string());

    let client = GeminiClient::new(GeminiConfig::from_env()?);
    let base = client.generate(&prompt).await?;

    let comic = build_comic_with_progress(&client, &base, &ComicOptions::default(), |p| match p {
        ComicProgress::Story => println!("Writing the story..."),
        ComicProgress::Panel { index, total } => println!("Drawing panel {}/{}", index, total),
    })
    .await?;

    let panels = comic.into_vec();
    let png = tokio::task::spawn_blocking(move || Compositor::default().composite(&panels)).await??;
    std::fs::write("comic.png", png)?;
    println!("Saved: comic.png");

    Ok(())
}
