//! # Comic Studio
//!
//! Generate an image from a prompt, refine it with follow-up prompts, expand
//! it into a four-panel comic with a coherent story, and download the result
//! as one stitched PNG.
//!
//! ## Features
//!
//! - **Session state machine**: `Idle → Loading → ImageReady / ComicReady /
//!   Failed`, with only one workflow in flight at a time
//! - **Comic builder**: one structured story request, then four panel edits
//!   chained so each panel is drawn from the one before it
//! - **Strict story gate**: the reply must parse as `{"panels": [...]}` with
//!   exactly four entries; nothing is drawn otherwise
//! - **Compositor**: fixed 2×2 grid with a uniform gap, PNG output
//! - **Error reports** that keep the remote error text verbatim, name the
//!   error category, and append advice chosen for that category
//!
//! ## Quick Start
//!
//! ```no_run
//! use comic_studio::{DirectorySink, Session};
//! use gemini_image::{GeminiClient, GeminiConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GeminiClient::new(GeminiConfig::from_env()?);
//!     let mut session = Session::new(client)
//!         .with_observer(|state| println!("[{}]", state.name()));
//!
//!     session.generate("a girl flying a kite on a hill").await?;
//!     session.edit("make it sunset").await?;
//!     session.create_comic().await?;
//!
//!     let mut sink = DirectorySink::new("out");
//!     let path = session.download(&mut sink).await?;
//!     println!("Saved {}", path.display());
//!     Ok(())
//! }
//! ```

pub mod compositor;
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod session;
pub mod sink;
pub mod story;

pub use compositor::{ComicLayout, CompositeError, Compositor};
pub use error::{ComicError, Result, SessionError};
pub use orchestrator::{build_comic, build_comic_with_progress, ComicProgress, ComicSequence};
pub use report::ErrorReport;
pub use session::{Session, SessionState};
pub use sink::{DirectorySink, DownloadSink, MemorySink};
pub use story::{ComicOptions, Storyboard, PANEL_COUNT};
