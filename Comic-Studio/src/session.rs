use std::error::Error;
use std::path::PathBuf;

use gemini_image::{GeneratedImage, ImageService};
use tracing::{debug, info, warn};

use crate::compositor::Compositor;
use crate::error::{Result, SessionError};
use crate::orchestrator::{build_comic_with_progress, ComicProgress, ComicSequence};
use crate::report::ErrorReport;
use crate::sink::DownloadSink;
use crate::story::ComicOptions;

pub const GENERATE_MESSAGE: &str = "Summoning pixels from the digital ether...";
pub const EDIT_MESSAGE: &str = "Applying artistic alterations...";
pub const COMIC_MESSAGE: &str = "Generating a universe, one panel at a time...";
pub const DOWNLOAD_MESSAGE: &str = "Stitching panels...";

pub const GENERATE_FAILED: &str = "Failed to generate the image. Try a different prompt.";
pub const EDIT_FAILED: &str = "Failed to edit the image. The AI might be a little stubborn.";
pub const COMIC_FAILED: &str = "Failed to create the comic. The story took an unexpected turn.";

pub const IMAGE_FILENAME_STEM: &str = "ai-generated-image";
pub const COMIC_FILENAME: &str = "ai-comic.png";

/// What the session is showing. Exactly one of these at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing generated yet.
    Idle,
    /// A workflow is in flight; all other actions are refused.
    Loading { message: String },
    /// One image, ready to be edited, downloaded, or turned into a comic.
    ImageReady(GeneratedImage),
    /// A finished comic.
    ComicReady(ComicSequence),
    /// The last workflow failed. Only `start_over` leaves this state.
    Failed { message: String },
}

impl SessionState {
    /// Short description used in logs and transition errors.
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loading { .. } => "loading",
            SessionState::ImageReady(_) => "showing an image",
            SessionState::ComicReady(_) => "showing a comic",
            SessionState::Failed { .. } => "failed",
        }
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        match self {
            SessionState::ImageReady(image) => Some(image),
            _ => None,
        }
    }

    pub fn comic(&self) -> Option<&ComicSequence> {
        match self {
            SessionState::ComicReady(comic) => Some(comic),
            _ => None,
        }
    }

    /// Loading or failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            SessionState::Loading { message } | SessionState::Failed { message } => Some(message),
            _ => None,
        }
    }

    fn loading(message: impl Into<String>) -> Self {
        SessionState::Loading {
            message: message.into(),
        }
    }
}

type Observer = Box<dyn FnMut(&SessionState) + Send>;

/// Drives one user's generate → edit → comic → download flow.
///
/// Every operation checks the current state first and refuses with
/// [`SessionError::InvalidTransition`] (leaving state untouched) when the
/// action is not available. While a workflow runs the state is `Loading`;
/// the displayed state is only replaced once the workflow succeeds.
pub struct Session<S> {
    service: S,
    state: SessionState,
    options: ComicOptions,
    compositor: Compositor,
    report: ErrorReport,
    observer: Option<Observer>,
}

impl<S> std::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state.name())
            .field("options", &self.options)
            .field("layout", self.compositor.layout())
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

impl<S> Session<S>
where
    S: ImageService,
{
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: SessionState::Idle,
            options: ComicOptions::default(),
            compositor: Compositor::default(),
            report: ErrorReport::default(),
            observer: None,
        }
    }

    pub fn with_options(mut self, options: ComicOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn with_report(mut self, report: ErrorReport) -> Self {
        self.report = report;
        self
    }

    /// Called after every state change, including each `Loading` update.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&SessionState) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// `Idle` → `ImageReady`.
    pub async fn generate(&mut self, prompt: &str) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(self.refuse("generate"));
        }

        self.set_state(SessionState::loading(GENERATE_MESSAGE));
        match self.service.generate(prompt).await {
            Ok(image) => {
                info!(bytes = image.bytes().len(), "image generated");
                self.set_state(SessionState::ImageReady(image));
                Ok(())
            }
            Err(e) => Err(self.fail(GENERATE_FAILED, &e)),
        }
    }

    /// `ImageReady` → `ImageReady` with the edited image; the previous image
    /// is dropped.
    pub async fn edit(&mut self, prompt: &str) -> Result<()> {
        let source = match &self.state {
            SessionState::ImageReady(image) => image.clone(),
            _ => return Err(self.refuse("edit")),
        };

        self.set_state(SessionState::loading(EDIT_MESSAGE));
        match self.service.edit(prompt, &source).await {
            Ok(image) => {
                info!(bytes = image.bytes().len(), "image edited");
                self.set_state(SessionState::ImageReady(image));
                Ok(())
            }
            Err(e) => Err(self.fail(EDIT_FAILED, &e)),
        }
    }

    /// `ImageReady` → `ComicReady`. The loading message follows the build.
    pub async fn create_comic(&mut self) -> Result<()> {
        let base = match &self.state {
            SessionState::ImageReady(image) => image.clone(),
            _ => return Err(self.refuse("create a comic")),
        };

        self.set_state(SessionState::loading(COMIC_MESSAGE));

        let state = &mut self.state;
        let observer = &mut self.observer;
        let result = build_comic_with_progress(&self.service, &base, &self.options, |progress| {
            transition(state, observer, SessionState::loading(progress_message(progress)));
        })
        .await;

        match result {
            Ok(comic) => {
                info!("comic ready");
                self.set_state(SessionState::ComicReady(comic));
                Ok(())
            }
            Err(e) => Err(self.fail(COMIC_FAILED, &e)),
        }
    }

    /// Save the stitched comic to `sink`. The comic stays displayed whether
    /// or not the download succeeds.
    ///
    /// The returned future is `Send`, so downloads can run on a spawned task.
    pub async fn download(&mut self, sink: &mut (dyn DownloadSink + Send)) -> Result<PathBuf> {
        let comic = match &self.state {
            SessionState::ComicReady(comic) => comic.clone(),
            _ => return Err(self.refuse("download a comic")),
        };

        self.set_state(SessionState::loading(DOWNLOAD_MESSAGE));

        let compositor = self.compositor.clone();
        let panels = comic.clone().into_vec();
        let rendered = tokio::task::spawn_blocking(move || compositor.composite(&panels)).await;

        let outcome = match rendered {
            Ok(Ok(bytes)) => sink
                .save(COMIC_FILENAME, &bytes)
                .map_err(|source| SessionError::Save {
                    filename: COMIC_FILENAME.to_string(),
                    source,
                }),
            Ok(Err(e)) => Err(SessionError::Composite(e)),
            Err(e) => Err(SessionError::Task(e.to_string())),
        };

        self.set_state(SessionState::ComicReady(comic));
        match &outcome {
            Ok(path) => info!(path = %path.display(), "comic saved"),
            Err(e) => warn!(error = %e, "comic download failed"),
        }
        outcome
    }

    /// Save the current single image to `sink`. State is unchanged.
    pub fn download_image(&mut self, sink: &mut dyn DownloadSink) -> Result<PathBuf> {
        let image = match &self.state {
            SessionState::ImageReady(image) => image,
            _ => return Err(self.refuse("download an image")),
        };

        let filename = format!("{}.{}", IMAGE_FILENAME_STEM, image.file_extension());
        let path = sink
            .save(&filename, image.bytes())
            .map_err(|source| SessionError::Save { filename, source })?;
        info!(path = %path.display(), "image saved");
        Ok(path)
    }

    /// Any state → `Idle`, dropping every image and message.
    pub fn start_over(&mut self) {
        self.set_state(SessionState::Idle);
    }

    fn set_state(&mut self, next: SessionState) {
        transition(&mut self.state, &mut self.observer, next);
    }

    fn refuse(&self, action: &'static str) -> SessionError {
        debug!(action, state = self.state.name(), "action refused");
        SessionError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    fn fail(&mut self, context: &str, error: &(dyn Error + 'static)) -> SessionError {
        let message = self.report.format(context, error);
        warn!(error = %error, "{}", context);
        self.set_state(SessionState::Failed {
            message: message.clone(),
        });
        SessionError::Failed(message)
    }
}

fn transition(state: &mut SessionState, observer: &mut Option<Observer>, next: SessionState) {
    debug!(from = state.name(), to = next.name(), "state change");
    *state = next;
    if let Some(observer) = observer {
        observer(state);
    }
}

fn progress_message(progress: ComicProgress) -> String {
    match progress {
        ComicProgress::Story => "Writing the story...".to_string(),
        ComicProgress::Panel { index, total } => format!("Drawing panel {} of {}...", index, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names() {
        assert_eq!(SessionState::Idle.name(), "idle");
        assert_eq!(SessionState::loading("x").name(), "loading");
        assert_eq!(
            SessionState::Failed {
                message: "boom".into()
            }
            .name(),
            "failed"
        );
    }

    #[test]
    fn state_accessors() {
        let image = GeneratedImage::from_bytes("image/png", vec![1]).unwrap();
        let ready = SessionState::ImageReady(image.clone());
        assert_eq!(ready.image(), Some(&image));
        assert!(ready.comic().is_none());
        assert!(ready.message().is_none());

        let loading = SessionState::loading(EDIT_MESSAGE);
        assert_eq!(loading.message(), Some(EDIT_MESSAGE));
        assert!(loading.image().is_none());
    }

    #[test]
    fn progress_messages() {
        assert_eq!(progress_message(ComicProgress::Story), "Writing the story...");
        assert_eq!(
            progress_message(ComicProgress::Panel { index: 2, total: 4 }),
            "Drawing panel 2 of 4..."
        );
    }
}
