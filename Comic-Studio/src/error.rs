use gemini_image::GeminiError;
use thiserror::Error;

use crate::compositor::CompositeError;

/// Errors from building a comic. Each variant names the stage that failed.
#[derive(Error, Debug)]
pub enum ComicError {
    /// The story request itself did not complete.
    #[error("Story generation failed: {0}")]
    Story(#[source] GeminiError),

    /// The story reply was not the declared `{"panels": [...]}` shape.
    #[error("The story reply was not valid panel JSON ({reason}). The reply was: {excerpt}...")]
    InvalidStory { reason: String, excerpt: String },

    /// The story parsed but did not hold exactly four panels.
    #[error("expected 4 panel descriptions, got {got}")]
    PanelCount { got: usize },

    /// Drawing one panel failed. `index` is 1-based.
    #[error("Panel {index} of 4 failed: {source}")]
    Panel { index: usize, source: GeminiError },
}

impl ComicError {
    /// True for the two narrative-shape failures.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            ComicError::InvalidStory { .. } | ComicError::PanelCount { .. }
        )
    }
}

/// Errors returned by [`Session`](crate::Session) operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The action is not allowed from the current state. State is unchanged.
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    /// A generate/edit/comic workflow failed; the session is now `Failed`
    /// with this message.
    #[error("{0}")]
    Failed(String),

    /// Building the composite download failed. The comic stays displayed.
    #[error("Could not assemble the comic image: {0}")]
    Composite(#[from] CompositeError),

    /// The download sink could not write the file.
    #[error("Could not save {filename}: {source}")]
    Save {
        filename: String,
        source: std::io::Error,
    },

    /// A background task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_count_message() {
        let err = ComicError::PanelCount { got: 3 };
        assert_eq!(err.to_string(), "expected 4 panel descriptions, got 3");
        assert!(err.is_schema_error());
    }

    #[test]
    fn panel_error_names_index_and_cause() {
        let err = ComicError::Panel {
            index: 2,
            source: GeminiError::NoImageData { reason: None },
        };
        assert_eq!(err.to_string(), "Panel 2 of 4 failed: no image data in response");
        assert!(!err.is_schema_error());
    }

    #[test]
    fn invalid_transition_message() {
        let err = SessionError::InvalidTransition {
            action: "edit",
            state: "idle",
        };
        assert_eq!(err.to_string(), "Cannot edit while idle");
    }
}
