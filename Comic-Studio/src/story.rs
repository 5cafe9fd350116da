//! Narrative step of comic creation: the story prompt, the response schema,
//! and parsing of the model's reply into exactly four panel descriptions.

use gemini_image::wire::excerpt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ComicError;

/// Number of panels in a comic.
pub const PANEL_COUNT: usize = 4;

/// Longest slice of a bad reply kept in [`ComicError::InvalidStory`].
const EXCERPT_LEN: usize = 200;

/// Schema field holding the panel list.
pub const PANELS_FIELD: &str = "panels";

/// Knobs for the narrative and panel prompts.
#[derive(Debug, Clone)]
pub struct ComicOptions {
    /// Who the story is about (default: "a little girl")
    pub protagonist: String,
    /// Visual style directive appended to every panel prompt
    pub style: String,
}

impl Default for ComicOptions {
    fn default() -> Self {
        Self {
            protagonist: "a little girl".to_string(),
            style: "comic art with clean, bold black ink outlines".to_string(),
        }
    }
}

impl ComicOptions {
    pub fn with_protagonist(mut self, protagonist: impl Into<String>) -> Self {
        self.protagonist = protagonist.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

/// Instruction for the story writer. The base image is sent alongside it.
pub fn story_prompt(options: &ComicOptions) -> String {
    let who = &options.protagonist;
    format!(
        "You are a creative comic book writer. Based on the provided image, invent a simple, \
coherent 4-panel story about {who}.\n\
The story must be consistent, with a clear beginning, middle, and end.\n\
For each of the 4 panels, write a short, clear, vivid visual description that an AI image \
generator can use to create the panel.\n\
The first panel must be inspired by the user's original image, establishing {who} and the setting.\n\
Make sure the descriptions of all panels keep the same character ({who}) and the same setting."
    )
}

/// Instruction for drawing one panel from the reference image.
pub fn panel_prompt(description: &str, options: &ComicOptions) -> String {
    format!(
        "**Strictly keep the character design, the setting, and the art style of the reference image.** \
Create a NEW comic panel showing this scene: \"{}\". Style: {}.",
        description, options.style
    )
}

/// `{"panels": [string, ...]}` with `panels` required.
pub fn storyboard_schema() -> Value {
    gemini_image::schema::string_list(PANELS_FIELD, "A visual description for one comic panel.")
}

/// The parsed narrative reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Storyboard {
    pub panels: Vec<String>,
}

impl Storyboard {
    /// Parse the model's reply and enforce the exactly-four gate.
    ///
    /// Accepts the bare JSON object or the same object inside a fenced code
    /// block. Anything else is [`ComicError::InvalidStory`]; a well-formed
    /// reply with the wrong number of panels is [`ComicError::PanelCount`].
    pub fn parse(reply: &str) -> Result<Self, ComicError> {
        let trimmed = reply.trim();

        let parsed = serde_json::from_str::<Storyboard>(trimmed).or_else(|first_err| {
            extract_json_block(trimmed)
                .and_then(|block| serde_json::from_str::<Storyboard>(&block).ok())
                .ok_or(first_err)
        });

        let storyboard = parsed.map_err(|e| ComicError::InvalidStory {
            reason: e.to_string(),
            excerpt: excerpt(trimmed, EXCERPT_LEN).to_string(),
        })?;

        if storyboard.panels.len() != PANEL_COUNT {
            return Err(ComicError::PanelCount {
                got: storyboard.panels.len(),
            });
        }

        Ok(storyboard)
    }
}

/// Extract JSON from ```json ... ``` code blocks.
fn extract_json_block(text: &str) -> Option<String> {
    let markers = ["```json", "```JSON", "```"];
    for marker in markers {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim().to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR: &str = r#"{"panels": ["She finds a kite.", "Wind lifts it.", "It snags a tree.", "A bird frees it."]}"#;

    #[test]
    fn parse_direct_json() {
        let story = Storyboard::parse(FOUR).unwrap();
        assert_eq!(story.panels.len(), 4);
        assert_eq!(story.panels[0], "She finds a kite.");
        assert_eq!(story.panels[3], "A bird frees it.");
    }

    #[test]
    fn parse_with_whitespace() {
        let story = Storyboard::parse(&format!("\n\n  {}  \n", FOUR)).unwrap();
        assert_eq!(story.panels.len(), 4);
    }

    #[test]
    fn parse_fenced_block() {
        let reply = format!("Here is the story:\n```json\n{}\n```", FOUR);
        let story = Storyboard::parse(&reply).unwrap();
        assert_eq!(story.panels[1], "Wind lifts it.");
    }

    #[test]
    fn three_panels_rejected() {
        let err = Storyboard::parse(r#"{"panels": ["a", "b", "c"]}"#).unwrap_err();
        assert!(matches!(err, ComicError::PanelCount { got: 3 }));
    }

    #[test]
    fn five_panels_rejected() {
        let err = Storyboard::parse(r#"{"panels": ["a", "b", "c", "d", "e"]}"#).unwrap_err();
        assert!(matches!(err, ComicError::PanelCount { got: 5 }));
    }

    #[test]
    fn empty_panel_list_rejected() {
        let err = Storyboard::parse(r#"{"panels": []}"#).unwrap_err();
        assert!(matches!(err, ComicError::PanelCount { got: 0 }));
    }

    #[test]
    fn not_json_is_invalid_story() {
        let err = Storyboard::parse("Once upon a time there was a girl.").unwrap_err();
        match err {
            ComicError::InvalidStory { excerpt, .. } => {
                assert_eq!(excerpt, "Once upon a time there was a girl.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_field_is_invalid_story() {
        let err = Storyboard::parse(r#"{"scenes": ["a", "b", "c", "d"]}"#).unwrap_err();
        assert!(matches!(err, ComicError::InvalidStory { .. }));
    }

    #[test]
    fn non_string_panels_are_invalid_story() {
        let err = Storyboard::parse(r#"{"panels": [1, 2, 3, 4]}"#).unwrap_err();
        assert!(matches!(err, ComicError::InvalidStory { .. }));
    }

    #[test]
    fn excerpt_is_truncated() {
        let reply = "x".repeat(500);
        match Storyboard::parse(&reply).unwrap_err() {
            ComicError::InvalidStory { excerpt, .. } => assert_eq!(excerpt.len(), EXCERPT_LEN),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn story_prompt_names_protagonist() {
        let prompt = story_prompt(&ComicOptions::default().with_protagonist("an old sailor"));
        assert!(prompt.contains("4-panel story about an old sailor"));
        assert!(prompt.contains("same character (an old sailor)"));
        assert!(prompt.contains("first panel must be inspired by the user's original image"));
    }

    #[test]
    fn panel_prompt_embeds_description_and_style() {
        let prompt = panel_prompt("She finds a kite.", &ComicOptions::default());
        assert!(prompt.starts_with("**Strictly keep the character design"));
        assert!(prompt.contains("\"She finds a kite.\""));
        assert!(prompt.ends_with("Style: comic art with clean, bold black ink outlines."));
    }

    #[test]
    fn schema_requires_panels() {
        let schema = storyboard_schema();
        assert_eq!(schema["required"][0], PANELS_FIELD);
        assert_eq!(schema["properties"][PANELS_FIELD]["items"]["type"], "STRING");
    }

    #[test]
    fn extract_json_block_none() {
        assert_eq!(extract_json_block("no code block"), None);
    }
}
