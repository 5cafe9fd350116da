use gemini_image::{GeneratedImage, ImageService};
use tracing::{debug, info};

use crate::error::ComicError;
use crate::story::{
    panel_prompt, story_prompt, storyboard_schema, ComicOptions, Storyboard, PANEL_COUNT,
};

/// Four panels in narrative order (which is also display and compositing
/// order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComicSequence {
    panels: [GeneratedImage; PANEL_COUNT],
}

impl ComicSequence {
    /// Wrap exactly four panels; any other count is rejected.
    pub fn new(panels: Vec<GeneratedImage>) -> Result<Self, ComicError> {
        let got = panels.len();
        let panels: [GeneratedImage; PANEL_COUNT] = panels
            .try_into()
            .map_err(|_| ComicError::PanelCount { got })?;
        Ok(Self { panels })
    }

    pub fn panels(&self) -> &[GeneratedImage] {
        &self.panels
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeneratedImage> {
        self.panels.iter()
    }

    pub fn into_vec(self) -> Vec<GeneratedImage> {
        self.panels.into()
    }
}

impl<'a> IntoIterator for &'a ComicSequence {
    type Item = &'a GeneratedImage;
    type IntoIter = std::slice::Iter<'a, GeneratedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Stage reached by a comic build, reported before the stage starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComicProgress {
    /// Asking the text model for the four-beat story.
    Story,
    /// Drawing panel `index` (1-based) of `total`.
    Panel { index: usize, total: usize },
}

/// Turn `base` into a four-panel comic.
///
/// See [`build_comic_with_progress`].
pub async fn build_comic<S>(
    service: &S,
    base: &GeneratedImage,
    options: &ComicOptions,
) -> Result<ComicSequence, ComicError>
where
    S: ImageService,
{
    build_comic_with_progress(service, base, options, |_| {}).await
}

/// Turn `base` into a four-panel comic, reporting each stage to `on_progress`.
///
/// One story request, then one edit per panel. Panels are drawn strictly in
/// order: panel 1 is conditioned on `base`, every later panel on the panel
/// before it, so no panel can be requested before its predecessor exists.
/// The first failure aborts the build and nothing drawn so far is returned.
pub async fn build_comic_with_progress<S, F>(
    service: &S,
    base: &GeneratedImage,
    options: &ComicOptions,
    mut on_progress: F,
) -> Result<ComicSequence, ComicError>
where
    S: ImageService,
    F: FnMut(ComicProgress),
{
    on_progress(ComicProgress::Story);
    let reply = service
        .generate_structured(&story_prompt(options), base, &storyboard_schema())
        .await
        .map_err(ComicError::Story)?;

    let story = Storyboard::parse(&reply)?;
    info!(panels = story.panels.len(), "story ready");

    let mut panels: Vec<GeneratedImage> = Vec::with_capacity(PANEL_COUNT);
    for (i, description) in story.panels.iter().enumerate() {
        let index = i + 1;
        on_progress(ComicProgress::Panel {
            index,
            total: PANEL_COUNT,
        });

        let reference = panels.last().unwrap_or(base);
        debug!(index, %description, "drawing panel");

        let panel = service
            .edit(&panel_prompt(description, options), reference)
            .await
            .map_err(|source| ComicError::Panel { index, source })?;
        panels.push(panel);
    }

    ComicSequence::new(panels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(tag: u8) -> GeneratedImage {
        GeneratedImage::from_bytes("image/png", vec![tag]).unwrap()
    }

    #[test]
    fn sequence_requires_four() {
        assert!(ComicSequence::new(vec![img(1), img(2), img(3), img(4)]).is_ok());
        assert!(matches!(
            ComicSequence::new(vec![img(1), img(2), img(3)]),
            Err(ComicError::PanelCount { got: 3 })
        ));
        assert!(matches!(
            ComicSequence::new(vec![img(1); 5]),
            Err(ComicError::PanelCount { got: 5 })
        ));
    }

    #[test]
    fn sequence_keeps_order() {
        let seq = ComicSequence::new(vec![img(1), img(2), img(3), img(4)]).unwrap();
        let tags: Vec<u8> = seq.iter().map(|p| p.bytes()[0]).collect();
        assert_eq!(tags, vec![1, 2, 3, 4]);
        assert_eq!(seq.into_vec().len(), 4);
    }
}
