//! Stitch four panels into one 2×2 PNG for download.

use std::io::Cursor;

use gemini_image::GeneratedImage;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::story::PANEL_COUNT;

/// Grid geometry and background fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComicLayout {
    /// Side of each square cell in pixels (default: 1024)
    pub panel_size: u32,
    /// Gap between and around cells in pixels (default: 40)
    pub gap: u32,
    /// Canvas fill (default: #1f2937)
    pub background: [u8; 4],
}

impl Default for ComicLayout {
    fn default() -> Self {
        Self {
            panel_size: 1024,
            gap: 40,
            background: [0x1f, 0x29, 0x37, 0xff],
        }
    }
}

impl ComicLayout {
    /// Width and height of the square canvas.
    pub fn canvas_size(&self) -> u32 {
        self.panel_size * 2 + self.gap * 3
    }

    /// Top-left corner of each cell in reading order.
    pub fn positions(&self) -> [(u32, u32); PANEL_COUNT] {
        let near = self.gap;
        let far = self.panel_size + self.gap * 2;
        [(near, near), (far, near), (near, far), (far, far)]
    }
}

/// Errors produced while assembling the composite.
#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("expected 4 panels, got {0}")]
    PanelCount(usize),

    /// `index` is 1-based.
    #[error("panel {index} could not be decoded: {source}")]
    Decode {
        index: usize,
        source: image::ImageError,
    },

    #[error("failed to encode the comic: {0}")]
    Encode(#[source] image::ImageError),
}

/// Renders comics onto a fixed grid.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    layout: ComicLayout,
}

impl Compositor {
    pub fn new(layout: ComicLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ComicLayout {
        &self.layout
    }

    /// Decode all four panels, draw them top-left, top-right, bottom-left,
    /// bottom-right, and return PNG bytes.
    ///
    /// Nothing is drawn unless every panel decodes. Output depends only on
    /// the input bytes and the layout.
    pub fn composite(&self, panels: &[GeneratedImage]) -> Result<Vec<u8>, CompositeError> {
        let canvas = self.render(panels)?;

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(CompositeError::Encode)?;
        debug!(len = bytes.len(), "comic encoded");
        Ok(bytes)
    }

    /// Same as [`composite`](Self::composite) but returns the raw canvas.
    pub fn render(&self, panels: &[GeneratedImage]) -> Result<RgbaImage, CompositeError> {
        if panels.len() != PANEL_COUNT {
            return Err(CompositeError::PanelCount(panels.len()));
        }

        let decoded = panels
            .iter()
            .enumerate()
            .map(|(i, panel)| {
                decode(panel).map_err(|source| CompositeError::Decode {
                    index: i + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let size = self.layout.canvas_size();
        let cell = self.layout.panel_size;
        let mut canvas = RgbaImage::from_pixel(size, size, Rgba(self.layout.background));

        for (img, (x, y)) in decoded.iter().zip(self.layout.positions()) {
            let rgba = img.to_rgba8();
            let fitted = if rgba.dimensions() == (cell, cell) {
                rgba
            } else {
                imageops::resize(&rgba, cell, cell, FilterType::Triangle)
            };
            imageops::overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));
        }

        Ok(canvas)
    }
}

fn decode(panel: &GeneratedImage) -> Result<DynamicImage, image::ImageError> {
    match ImageFormat::from_mime_type(panel.media_type()) {
        Some(format) => image::load_from_memory_with_format(panel.bytes(), format),
        None => image::load_from_memory(panel.bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(color: [u8; 4], side: u32) -> GeneratedImage {
        let img = RgbaImage::from_pixel(side, side, Rgba(color));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        GeneratedImage::from_bytes("image/png", bytes).unwrap()
    }

    fn small() -> Compositor {
        Compositor::new(ComicLayout {
            panel_size: 8,
            gap: 2,
            background: [10, 20, 30, 255],
        })
    }

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    // resampling may be off by one on a channel
    fn assert_close(actual: [u8; 4], expected: [u8; 4]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!(a.abs_diff(e) <= 2, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn default_layout_matches_download_size() {
        let layout = ComicLayout::default();
        assert_eq!(layout.canvas_size(), 1024 * 2 + 40 * 3);
        assert_eq!(
            layout.positions(),
            [(40, 40), (1104, 40), (40, 1104), (1104, 1104)]
        );
    }

    #[test]
    fn panels_land_in_reading_order() {
        let panels = vec![solid(RED, 8), solid(GREEN, 8), solid(BLUE, 8), solid(WHITE, 8)];
        let canvas = small().render(&panels).unwrap();

        assert_eq!(canvas.dimensions(), (22, 22));
        assert_eq!(canvas.get_pixel(5, 5).0, RED);
        assert_eq!(canvas.get_pixel(15, 5).0, GREEN);
        assert_eq!(canvas.get_pixel(5, 15).0, BLUE);
        assert_eq!(canvas.get_pixel(15, 15).0, WHITE);
        // gaps keep the background
        assert_eq!(canvas.get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert_eq!(canvas.get_pixel(11, 11).0, [10, 20, 30, 255]);
    }

    #[test]
    fn panels_are_scaled_to_cell() {
        let panels = vec![solid(RED, 32), solid(GREEN, 4), solid(BLUE, 8), solid(WHITE, 16)];
        let canvas = small().render(&panels).unwrap();
        assert_close(canvas.get_pixel(2, 2).0, RED);
        assert_close(canvas.get_pixel(9, 9).0, RED);
        assert_close(canvas.get_pixel(12, 2).0, GREEN);
        assert_close(canvas.get_pixel(19, 19).0, WHITE);
        assert_eq!(canvas.get_pixel(10, 10).0, [10, 20, 30, 255]);
    }

    #[test]
    fn compositing_is_deterministic() {
        let panels = vec![solid(RED, 8), solid(GREEN, 8), solid(BLUE, 8), solid(WHITE, 8)];
        let a = small().composite(&panels).unwrap();
        let b = small().composite(&panels).unwrap();
        assert_eq!(a, b);

        let decoded = image::load_from_memory_with_format(&a, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), 22);
    }

    #[test]
    fn wrong_panel_count() {
        let panels = vec![solid(RED, 8), solid(GREEN, 8), solid(BLUE, 8)];
        assert!(matches!(
            small().composite(&panels),
            Err(CompositeError::PanelCount(3))
        ));
    }

    #[test]
    fn one_bad_panel_fails_everything() {
        let junk = GeneratedImage::from_bytes("image/png", b"not a png".to_vec()).unwrap();
        let panels = vec![solid(RED, 8), solid(GREEN, 8), junk, solid(WHITE, 8)];
        match small().composite(&panels).unwrap_err() {
            CompositeError::Decode { index, .. } => assert_eq!(index, 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
