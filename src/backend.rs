//! Collaborator boundaries: rasterization, text recognition, and document
//! packaging.
//!
//! The engine never parses source documents, recognizes glyphs, or encodes
//! output files itself; it consumes finished pixel buffers and fragment
//! lists from these traits and hands finished composited pages back. All
//! calls are pull-based and synchronous from the engine's point of view:
//! implementations are handed nothing partial and return nothing partial.
//! Progress callbacks are informational only.

use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

use crate::page::Fragment;

/// Minimum recognizer confidence for a fragment to survive intake.
pub const MIN_CONFIDENCE: f32 = 40.0;

/// Minimum fragment box width, in native pixels.
pub const MIN_FRAGMENT_WIDTH: f32 = 20.0;

/// Minimum fragment box height, in native pixels.
pub const MIN_FRAGMENT_HEIGHT: f32 = 12.0;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Rasterization failed: {message}")]
    Rasterization { message: String },

    #[error("Text recognition failed: {message}")]
    Recognition { message: String },

    #[error("Document packaging failed: {message}")]
    Packaging { message: String },
}

/// Corner-form bounding box in the pixel space of the recognized image.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// One recognized text span as the recognizer reports it, before intake
/// filtering.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawFragment {
    pub text: String,
    pub bounding_box: BoundingBox,
    pub confidence: f32,
}

/// Informational progress report for a long-running collaborator call.
/// Never carries data the engine acts on.
#[derive(Debug, Clone)]
pub struct Progress {
    pub stage: String,
    pub fraction: f32,
}

pub type ProgressFn<'a> = &'a dyn Fn(Progress);

/// A rasterized page: an opaque pixel buffer plus its pixel dimensions.
#[derive(Debug, Clone)]
pub struct RasterPage {
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
}

impl RasterPage {
    #[must_use]
    pub fn new(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            width,
            height,
        }
    }
}

/// Produces a pixel buffer for one page of the source document at the
/// requested scale.
pub trait PageRasterizer {
    fn rasterize(&self, page_number: u32, scale: f32) -> Result<RasterPage, BackendError>;

    /// Number of pages in the source document.
    fn page_count(&self) -> u32;
}

/// Recognizes text spans on a pixel buffer, in the buffer's own pixel
/// space.
pub trait TextRecognizer {
    fn recognize(
        &self,
        image: &RgbaImage,
        on_progress: Option<ProgressFn<'_>>,
    ) -> Result<Vec<RawFragment>, BackendError>;
}

/// Encodes an ordered list of composited native-scale page images into the
/// output document.
pub trait DocumentPackager {
    fn package(&self, pages: &[RgbaImage]) -> Result<Vec<u8>, BackendError>;
}

/// Filters raw recognizer output down to fragments worth editing.
///
/// Boxes are clamped to the page, then dropped when the confidence is at or
/// below [`MIN_CONFIDENCE`], the clamped box is smaller than
/// [`MIN_FRAGMENT_WIDTH`] x [`MIN_FRAGMENT_HEIGHT`], the box is inverted,
/// or the trimmed text is empty. Surviving text is cleaned with
/// [`collapse_cjk_spaces`].
#[must_use]
pub fn usable_fragments(raw: &[RawFragment], page_width: f32, page_height: f32) -> Vec<Fragment> {
    let mut fragments = Vec::new();

    for candidate in raw {
        let text = candidate.text.trim();
        if text.is_empty() || candidate.confidence <= MIN_CONFIDENCE {
            continue;
        }

        let x0 = candidate.bounding_box.x0.max(0.0);
        let y0 = candidate.bounding_box.y0.max(0.0);
        let x1 = candidate.bounding_box.x1.min(page_width);
        let y1 = candidate.bounding_box.y1.min(page_height);

        let width = x1 - x0;
        let height = y1 - y0;

        if width > MIN_FRAGMENT_WIDTH && height > MIN_FRAGMENT_HEIGHT && x0 < x1 && y0 < y1 {
            fragments.push(
                Fragment::new(x0, y0, width, height, collapse_cjk_spaces(text))
                    .with_confidence(candidate.confidence),
            );
        }
    }

    debug!(
        raw = raw.len(),
        usable = fragments.len(),
        "filtered recognition output"
    );

    fragments
}

/// Removes whitespace runs between CJK ideographs.
///
/// Recognizers trained on space-delimited scripts tend to emit a space
/// between every ideograph; those spaces are noise in the recognized text.
/// Spacing around non-CJK runs is preserved.
#[must_use]
pub fn collapse_cjk_spaces(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());

    let mut position = 0;
    while position < chars.len() {
        let ch = chars[position];
        if ch.is_whitespace() {
            let run_end = chars[position..]
                .iter()
                .position(|c| !c.is_whitespace())
                .map_or(chars.len(), |offset| position + offset);

            let before = position.checked_sub(1).map(|i| chars[i]);
            let after = chars.get(run_end).copied();

            let between_cjk = matches!((before, after), (Some(b), Some(a)) if is_cjk(b) && is_cjk(a));
            if !between_cjk {
                result.extend(&chars[position..run_end]);
            }
            position = run_end;
        } else {
            result.push(ch);
            position += 1;
        }
    }

    result
}

#[inline]
fn is_cjk(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}
