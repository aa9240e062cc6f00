use geo::Coord;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::utils::color::{Color, SampledColors};

/// Default font family for regions seeded from recognition.
pub const DEFAULT_FONT_FAMILY: &str = "Noto Sans TC";

/// Placeholder content for the fallback region created when recognition
/// yields nothing usable.
pub const FALLBACK_TEXT: &str = "(Automatic text recognition failed; edit manually)";

/// Opaque unique region identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn fresh() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(char::from)
            .collect();
        Self(format!("id_{}", suffix.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Pinned mask geometry.
///
/// Serializes flattened into its owning region under the `mask`-prefixed
/// field names the editing front ends exchange and persist
/// (`maskX`, `maskY`, `maskWidth`, `maskHeight`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskGeometry {
    #[serde(rename = "maskX")]
    pub x: f32,
    #[serde(rename = "maskY")]
    pub y: f32,
    #[serde(rename = "maskWidth")]
    pub width: f32,
    #[serde(rename = "maskHeight")]
    pub height: f32,
}

impl From<Rect> for MaskGeometry {
    #[inline]
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

impl From<MaskGeometry> for Rect {
    #[inline]
    fn from(mask: MaskGeometry) -> Self {
        Self {
            x: mask.x,
            y: mask.y,
            width: mask.width,
            height: mask.height,
        }
    }
}

/// An editable rectangular annotation over a document page: an optional
/// opaque mask plus optional replacement text.
///
/// Glyph geometry (`rect`) and mask geometry (`mask`) are independent. The
/// mask is initialized from the glyph geometry the first time the region is
/// committed and stays fixed afterwards, so text can be nudged without
/// disturbing the redaction underneath.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    /// 1-based display order, recomputed on deletion.
    pub index: u32,
    /// Glyph geometry in native page coordinates.
    #[serde(flatten)]
    pub rect: Rect,
    /// Mask geometry; `None` until first initialized.
    #[serde(flatten)]
    pub mask: Option<MaskGeometry>,
    pub text: String,
    /// Immutable snapshot of the recognized text at creation.
    pub original_text: String,
    pub font_size: f32,
    pub font_family: String,
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bg_color: Option<Color>,
    pub is_bold: bool,
    pub is_vertical: bool,
    /// Set once the region has been committed at least once.
    pub is_edited: bool,
    /// Mask with no glyphs.
    pub is_cover_only: bool,
    /// Created ad hoc; never derives a mask from its glyph geometry.
    pub is_free_floating: bool,
    /// Set on the fallback region produced when recognition finds nothing.
    #[serde(default)]
    pub needs_manual_entry: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub confidence: Option<f32>,
}

impl Region {
    /// Base constructor with recognition-seed defaults.
    #[must_use]
    pub fn new(index: u32, rect: Rect, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: RegionId::fresh(),
            index,
            rect,
            mask: None,
            original_text: text.clone(),
            text,
            font_size: 20.0,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            color: Color::DEFAULT_TEXT,
            bg_color: None,
            is_bold: true,
            is_vertical: false,
            is_edited: false,
            is_cover_only: false,
            is_free_floating: false,
            needs_manual_entry: false,
            confidence: None,
        }
    }

    /// A region seeded from a merged recognition box. Font size tracks the
    /// box height so the replacement glyphs roughly match the original
    /// print size.
    #[must_use]
    pub fn from_recognition(index: u32, rect: Rect, text: impl Into<String>) -> Self {
        let mut region = Self::new(index, rect, text);
        region.font_size = rect.height * 0.8;
        region
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// A region created from a user rectangle selection. The mask geometry
    /// is pinned to the selection immediately, before any glyph nudging can
    /// happen, and the fill colors come from sampling the page underneath.
    #[must_use]
    pub fn from_selection(index: u32, rect: Rect, colors: SampledColors) -> Self {
        let mut region = Self::new(index, rect, "");
        region.mask = Some(rect.into());
        region.font_size = (rect.height * 0.7).round();
        region.color = colors.text;
        region.bg_color = Some(colors.bg);
        region.is_edited = true;
        region
    }

    /// A free-floating text region with no mask of its own.
    #[must_use]
    pub fn free_floating(index: u32, is_vertical: bool) -> Self {
        let rect = if is_vertical {
            Rect::new(100.0, 100.0, 60.0, 200.0)
        } else {
            Rect::new(100.0, 100.0, 300.0, 60.0)
        };
        let mut region = Self::new(index, rect, "");
        region.font_size = 24.0;
        region.color = Color::BLACK;
        region.is_vertical = is_vertical;
        region.is_free_floating = true;
        region
    }

    /// A standalone cover patch dropped at `at`, filled with `color`.
    #[must_use]
    pub fn cover(index: u32, color: Color, at: Coord<f32>) -> Self {
        let mut region = Self::new(index, Rect::new(at.x, at.y, 150.0, 60.0), "");
        region.bg_color = Some(color);
        region.is_cover_only = true;
        region.is_edited = true;
        region.is_free_floating = true;
        region
    }

    /// The single fallback region produced when recognition yields no
    /// usable fragments: a strip across the top of the page, flagged for
    /// manual entry.
    #[must_use]
    pub fn fallback(page_width: f32, page_height: f32) -> Self {
        let rect = Rect::new(
            page_width * 0.1,
            page_height * 0.05,
            page_width * 0.8,
            page_height * 0.05,
        );
        let mut region = Self::new(1, rect, FALLBACK_TEXT);
        region.needs_manual_entry = true;
        region
    }

    /// Whether the compositor paints this region's mask layer.
    ///
    /// True when a fill color was chosen, or when the mask geometry was
    /// ever initialized (legacy data without an explicit fill).
    #[inline]
    #[must_use]
    pub fn draws_mask(&self) -> bool {
        self.bg_color.is_some() || self.mask.is_some()
    }

    /// Whether the compositor paints this region's glyph layer.
    #[inline]
    #[must_use]
    pub fn draws_glyphs(&self) -> bool {
        !self.text.is_empty() && !self.is_cover_only
    }

    /// The rectangle the mask layer fills: the pinned mask geometry, or the
    /// glyph geometry when the mask was never initialized.
    #[inline]
    #[must_use]
    pub fn mask_rect(&self) -> Rect {
        self.mask.map(Rect::from).unwrap_or(self.rect)
    }

    /// The mask fill color; legacy masks without an explicit color paint
    /// white.
    #[inline]
    #[must_use]
    pub fn mask_fill(&self) -> Color {
        self.bg_color.unwrap_or(Color::WHITE)
    }

    /// Pins the mask geometry to the current glyph geometry if it was never
    /// initialized. Free-floating regions never grow a mask.
    pub fn ensure_mask(&mut self) {
        if self.mask.is_none() && !self.is_free_floating {
            self.mask = Some(self.rect.into());
        }
    }
}
