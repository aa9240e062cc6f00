//! Two-layer compositing of edited regions over the base page raster.
//!
//! Render order for a page: the base image, then every committed region's
//! mask layer, then its glyph layer. The mask is painted at the region's
//! pinned mask geometry while glyphs follow the current glyph geometry, so
//! nudging text never disturbs the redaction underneath. The same pipeline
//! runs at display scale for interactive preview and at native (1x) scale
//! for export, keeping the two pixel-compatible.

pub mod error;
pub mod layout;

pub use error::RenderError;

use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as PixelRect;
use tracing::warn;

use crate::geometry::Rect;
use crate::page::{Page, Region};
use crate::utils::config::AppConfig;

use layout::{horizontal_anchor, vertical_columns};

/// Composites pages for preview and export.
///
/// Holds the font faces glyph layers are rasterized with. A compositor
/// without fonts can still paint mask layers; asking it to paint glyphs is
/// a [`RenderError::FontUnavailable`].
#[derive(Default)]
pub struct Compositor {
    font: Option<FontArc>,
    bold_font: Option<FontArc>,
}

impl Compositor {
    /// A compositor with no font faces. Mask layers only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_fonts(font: FontArc, bold_font: Option<FontArc>) -> Self {
        Self {
            font: Some(font),
            bold_font,
        }
    }

    /// Loads font faces from the configured paths. A missing bold face
    /// falls back to the regular face; a missing regular face is an error
    /// only once glyph compositing is requested, so cover-only workflows
    /// keep working on systems without the font installed.
    pub fn from_config(config: &AppConfig) -> Result<Self, RenderError> {
        let font = match load_face(&config.font_path) {
            Ok(face) => Some(face),
            Err(error) => {
                warn!(path = %config.font_path, %error, "regular font face unavailable");
                None
            }
        };

        let bold_font = match config.bold_font_path.as_deref() {
            Some(path) => Some(load_face(path)?),
            None => None,
        };

        Ok(Self { font, bold_font })
    }

    #[must_use]
    pub fn has_font(&self) -> bool {
        self.font.is_some() || self.bold_font.is_some()
    }

    /// Composites the page for on-screen preview at the page's display
    /// scale.
    pub fn compose_preview(&self, base: &RgbaImage, page: &Page) -> Result<RgbaImage, RenderError> {
        self.compose_at(base, page, page.display_scale)
    }

    /// Composites the page for export at native scale. Identical layer
    /// rules to the preview path.
    pub fn compose_export(&self, base: &RgbaImage, page: &Page) -> Result<RgbaImage, RenderError> {
        self.compose_at(base, page, 1.0)
    }

    fn compose_at(
        &self,
        base: &RgbaImage,
        page: &Page,
        scale: f32,
    ) -> Result<RgbaImage, RenderError> {
        let mut canvas = if (scale - 1.0).abs() < f32::EPSILON {
            base.clone()
        } else {
            let width = ((page.width * scale).round() as u32).max(1);
            let height = ((page.height * scale).round() as u32).max(1);
            imageops::resize(base, width, height, FilterType::CatmullRom)
        };

        for region in page.regions.list() {
            if !region.is_edited {
                continue;
            }

            if region.draws_mask() {
                fill_rect(&mut canvas, &region.mask_rect().scaled(scale), region);
            }

            if region.draws_glyphs() {
                self.draw_glyphs(&mut canvas, region, scale)?;
            }
        }

        Ok(canvas)
    }

    fn draw_glyphs(
        &self,
        canvas: &mut RgbaImage,
        region: &Region,
        scale: f32,
    ) -> Result<(), RenderError> {
        let face = self.face_for(region.is_bold).ok_or(RenderError::FontUnavailable)?;
        let px = PxScale::from(region.font_size * scale);
        let color = region.color.to_rgba();

        if region.is_vertical {
            for cell in vertical_columns(&region.rect, region.font_size, scale, &region.text) {
                let mut buffer = [0u8; 4];
                imageproc::drawing::draw_text_mut(
                    canvas,
                    color,
                    cell.x.round() as i32,
                    cell.y.round() as i32,
                    px,
                    face,
                    cell.ch.encode_utf8(&mut buffer),
                );
            }
        } else {
            let (x, y) = horizontal_anchor(&region.rect, region.font_size, scale);
            imageproc::drawing::draw_text_mut(
                canvas,
                color,
                x.round() as i32,
                y.round() as i32,
                px,
                face,
                &region.text,
            );
        }

        Ok(())
    }

    fn face_for(&self, bold: bool) -> Option<&FontArc> {
        if bold {
            self.bold_font.as_ref().or(self.font.as_ref())
        } else {
            self.font.as_ref()
        }
    }
}

/// Encodes a composited page as PNG bytes, the interchange form handed to
/// document packagers.
pub fn encode_png(page: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut bytes = Vec::new();
    page.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )?;
    Ok(bytes)
}

fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, region: &Region) {
    let width = rect.width.round().max(1.0) as u32;
    let height = rect.height.round().max(1.0) as u32;
    draw_filled_rect_mut(
        canvas,
        PixelRect::at(rect.x.round() as i32, rect.y.round() as i32).of_size(width, height),
        region.mask_fill().to_rgba(),
    );
}

fn load_face(path: &str) -> Result<FontArc, RenderError> {
    let bytes = std::fs::read(path).map_err(|_| RenderError::FontLoad {
        path: path.to_string(),
    })?;
    FontArc::try_from_vec(bytes).map_err(|_| RenderError::FontLoad {
        path: path.to_string(),
    })
}
