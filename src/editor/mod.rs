//! The engine-state context driving interactive region editing.
//!
//! [`Editor`] owns the page list, the active page cursor, the zoom level,
//! and the pointer-interaction state. Every committed mutation runs through
//! one of its operations, which take the single pre-mutation history
//! snapshot before touching the region store; transient pointer motion
//! never reaches either.

pub mod error;
pub mod interaction;

pub use error::EditorError;
pub use interaction::Interaction;

use geo::Coord;
use image::RgbaImage;
use tracing::{info, warn};

use crate::backend::{usable_fragments, BackendError, RawFragment};
use crate::geometry::{clamp_zoom, Rect, ViewTransform};
use crate::page::{merge_fragments, Page, Region, RegionId};
use crate::render::{Compositor, RenderError};
use crate::utils::color::{sample_colors, Color};

use interaction::{
    MIN_REGION_HEIGHT, MIN_REGION_WIDTH, MIN_SELECTION_HEIGHT, MIN_SELECTION_WIDTH,
    RESIZE_FONT_FACTOR,
};

/// Style attributes applied when committing an edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditStyle {
    pub font_size: f32,
    pub color: Color,
    pub bg_color: Option<Color>,
    pub is_bold: bool,
}

impl Default for EditStyle {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            color: Color::BLACK,
            bg_color: None,
            is_bold: true,
        }
    }
}

/// Interactive editing context over a loaded document.
pub struct Editor {
    pages: Vec<Page>,
    current: Option<usize>,
    zoom: f32,
    pub show_regions: bool,
    pub preview_mode: bool,
    interaction: Interaction,
    pending: Option<Region>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: None,
            zoom: 1.0,
            show_regions: true,
            preview_mode: false,
            interaction: Interaction::Idle,
            pending: None,
        }
    }

    pub fn add_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_page(&self) -> Result<&Page, EditorError> {
        self.current
            .and_then(|index| self.pages.get(index))
            .ok_or(EditorError::NoActivePage)
    }

    pub fn current_page_mut(&mut self) -> Result<&mut Page, EditorError> {
        match self.current {
            Some(index) => self
                .pages
                .get_mut(index)
                .ok_or(EditorError::NoActivePage),
            None => Err(EditorError::NoActivePage),
        }
    }

    /// Makes `index` the active page, marks it as under manual editing, and
    /// resets zoom to 100%.
    pub fn open_page(&mut self, index: usize) -> Result<(), EditorError> {
        let page = self.pages.get_mut(index).ok_or(EditorError::NoActivePage)?;
        page.is_analyzed = true;
        self.current = Some(index);
        self.zoom = 1.0;
        self.interaction = Interaction::Idle;
        info!(page = page.number, "opened page for editing");
        Ok(())
    }

    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Sets the zoom level, clamped to the supported range, and returns the
    /// effective value.
    pub fn set_zoom(&mut self, level: f32) -> f32 {
        self.zoom = clamp_zoom(level);
        self.zoom
    }

    /// The native/display/viewport mapping for the active page.
    pub fn transform(&self) -> Result<ViewTransform, EditorError> {
        let page = self.current_page()?;
        Ok(ViewTransform::new(page.display_scale, self.zoom))
    }

    /// Fits the active page to a container width, recording its display
    /// scale.
    pub fn fit_current(&mut self, container_width: f32) -> Result<f32, EditorError> {
        Ok(self.current_page_mut()?.fit_display_scale(container_width))
    }

    /// Toggles the region-outline overlay and returns the new state.
    pub fn toggle_region_visibility(&mut self) -> bool {
        self.show_regions = !self.show_regions;
        self.show_regions
    }

    /// Toggles borderless preview mode and returns the new state.
    pub fn toggle_preview_mode(&mut self) -> bool {
        self.preview_mode = !self.preview_mode;
        self.preview_mode
    }

    // ------------------------------------------------------------------
    // Rectangle selection
    // ------------------------------------------------------------------

    /// Starts dragging out a selection rectangle at `point` (viewport
    /// space).
    ///
    /// Selection requires 100% zoom: pointer-to-native conversion under
    /// magnification is too fragile for precise selection, so any other
    /// zoom level resets to 1.0 and the caller must re-issue the gesture.
    pub fn begin_selection(&mut self, point: Coord<f32>) -> Result<(), EditorError> {
        self.current_page()?;

        if (self.zoom - 1.0).abs() > f32::EPSILON {
            self.zoom = 1.0;
            return Err(EditorError::ZoomResetForSelection);
        }

        self.interaction = Interaction::Selecting {
            start: point,
            current: point,
        };
        Ok(())
    }

    /// Tracks pointer motion for whatever interaction is active.
    pub fn update_pointer(&mut self, point: Coord<f32>) {
        self.interaction.track(point);
    }

    /// Completes the selection, sampling mask and text colors from the base
    /// image under the selected area, and stages a pending region for the
    /// edit dialog.
    ///
    /// Selections below the minimum size are rejected without mutating any
    /// state.
    pub fn finish_selection(&mut self, base: &RgbaImage) -> Result<&Region, EditorError> {
        let (start, end) = match std::mem::take(&mut self.interaction) {
            Interaction::Selecting { start, current } => (start, current),
            other => {
                self.interaction = other;
                return Err(EditorError::InvalidInteraction);
            }
        };

        let page = self
            .current
            .and_then(|index| self.pages.get(index))
            .ok_or(EditorError::NoActivePage)?;

        // Zoom is pinned to 1.0 while selecting, so the base canvas maps
        // back to native space through the display scale alone.
        let transform = ViewTransform::new(page.display_scale, 1.0);
        let rect = Rect::from_corners(transform.from_display(start), transform.from_display(end));

        if rect.width <= MIN_SELECTION_WIDTH || rect.height <= MIN_SELECTION_HEIGHT {
            return Err(EditorError::SelectionTooSmall {
                width: rect.width,
                height: rect.height,
            });
        }

        let colors = sample_colors(base, &rect);
        let region = Region::from_selection(page.regions.next_index(), rect, colors);
        info!(id = %region.id, "staged region from selection");
        Ok(self.pending.insert(region))
    }

    #[must_use]
    pub fn pending(&self) -> Option<&Region> {
        self.pending.as_ref()
    }

    // ------------------------------------------------------------------
    // Region creation and commit
    // ------------------------------------------------------------------

    /// Stages a free-floating text region awaiting its first commit. It
    /// never derives a mask from its glyph geometry.
    pub fn begin_add_text(&mut self, is_vertical: bool) -> Result<&Region, EditorError> {
        let next_index = self.current_page()?.regions.next_index();
        Ok(self
            .pending
            .insert(Region::free_floating(next_index, is_vertical)))
    }

    /// Commits the staged pending region with the dialog's text and style.
    /// Empty text turns the region into a pure cover.
    pub fn commit_pending(&mut self, text: &str, style: EditStyle) -> Result<RegionId, EditorError> {
        self.current_page()?;
        let mut region = self.pending.take().ok_or(EditorError::NoPendingRegion)?;

        apply_style(&mut region, style);
        if text.trim().is_empty() {
            region.text.clear();
            region.is_cover_only = true;
        } else {
            region.text = text.to_string();
            region.is_cover_only = false;
        }
        region.is_edited = true;

        let page = self.current_page_mut()?;
        page.snapshot();
        let id = page.regions.add(region);
        info!(%id, "committed new region");
        Ok(id)
    }

    /// Commits an edit to an existing region: text, style, and the edited
    /// flag, pinning the mask geometry on first commit.
    pub fn commit_edit(
        &mut self,
        id: &RegionId,
        text: &str,
        style: EditStyle,
    ) -> Result<(), EditorError> {
        let page = self.current_page_mut()?;
        if page.regions.find(id).is_none() {
            return Err(EditorError::NoSuchRegion { id: id.to_string() });
        }

        page.snapshot();
        page.regions.update(id, |region| {
            region.text = text.to_string();
            apply_style(region, style);
            region.is_edited = true;
            region.ensure_mask();
        });
        info!(%id, "committed edit");
        Ok(())
    }

    /// Drops a standalone cover patch at `at` (native space) filled with
    /// `color`.
    pub fn add_cover(&mut self, color: Color, at: Coord<f32>) -> Result<RegionId, EditorError> {
        let page = self.current_page_mut()?;
        page.snapshot();
        let region = Region::cover(page.regions.next_index(), color, at);
        let id = page.regions.add(region);
        info!(%id, "added cover region");
        Ok(id)
    }

    /// Deletes a region and renumbers the remaining display indices.
    pub fn delete_region(&mut self, id: &RegionId) -> Result<(), EditorError> {
        let page = self.current_page_mut()?;
        if page.regions.find(id).is_none() {
            return Err(EditorError::NoSuchRegion { id: id.to_string() });
        }

        page.snapshot();
        page.regions.remove(id);
        info!(%id, "deleted region");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Drag / resize / nudge
    // ------------------------------------------------------------------

    /// Starts moving a region's glyph geometry from `point` (viewport
    /// space).
    pub fn begin_drag(&mut self, id: &RegionId, point: Coord<f32>) -> Result<(), EditorError> {
        let origin = self.region_rect(id)?;
        self.interaction = Interaction::Dragging {
            id: id.clone(),
            origin,
            start: point,
            current: point,
        };
        Ok(())
    }

    /// Starts resizing a region from its bottom-right handle at `point`
    /// (viewport space).
    pub fn begin_resize(&mut self, id: &RegionId, point: Coord<f32>) -> Result<(), EditorError> {
        let origin = self.region_rect(id)?;
        self.interaction = Interaction::Resizing {
            id: id.clone(),
            origin,
            start: point,
            current: point,
        };
        Ok(())
    }

    /// Commits the active drag or resize: one history snapshot, then the
    /// final geometry. Returns `false` when there was nothing to commit.
    pub fn commit_interaction(&mut self) -> Result<bool, EditorError> {
        let transform = self.transform()?;

        match std::mem::take(&mut self.interaction) {
            Interaction::Idle => Ok(false),
            Interaction::Selecting { .. } => Err(EditorError::InvalidInteraction),
            Interaction::Dragging {
                id,
                origin,
                start,
                current,
            } => {
                let factor = transform.viewport_factor();
                let dx = (current.x - start.x) / factor;
                let dy = (current.y - start.y) / factor;
                if dx == 0.0 && dy == 0.0 {
                    return Ok(false);
                }

                let page = self.current_page_mut()?;
                page.snapshot();
                page.regions.update(&id, |region| {
                    // The mask stays where it is; only glyph geometry moves.
                    region.rect.x = origin.x + dx;
                    region.rect.y = origin.y + dy;
                });
                Ok(true)
            }
            Interaction::Resizing {
                id,
                origin,
                start,
                current,
            } => {
                // Handle deltas are converted to display space, clamped to
                // the minimum interactive size, then stored in native space.
                let display_dx = (current.x - start.x) / transform.zoom;
                let display_dy = (current.y - start.y) / transform.zoom;

                let display_scale = transform.display_scale;
                let new_display_width =
                    (origin.width * display_scale + display_dx).max(MIN_REGION_WIDTH);
                let new_display_height =
                    (origin.height * display_scale + display_dy).max(MIN_REGION_HEIGHT);

                let page = self.current_page_mut()?;
                page.snapshot();
                page.regions.update(&id, |region| {
                    region.rect.width = new_display_width / display_scale;
                    region.rect.height = new_display_height / display_scale;
                    let extent = if region.is_vertical {
                        region.rect.width
                    } else {
                        region.rect.height
                    };
                    region.font_size = (extent * RESIZE_FONT_FACTOR).round();
                });
                Ok(true)
            }
        }
    }

    /// Nudges a region's glyph geometry by `(dx, dy)` display pixels,
    /// pinning the mask first so the redaction stays put underneath.
    ///
    /// Nudges mutate directly without a history snapshot.
    pub fn nudge(&mut self, id: &RegionId, dx: f32, dy: f32) -> Result<(), EditorError> {
        let display_scale = self.current_page()?.display_scale;
        let page = self.current_page_mut()?;

        if !page.regions.update(id, |region| {
            region.ensure_mask();
            region.rect = region
                .rect
                .translated(dx / display_scale, dy / display_scale);
        }) {
            return Err(EditorError::NoSuchRegion { id: id.to_string() });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Undoes the last committed mutation on the active page.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        Ok(self.current_page_mut()?.undo())
    }

    /// Redoes the last undone mutation on the active page.
    pub fn redo(&mut self) -> Result<bool, EditorError> {
        Ok(self.current_page_mut()?.redo())
    }

    // ------------------------------------------------------------------
    // Recognition intake and export
    // ------------------------------------------------------------------

    /// Seeds the active page's regions from a recognition outcome.
    ///
    /// Recognizer failure, or output with no usable fragment, degrades to a
    /// single fallback region flagged for manual entry; the page is never
    /// left partially populated.
    pub fn ingest_recognition(
        &mut self,
        outcome: Result<Vec<RawFragment>, BackendError>,
    ) -> Result<usize, EditorError> {
        let page = self.current_page_mut()?;

        let fragments = match outcome {
            Ok(raw) => usable_fragments(&raw, page.width, page.height),
            Err(error) => {
                warn!(%error, "text recognition failed");
                Vec::new()
            }
        };

        let regions = if fragments.is_empty() {
            warn!(page = page.number, "no usable fragments; seeding fallback region");
            vec![Region::fallback(page.width, page.height)]
        } else {
            merge_fragments(&fragments)
        };

        let count = regions.len();
        page.regions.replace_all(regions);
        page.is_analyzed = true;
        info!(page = page.number, regions = count, "seeded regions from recognition");
        Ok(count)
    }

    /// Reads the page pixel under a viewport point, e.g. for color picking.
    /// Unlike selection, picking is allowed under magnification.
    pub fn pick_color(
        &self,
        point: Coord<f32>,
        base: &RgbaImage,
    ) -> Result<Color, EditorError> {
        let transform = self.transform()?;
        let native = transform.from_viewport(point);

        let x = (native.x.max(0.0) as u32).min(base.width().saturating_sub(1));
        let y = (native.y.max(0.0) as u32).min(base.height().saturating_sub(1));
        Ok(Color::from(*base.get_pixel(x, y)))
    }

    /// Composites every page at native scale for packaging. `bases` must
    /// hold one base raster per page, in page order.
    pub fn export_pages(
        &self,
        bases: &[RgbaImage],
        compositor: &Compositor,
    ) -> Result<Vec<RgbaImage>, RenderError> {
        self.pages
            .iter()
            .zip(bases)
            .map(|(page, base)| compositor.compose_export(base, page))
            .collect()
    }

    fn region_rect(&self, id: &RegionId) -> Result<Rect, EditorError> {
        self.current_page()?
            .regions
            .find(id)
            .map(|region| region.rect)
            .ok_or_else(|| EditorError::NoSuchRegion { id: id.to_string() })
    }
}

fn apply_style(region: &mut Region, style: EditStyle) {
    region.font_size = style.font_size;
    region.color = style.color;
    region.bg_color = style.bg_color.or(region.bg_color);
    region.is_bold = style.is_bold;
}
