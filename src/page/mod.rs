pub mod history;
pub mod merge;
pub mod region;
pub mod store;

pub use history::History;
pub use merge::{merge_fragments, Fragment};
pub use region::{MaskGeometry, Region, RegionId};
pub use store::RegionStore;

use serde::{Deserialize, Serialize};

/// One rasterized document page and its editable regions.
///
/// All region geometry is stored in this page's native pixel space, which
/// is `scale` times the source document's unit space. `display_scale` maps
/// native space onto the on-screen canvas and is recomputed on layout.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based page number within the document.
    pub number: u32,
    /// Native page width, in page-space pixels.
    pub width: f32,
    /// Native page height, in page-space pixels.
    pub height: f32,
    /// Rasterization factor: page-space pixels per document unit.
    pub scale: f32,
    /// Native-space to display-space factor, recomputed on layout.
    pub display_scale: f32,
    pub regions: RegionStore,
    /// Manual editing has started on this page.
    pub is_analyzed: bool,
    #[serde(skip)]
    pub history: History,
}

impl Page {
    #[must_use]
    pub fn new(number: u32, width: f32, height: f32, scale: f32) -> Self {
        Self {
            number,
            width,
            height,
            scale,
            display_scale: 1.0,
            regions: RegionStore::new(),
            is_analyzed: false,
            history: History::new(),
        }
    }

    /// Fits the page into a container of the given width and records the
    /// resulting display scale. Pages narrower than the container render at
    /// 1:1 rather than being upscaled.
    pub fn fit_display_scale(&mut self, container_width: f32) -> f32 {
        self.display_scale = (container_width / self.width).min(1.0);
        self.display_scale
    }

    /// Records the current region list as the state to return to on undo.
    pub fn snapshot(&mut self) {
        let current = self.regions.snapshot();
        self.history.snapshot(&current);
    }

    /// Steps the region list back once. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let current = self.regions.snapshot();
        match self.history.undo(&current) {
            Some(previous) => {
                self.regions.replace_all(previous);
                true
            }
            None => false,
        }
    }

    /// Steps the region list forward once. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        let current = self.regions.snapshot();
        match self.history.redo(&current) {
            Some(next) => {
                self.regions.replace_all(next);
                true
            }
            None => false,
        }
    }
}
