pub mod backend;
pub mod editor;
pub mod geometry;
pub mod page;
pub mod render;
pub mod utils;

pub use backend::{
    collapse_cjk_spaces, usable_fragments, BackendError, DocumentPackager, PageRasterizer,
    RawFragment, RasterPage, TextRecognizer,
};
pub use editor::{EditStyle, Editor, EditorError};
pub use geometry::{Rect, ViewTransform};
pub use page::{
    merge_fragments, Fragment, History, MaskGeometry, Page, Region, RegionId, RegionStore,
};
pub use render::{Compositor, RenderError};
pub use utils::{AppConfig, Color};
