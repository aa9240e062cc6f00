use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("No page is active")]
    NoActivePage,

    #[error("No region with id {id}")]
    NoSuchRegion { id: String },

    #[error("Selection {width:.0}x{height:.0} px is below the 20x15 minimum")]
    SelectionTooSmall { width: f32, height: f32 },

    #[error("Zoom was reset to 100%; re-issue the selection")]
    ZoomResetForSelection,

    #[error("No pending region to commit")]
    NoPendingRegion,

    #[error("Interaction state does not allow this operation")]
    InvalidInteraction,
}
