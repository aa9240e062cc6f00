use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No font face loaded for glyph compositing")]
    FontUnavailable,

    #[error("Failed to load font face from {path}")]
    FontLoad { path: String },

    #[error("Failed to encode composited page")]
    Encode {
        #[from]
        source: image::ImageError,
    },
}
