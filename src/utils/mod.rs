pub mod color;
pub mod config;
pub mod error;

pub use color::{sample_colors, Color, SampledColors};
pub use config::AppConfig;
pub use error::{ColorError, ConfigError};
