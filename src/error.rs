/// Build failure taxonomy: configuration errors, per-item errors, capacity
/// errors and cancellation. The pipeline returns these without logging;
/// presentation belongs to the composing layer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid font name provided")]
    InvalidFont,

    #[error("both fonts and images are disabled, nothing to do")]
    NoSources,

    #[error("grid alignment does not support multi texturing")]
    GridMultiTexture,

    #[error("invalid character set: {0}")]
    UnknownCharSet(String),

    #[error("unknown property: {0}")]
    UnknownProperty(String),

    #[error("invalid value for {name}: {value}")]
    InvalidProperty { name: String, value: String },

    #[error("font not found: {0}")]
    FontNotFound(String),

    #[error("error loading font: {0}")]
    FontLoad(String),

    #[error("image too large for sheet: {}", .0.display())]
    ImageTooLarge(PathBuf),

    #[error("error reading image {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("error writing image {}: {source}", .path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image path does not contain any png images: {}", .0.display())]
    NoImagesFound(PathBuf),

    #[error("unable to fit {glyphs} glyphs on a single {max_size}x{max_size} texture ({pages} page(s) started)")]
    CanvasFull {
        glyphs: usize,
        pages: usize,
        max_size: i32,
    },

    #[error("unable to fit {glyphs} glyphs on a single {max_size}x{max_size} grid")]
    GridFull { glyphs: usize, max_size: i32 },

    #[error("no glyphs specified, nothing to do")]
    NoGlyphs,

    #[error("output name not specified")]
    NoOutput,

    #[error("build cancelled")]
    Cancelled,

    #[error("error reading project file {}: {source}", .path.display())]
    Project {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("error writing atlas data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Cancellation is a distinct outcome, not a failure; callers usually
    /// branch on it before reporting an error.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
