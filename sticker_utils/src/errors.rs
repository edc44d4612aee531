use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StickerError {
    #[error("Input folder not found: {0}")]
    MissingInput(PathBuf),

    #[error("Failed to decode '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Image '{path}' is too large: {pixels} pixels exceeds limit of {limit}")]
    ImageTooLarge {
        path: PathBuf,
        pixels: u64,
        limit: u64,
    },

    #[error("No frames found in '{0}'")]
    NoFrames(PathBuf),

    #[error("Encoder failed for '{path}' (exit code: {exit_code:?}): {stderr}")]
    Encode {
        path: PathBuf,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StickerError {
    /// Only a missing input folder or a broken configuration stops a batch;
    /// everything else is scoped to the asset that raised it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StickerError::MissingInput(_) | StickerError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, StickerError>;
