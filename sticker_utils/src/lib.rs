//! Shared utilities for the gif2webm sticker tool
//!
//! - FFprobe wrapper (`Prober`) for clip duration and dimensions
//! - FFmpeg process management (`Encoder`, `EncodeRequest`)
//! - GIF metadata (`Decoder`, `SourceAsset`)
//! - Batch file collection and counters
//! - Logging, progress bars, external tool detection
//! - Type-safe CRF / file size wrappers

pub mod batch;
pub mod common_utils;
pub mod errors;
pub mod ffmpeg_process;
pub mod ffprobe;
pub mod gif_info;
pub mod logging;
pub mod progress;
pub mod tools;
pub mod types;

pub use batch::{
    collect_all_files, collect_files, BatchResult, StageFailure, GIF_EXTENSIONS, WEBM_EXTENSIONS,
};
pub use common_utils::{display_name, has_extension};
pub use errors::{Result, StickerError};
pub use ffmpeg_process::{encode_or_discard, EncodeRequest, Encoder, FfmpegEncoder, ScaleFilter};
pub use ffprobe::{FfprobeProber, Prober};
pub use gif_info::{Decoder, ImageGifDecoder, SourceAsset, DEFAULT_MAX_PIXELS};
pub use tools::{is_tool_available, require_tools};
pub use types::{Crf, FileSize};
