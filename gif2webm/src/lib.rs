//! gif2webm - batch GIF → WEBM sticker conversion
//!
//! Produces silent VP9 WEBM clips whose longer side is 512 px, that run at
//! most 3 seconds and weigh at most 256 KiB.
//!
//! ```rust,ignore
//! use gif2webm::{Pipeline, StickerConfig, Toolchain};
//! use sticker_utils::{FfmpegEncoder, FfprobeProber, ImageGifDecoder};
//!
//! let config = StickerConfig::default();
//! let (prober, decoder, encoder) = (FfprobeProber::default(), ImageGifDecoder::default(), FfmpegEncoder::default());
//! let tools = Toolchain { prober: &prober, decoder: &decoder, encoder: &encoder };
//! let summary = Pipeline::new(&config, tools).run()?;
//! ```

pub mod config;
pub mod converter;
pub mod fitter;
pub mod pipeline;
pub mod report;

#[cfg(test)]
mod test_support;

pub use config::{Budget, CrfSweep, Dimensions, StickerConfig};
pub use converter::{plan_conversion, scaled_dimensions, ConversionPlan, Converter, IntermediateClip};
pub use fitter::{FitAttempt, FitOutcome, FitStatus, Fitter};
pub use pipeline::{BatchSummary, FileOutcome, FileReport, Pipeline, Toolchain};
pub use report::render_human;

pub use sticker_utils::{Result, StickerError};
