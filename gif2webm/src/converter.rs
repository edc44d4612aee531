//! GIF → WEBM conversion
//!
//! One GIF becomes one silent VP9 clip whose longer side is
//! `target_side` pixels, capped to `max_seconds` worth of frames.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use sticker_utils::{
    display_name, encode_or_discard, Decoder, EncodeRequest, Encoder, FileSize, ScaleFilter,
    SourceAsset,
};

use crate::config::StickerConfig;

/// Everything the encoder is asked to do for one GIF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionPlan {
    pub source: SourceAsset,
    pub frame_delay_ms: u32,
    /// `delay × frames`, in seconds
    pub nominal_duration_secs: f64,
    pub fps: f64,
    pub trimmed: bool,
    /// `-frames:v` cap
    pub output_frames: u64,
    pub width: u32,
    pub height: u32,
}

/// Freshly encoded clip in the intermediate folder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntermediateClip {
    pub path: PathBuf,
    pub size: FileSize,
    pub width: u32,
    pub height: u32,
    pub trimmed: bool,
}

/// Scales so the larger side becomes `target`, truncating the other side.
/// The ratio `target / side` is taken first, so e.g. 98×49 gives 512×255.
/// Square inputs scale on height.
pub fn scaled_dimensions(width: u32, height: u32, target: u32) -> (u32, u32) {
    let (w, h) = if width > height {
        let h = (height as f64 * (target as f64 / width as f64)) as u32;
        (target, h)
    } else {
        let w = (width as f64 * (target as f64 / height as f64)) as u32;
        (w, target)
    };
    (w.max(1), h.max(1))
}

/// Frame rate and trim decision for a GIF.
///
/// The trim branch keeps the historical formula `max_seconds / total × frames`
/// verbatim, so long GIFs are not guaranteed to replay at their original
/// speed.
pub fn plan_conversion(asset: &SourceAsset, config: &StickerConfig) -> ConversionPlan {
    let delay_ms = asset.delay_or(config.default_frame_delay_ms);
    let frames = asset.frame_count as f64;
    let max_seconds = config.budget.max_seconds;

    let total = delay_ms as f64 * frames / 1000.0;
    let mut fps = (frames / total).min(config.max_fps);
    let trimmed = total > max_seconds;
    if trimmed {
        fps = max_seconds / total * frames;
    }

    let output_frames = (fps * max_seconds).floor() as u64;
    let (width, height) = scaled_dimensions(asset.width, asset.height, config.target_side);

    ConversionPlan {
        source: asset.clone(),
        frame_delay_ms: delay_ms,
        nominal_duration_secs: total,
        fps,
        trimmed,
        output_frames,
        width,
        height,
    }
}

/// `<stem>.webm` inside `dir`.
pub fn output_path_for(source: &Path, dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sticker".to_string());
    dir.join(format!("{}.webm", stem))
}

pub struct Converter<'a> {
    config: &'a StickerConfig,
    decoder: &'a dyn Decoder,
    encoder: &'a dyn Encoder,
}

impl<'a> Converter<'a> {
    pub fn new(config: &'a StickerConfig, decoder: &'a dyn Decoder, encoder: &'a dyn Encoder) -> Self {
        Self {
            config,
            decoder,
            encoder,
        }
    }

    pub fn plan(&self, gif: &Path) -> sticker_utils::Result<ConversionPlan> {
        let asset = self.decoder.read_info(gif)?;
        Ok(plan_conversion(&asset, self.config))
    }

    pub fn convert(&self, gif: &Path, output_dir: &Path) -> sticker_utils::Result<IntermediateClip> {
        let plan = self.plan(gif)?;
        let name = display_name(gif);

        if plan.trimmed {
            warn!(
                file = %name,
                duration_secs = plan.nominal_duration_secs,
                "⚠️  {} exceeds {} seconds. Trimming to {} seconds.",
                name,
                self.config.budget.max_seconds,
                self.config.budget.max_seconds
            );
        }

        let output = output_path_for(gif, output_dir);
        let request = EncodeRequest::new(gif, &output, &self.config.codec, self.config.convert_crf())
            .with_scale(ScaleFilter::lanczos(plan.width, plan.height))
            .with_max_frames(plan.output_frames);

        encode_or_discard(self.encoder, &request)?;
        let size = FileSize::of(&output)?;

        info!(
            file = %name,
            width = plan.width,
            height = plan.height,
            fps = plan.fps,
            frames = plan.output_frames,
            size = size.bytes(),
            "✅ Converted '{}' to '{}'",
            name,
            display_name(&output)
        );

        Ok(IntermediateClip {
            path: output,
            size,
            width: plan.width,
            height: plan.height,
            trimmed: plan.trimmed,
        })
    }
}
