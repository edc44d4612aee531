//! Size/duration fitting
//!
//! A clip that already meets the budget is copied byte for byte. Otherwise
//! it is re-encoded over a fixed CRF sweep, and if the coarsest CRF is still
//! too large, once more at reduced resolution. The number of encoder runs
//! per clip is therefore bounded by `sweep length + 1`.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use sticker_utils::{
    display_name, encode_or_discard, Crf, EncodeRequest, Encoder, FileSize, Prober, ScaleFilter,
};

use crate::config::StickerConfig;

/// One encoder run inside the fitting loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FitAttempt {
    pub crf: u8,
    pub size: FileSize,
    pub reduced_resolution: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStatus {
    /// Copied without re-encoding
    AlreadyCompliant,
    /// Met the budget during the CRF sweep
    Reencoded,
    /// Met the budget only after the resolution fallback
    ReducedResolution,
    /// Still over budget; the last encode is emitted anyway
    OverBudget,
}

impl FitStatus {
    pub fn met_budget(&self) -> bool {
        !matches!(self, FitStatus::OverBudget)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitOutcome {
    pub output: PathBuf,
    pub status: FitStatus,
    pub source_size: FileSize,
    pub final_size: FileSize,
    pub duration: Option<f64>,
    pub trimmed: bool,
    pub attempts: Vec<FitAttempt>,
}

/// Both sides multiplied by `scale` and truncated, never below 1 px.
pub fn reduced_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let w = (width as f64 * scale) as u32;
    let h = (height as f64 * scale) as u32;
    (w.max(1), h.max(1))
}

pub struct Fitter<'a> {
    config: &'a StickerConfig,
    prober: &'a dyn Prober,
    encoder: &'a dyn Encoder,
}

impl<'a> Fitter<'a> {
    pub fn new(config: &'a StickerConfig, prober: &'a dyn Prober, encoder: &'a dyn Encoder) -> Self {
        Self {
            config,
            prober,
            encoder,
        }
    }

    /// Fits `clip` into `output_dir`, keeping its file name.
    pub fn fit(&self, clip: &Path, output_dir: &Path) -> sticker_utils::Result<FitOutcome> {
        let name = display_name(clip);
        let budget = &self.config.budget;
        let max_size = budget.max_size();

        let source_size = FileSize::of(clip)?;
        let duration = self.prober.probe_duration(clip);
        let output = output_dir.join(clip.file_name().unwrap_or(clip.as_os_str()));

        if budget.allows(source_size, duration) {
            fs::copy(clip, &output)?;
            info!(
                file = %name,
                size = source_size.bytes(),
                duration_secs = ?duration,
                "'{}' is within size and duration limits, copying as is",
                name
            );
            return Ok(FitOutcome {
                output,
                status: FitStatus::AlreadyCompliant,
                source_size,
                final_size: source_size,
                duration,
                trimmed: false,
                attempts: Vec::new(),
            });
        }

        info!(
            file = %name,
            size = source_size.bytes(),
            duration_secs = ?duration,
            max_encodes = self.config.max_fit_attempts(),
            "Optimizing '{}'...",
            name
        );

        let trim = duration
            .filter(|&d| d > budget.max_seconds)
            .map(|_| budget.max_seconds);
        let mut attempts = Vec::new();

        let sweep = self.config.crf_sweep.values();
        for crf in &sweep {
            let request = EncodeRequest::new(clip, &output, &self.config.codec, *crf).with_trim(trim);
            let size = self.encode(&request)?;
            attempts.push(FitAttempt {
                crf: crf.value(),
                size,
                reduced_resolution: false,
            });

            if size.fits_within(max_size) {
                info!(
                    file = %name,
                    crf = crf.value(),
                    size = size.bytes(),
                    ratio = ?size.compression_ratio(source_size),
                    "Successfully optimized '{}' to {}",
                    name,
                    size
                );
                return Ok(self.outcome(output, FitStatus::Reencoded, source_size, size, duration, trim, attempts));
            }
            info!(file = %name, crf = crf.value(), size = size.bytes(), "File size is {} (CRF {}), increasing CRF", size, crf);
        }

        let last_crf = sweep.last().map(Crf::value).unwrap_or(self.config.crf_sweep.end);
        warn!(
            file = %name,
            "⚠️  Could not optimize '{}' below {} with CRF {}. Trying to reduce resolution...",
            name,
            max_size,
            last_crf
        );

        let fallback = self.config.fallback_dimensions;
        let (width, height) = self.prober.probe_dimensions(clip).unwrap_or_else(|| {
            warn!(file = %name, "Could not read clip dimensions, assuming {}x{}", fallback.width, fallback.height);
            (fallback.width, fallback.height)
        });
        let (new_width, new_height) = reduced_dimensions(width, height, self.config.fallback_scale);

        let crf = self.config.fallback_crf();
        let request = EncodeRequest::new(clip, &output, &self.config.codec, crf)
            .with_scale(ScaleFilter::new(new_width, new_height))
            .with_trim(trim);
        let size = self.encode(&request)?;
        attempts.push(FitAttempt {
            crf: crf.value(),
            size,
            reduced_resolution: true,
        });

        if size.fits_within(max_size) {
            info!(
                file = %name,
                width = new_width,
                height = new_height,
                size = size.bytes(),
                "Successfully optimized '{}' to {} by reducing resolution",
                name,
                size
            );
            Ok(self.outcome(output, FitStatus::ReducedResolution, source_size, size, duration, trim, attempts))
        } else {
            error!(
                file = %name,
                size = size.bytes(),
                budget = max_size.bytes(),
                "❌ Could not optimize '{}' below {} even after reducing resolution, keeping best effort",
                name,
                max_size
            );
            Ok(self.outcome(output, FitStatus::OverBudget, source_size, size, duration, trim, attempts))
        }
    }

    /// Runs one encode and measures the result. A failed encode takes its
    /// partial output with it.
    fn encode(&self, request: &EncodeRequest) -> sticker_utils::Result<FileSize> {
        encode_or_discard(self.encoder, request)?;
        Ok(FileSize::of(&request.output)?)
    }

    #[allow(clippy::too_many_arguments)]
    fn outcome(
        &self,
        output: PathBuf,
        status: FitStatus,
        source_size: FileSize,
        final_size: FileSize,
        duration: Option<f64>,
        trim: Option<f64>,
        attempts: Vec<FitAttempt>,
    ) -> FitOutcome {
        FitOutcome {
            output,
            status,
            source_size,
            final_size,
            duration,
            trimmed: trim.is_some(),
            attempts,
        }
    }
}
