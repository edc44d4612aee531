//! Sticker pipeline configuration
//!
//! Folder layout and every budget/encoder constant live here so tests can
//! shrink budgets and point folders at temp directories.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use sticker_utils::types::{Crf, FileSize, VP9_CRF_MAX};
use sticker_utils::{StickerError, DEFAULT_MAX_PIXELS};

/// Size and duration ceilings for a finished sticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budget {
    pub max_bytes: u64,
    pub max_seconds: f64,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_bytes: 256 * 1024,
            max_seconds: 3.0,
        }
    }
}

impl Budget {
    pub fn max_size(&self) -> FileSize {
        FileSize::new(self.max_bytes)
    }

    /// Unknown duration never violates the budget.
    pub fn allows(&self, size: FileSize, duration: Option<f64>) -> bool {
        size.fits_within(self.max_size()) && duration.map_or(true, |d| d <= self.max_seconds)
    }
}

/// Linear CRF sweep used by the fitter: `start, start+step, ..., end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrfSweep {
    pub start: u8,
    pub end: u8,
    pub step: u8,
}

impl Default for CrfSweep {
    fn default() -> Self {
        Self {
            start: 30,
            end: 50,
            step: 5,
        }
    }
}

impl CrfSweep {
    /// The finite list of CRF values to try, in order.
    pub fn values(&self) -> Vec<Crf> {
        let mut values = Vec::new();
        let Ok(mut current) = Crf::new(self.start as i64) else {
            return values;
        };
        if self.step == 0 || self.start > self.end {
            return values;
        }
        loop {
            if current.value() > self.end {
                break;
            }
            values.push(current);
            match current.step_up(self.step) {
                Some(next) => current = next,
                None => break,
            }
        }
        values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerConfig {
    /// Input GIFs
    pub gif_dir: PathBuf,
    /// Raw converted clips, removed at the end of a run
    pub webm_dir: PathBuf,
    /// Fitted clips, removed at the end of a run
    pub optimized_dir: PathBuf,
    /// Accepted stickers
    pub final_dir: PathBuf,
    pub budget: Budget,
    /// Length of the longer output side in pixels
    pub target_side: u32,
    pub max_fps: f64,
    /// Used when a GIF carries no frame delay
    pub default_frame_delay_ms: u32,
    /// CRF of the first (near-lossless) conversion
    pub convert_crf: u8,
    pub codec: String,
    pub crf_sweep: CrfSweep,
    /// Per-axis factor of the single resolution fallback
    pub fallback_scale: f64,
    pub fallback_crf: u8,
    /// Clip size assumed when probing dimensions fails
    pub fallback_dimensions: Dimensions,
    pub max_pixels: u64,
    /// Leave intermediate folders in place after the run
    pub keep_intermediate: bool,
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            gif_dir: PathBuf::from("gifs"),
            webm_dir: PathBuf::from("webm_stickers"),
            optimized_dir: PathBuf::from("webm_stickers_optimized"),
            final_dir: PathBuf::from("finished"),
            budget: Budget::default(),
            target_side: 512,
            max_fps: 30.0,
            default_frame_delay_ms: 100,
            convert_crf: 10,
            codec: "libvpx-vp9".to_string(),
            crf_sweep: CrfSweep::default(),
            fallback_scale: 0.8,
            fallback_crf: 35,
            fallback_dimensions: Dimensions {
                width: 512,
                height: 512,
            },
            max_pixels: DEFAULT_MAX_PIXELS,
            keep_intermediate: false,
        }
    }
}

impl StickerConfig {
    /// Default configuration with all four folders placed under `root`.
    pub fn rooted_at(root: &Path) -> Self {
        let defaults = Self::default();
        Self {
            gif_dir: root.join(&defaults.gif_dir),
            webm_dir: root.join(&defaults.webm_dir),
            optimized_dir: root.join(&defaults.optimized_dir),
            final_dir: root.join(&defaults.final_dir),
            ..defaults
        }
    }

    /// Reads a JSON config file; absent fields keep their defaults.
    pub fn load(path: &Path) -> sticker_utils::Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            StickerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| StickerError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> sticker_utils::Result<()> {
        let fail = |msg: String| Err(StickerError::Config(msg));

        if self.budget.max_bytes == 0 {
            return fail("budget.max_bytes must be greater than 0".to_string());
        }
        if !(self.budget.max_seconds > 0.0 && self.budget.max_seconds.is_finite()) {
            return fail(format!(
                "budget.max_seconds must be a positive number, got {}",
                self.budget.max_seconds
            ));
        }
        if self.target_side == 0 {
            return fail("target_side must be greater than 0".to_string());
        }
        if !(self.max_fps > 0.0 && self.max_fps.is_finite()) {
            return fail(format!("max_fps must be positive, got {}", self.max_fps));
        }
        if self.default_frame_delay_ms == 0 {
            return fail("default_frame_delay_ms must be greater than 0".to_string());
        }
        if self.crf_sweep.step == 0 || self.crf_sweep.start > self.crf_sweep.end {
            return fail(format!(
                "crf_sweep must satisfy start <= end and step > 0, got {:?}",
                self.crf_sweep
            ));
        }
        for (name, value) in [
            ("crf_sweep.start", self.crf_sweep.start),
            ("crf_sweep.end", self.crf_sweep.end),
            ("convert_crf", self.convert_crf),
            ("fallback_crf", self.fallback_crf),
        ] {
            if value > VP9_CRF_MAX {
                return fail(format!("{} must be <= {}, got {}", name, VP9_CRF_MAX, value));
            }
        }
        if !(self.fallback_scale > 0.0 && self.fallback_scale <= 1.0) {
            return fail(format!(
                "fallback_scale must be in (0, 1], got {}",
                self.fallback_scale
            ));
        }
        if self.fallback_dimensions.width == 0 || self.fallback_dimensions.height == 0 {
            return fail("fallback_dimensions must be non-zero".to_string());
        }
        if self.max_pixels == 0 {
            return fail("max_pixels must be greater than 0".to_string());
        }
        if self.codec.trim().is_empty() {
            return fail("codec must not be empty".to_string());
        }
        Ok(())
    }

    pub fn convert_crf(&self) -> Crf {
        Crf::clamped(self.convert_crf as i64)
    }

    pub fn fallback_crf(&self) -> Crf {
        Crf::clamped(self.fallback_crf as i64)
    }

    /// Upper bound on encoder runs the fitter may spend on one clip.
    pub fn max_fit_attempts(&self) -> u32 {
        self.crf_sweep.values().len() as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn values(sweep: CrfSweep) -> Vec<u8> {
        sweep.values().iter().map(|c| c.value()).collect()
    }

    #[test]
    fn test_default_sweep_is_30_to_50_by_5() {
        assert_eq!(values(CrfSweep::default()), vec![30, 35, 40, 45, 50]);
    }

    #[test]
    fn test_sweep_end_not_on_step() {
        let sweep = CrfSweep {
            start: 30,
            end: 42,
            step: 5,
        };
        assert_eq!(values(sweep), vec![30, 35, 40]);
    }

    #[test]
    fn test_sweep_degenerate() {
        assert!(values(CrfSweep { start: 40, end: 30, step: 5 }).is_empty());
        assert!(values(CrfSweep { start: 30, end: 50, step: 0 }).is_empty());
        assert_eq!(values(CrfSweep { start: 63, end: 63, step: 5 }), vec![63]);
        assert_eq!(values(CrfSweep { start: 60, end: 70, step: 5 }), vec![60]);
    }

    #[test]
    fn test_default_limits() {
        let config = StickerConfig::default();
        assert_eq!(config.budget.max_bytes, 262_144);
        assert_eq!(config.budget.max_seconds, 3.0);
        assert_eq!(config.target_side, 512);
        assert_eq!(config.max_fit_attempts(), 6);
        assert_eq!(config.gif_dir, PathBuf::from("gifs"));
        assert_eq!(config.final_dir, PathBuf::from("finished"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_budget_allows() {
        let budget = Budget::default();
        assert!(budget.allows(FileSize::new(262_144), Some(3.0)));
        assert!(budget.allows(FileSize::new(1), None));
        assert!(!budget.allows(FileSize::new(262_145), None));
        assert!(!budget.allows(FileSize::new(10), Some(3.01)));
    }

    #[test]
    fn test_rooted_at() {
        let config = StickerConfig::rooted_at(Path::new("/tmp/run"));
        assert_eq!(config.gif_dir, PathBuf::from("/tmp/run/gifs"));
        assert_eq!(config.webm_dir, PathBuf::from("/tmp/run/webm_stickers"));
        assert_eq!(
            config.optimized_dir,
            PathBuf::from("/tmp/run/webm_stickers_optimized")
        );
        assert_eq!(config.final_dir, PathBuf::from("/tmp/run/finished"));
    }

    #[test]
    fn test_load_partial_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sticker.json");
        std::fs::write(
            &path,
            r#"{ "budget": { "max_bytes": 1000 }, "crf_sweep": { "step": 10 }, "gif_dir": "in" }"#,
        )
        .unwrap();

        let config = StickerConfig::load(&path).unwrap();
        assert_eq!(config.budget.max_bytes, 1000);
        assert_eq!(config.budget.max_seconds, 3.0);
        assert_eq!(values(config.crf_sweep), vec![30, 40, 50]);
        assert_eq!(config.gif_dir, PathBuf::from("in"));
        assert_eq!(config.final_dir, PathBuf::from("finished"));
    }

    #[test]
    fn test_load_errors_are_config_errors() {
        let dir = TempDir::new().unwrap();
        let missing = StickerConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, StickerError::Config(_)));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let broken = StickerConfig::load(&path).unwrap_err();
        assert!(matches!(broken, StickerError::Config(_)));
        assert!(broken.is_fatal());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = StickerConfig::default();
        config.budget.max_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = StickerConfig::default();
        config.crf_sweep.start = 55;
        assert!(config.validate().is_err());

        let mut config = StickerConfig::default();
        config.crf_sweep.end = 70;
        assert!(config.validate().is_err());

        let mut config = StickerConfig::default();
        config.fallback_scale = 1.5;
        assert!(config.validate().is_err());

        let mut config = StickerConfig::default();
        config.budget.max_seconds = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = StickerConfig::default();
        config.target_side = 0;
        assert!(config.validate().is_err());

        let mut config = StickerConfig::default();
        config.max_pixels = 0;
        match config.validate() {
            Err(StickerError::Config(msg)) => assert!(msg.contains("max_pixels")),
            other => panic!("expected Config error, got {:?}", other),
        }
    }
}
