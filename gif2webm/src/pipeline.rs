//! Batch orchestration
//!
//! gifs/ → convert → webm_stickers/ → fit → webm_stickers_optimized/ →
//! move → finished/, then the two intermediate folders are removed. Each
//! stage finishes for every file before the next one starts.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

use sticker_utils::progress::stage_bar;
use sticker_utils::{
    collect_all_files, collect_files, display_name, BatchResult, Decoder, Encoder, FileSize,
    Prober, StickerError, GIF_EXTENSIONS, WEBM_EXTENSIONS,
};

use crate::config::StickerConfig;
use crate::converter::Converter;
use crate::fitter::{FitAttempt, FitStatus, Fitter};

/// The three external capabilities the pipeline drives.
#[derive(Clone, Copy)]
pub struct Toolchain<'a> {
    pub prober: &'a dyn Prober,
    pub decoder: &'a dyn Decoder,
    pub encoder: &'a dyn Encoder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FileOutcome {
    ConvertFailed {
        error: String,
    },
    FitFailed {
        error: String,
    },
    Fitted {
        status: FitStatus,
        size: FileSize,
        attempts: Vec<FitAttempt>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub gifs_found: usize,
    pub conversion: BatchResult,
    pub fitting: BatchResult,
    pub already_compliant: usize,
    pub reencoded: usize,
    pub reduced_resolution: usize,
    pub over_budget: usize,
    pub moved: usize,
    pub move_failures: usize,
    pub cleanup_ok: bool,
    pub final_dir: PathBuf,
    pub elapsed_secs: f64,
    pub files: Vec<FileReport>,
}

impl BatchSummary {
    fn new(final_dir: &Path) -> Self {
        Self {
            gifs_found: 0,
            conversion: BatchResult::new(),
            fitting: BatchResult::new(),
            already_compliant: 0,
            reencoded: 0,
            reduced_resolution: 0,
            over_budget: 0,
            moved: 0,
            move_failures: 0,
            cleanup_ok: true,
            final_dir: final_dir.to_path_buf(),
            elapsed_secs: 0.0,
            files: Vec::new(),
        }
    }

    fn record_fit(&mut self, status: FitStatus) {
        match status {
            FitStatus::AlreadyCompliant => self.already_compliant += 1,
            FitStatus::Reencoded => self.reencoded += 1,
            FitStatus::ReducedResolution => self.reduced_resolution += 1,
            FitStatus::OverBudget => self.over_budget += 1,
        }
    }
}

pub struct Pipeline<'a> {
    config: &'a StickerConfig,
    tools: Toolchain<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a StickerConfig, tools: Toolchain<'a>) -> Self {
        Self { config, tools }
    }

    /// Runs the whole batch. Only a missing input folder or a failure to
    /// create the working folders is returned as an error; per-file failures
    /// end up in the summary.
    pub fn run(&self) -> sticker_utils::Result<BatchSummary> {
        let start = Instant::now();
        let config = self.config;

        if !config.gif_dir.is_dir() {
            error!(
                "❌ You need to create a '{}' folder and put your GIF files inside it.",
                config.gif_dir.display()
            );
            return Err(StickerError::MissingInput(config.gif_dir.clone()));
        }

        for dir in [&config.webm_dir, &config.optimized_dir, &config.final_dir] {
            fs::create_dir_all(dir)?;
        }

        let mut summary = BatchSummary::new(&config.final_dir);

        self.convert_all(&mut summary);
        self.fit_all(&mut summary);
        self.move_to_final(&mut summary);

        if config.keep_intermediate {
            info!("Keeping intermediate folders");
        } else {
            summary.cleanup_ok = remove_intermediate(&[&config.webm_dir, &config.optimized_dir]);
        }

        summary.elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            "🎉 All done! Check the '{}' folder for the optimized stickers.",
            config.final_dir.display()
        );
        Ok(summary)
    }

    fn convert_all(&self, summary: &mut BatchSummary) {
        let gifs = collect_files(&self.config.gif_dir, GIF_EXTENSIONS);
        summary.gifs_found = gifs.len();
        info!("📂 Found {} GIF files to convert", gifs.len());

        let converter = Converter::new(self.config, self.tools.decoder, self.tools.encoder);
        let bar = stage_bar(gifs.len() as u64, "convert");
        for gif in &gifs {
            let name = display_name(gif);
            bar.set_message(name.clone());
            match converter.convert(gif, &self.config.webm_dir) {
                Ok(_) => summary.conversion.success(),
                Err(e) => {
                    error!(file = %name, error = %e, "❌ Error processing {}: {}", name, e);
                    summary.conversion.fail(gif, &e);
                    summary.files.push(FileReport {
                        name,
                        outcome: FileOutcome::ConvertFailed {
                            error: e.to_string(),
                        },
                    });
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();
    }

    fn fit_all(&self, summary: &mut BatchSummary) {
        let clips = collect_files(&self.config.webm_dir, WEBM_EXTENSIONS);
        let fitter = Fitter::new(self.config, self.tools.prober, self.tools.encoder);
        let bar = stage_bar(clips.len() as u64, "fit");

        for clip in &clips {
            let name = display_name(clip);
            bar.set_message(name.clone());
            match fitter.fit(clip, &self.config.optimized_dir) {
                Ok(outcome) => {
                    summary.fitting.success();
                    summary.record_fit(outcome.status);
                    summary.files.push(FileReport {
                        name,
                        outcome: FileOutcome::Fitted {
                            status: outcome.status,
                            size: outcome.final_size,
                            attempts: outcome.attempts,
                        },
                    });
                }
                Err(e) => {
                    error!(file = %name, error = %e, "❌ Error optimizing {}: {}", name, e);
                    summary.fitting.fail(clip, &e);
                    summary.files.push(FileReport {
                        name,
                        outcome: FileOutcome::FitFailed {
                            error: e.to_string(),
                        },
                    });
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();
    }

    fn move_to_final(&self, summary: &mut BatchSummary) {
        for source in collect_all_files(&self.config.optimized_dir) {
            let Some(file_name) = source.file_name() else {
                continue;
            };
            let destination = self.config.final_dir.join(file_name);
            match move_file(&source, &destination) {
                Ok(()) => summary.moved += 1,
                Err(e) => {
                    error!(file = %display_name(&source), error = %e, "❌ Failed to move into final folder");
                    summary.move_failures += 1;
                }
            }
        }
    }
}

/// Rename, falling back to copy + delete across file systems.
fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }
}

fn remove_intermediate(dirs: &[&PathBuf]) -> bool {
    let mut ok = true;
    for dir in dirs {
        if !dir.exists() {
            continue;
        }
        if let Err(e) = fs::remove_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "⚠️  Error deleting folder {}: {}", dir.display(), e);
            ok = false;
        }
    }
    if ok {
        info!(
            "🧹 Deleted intermediate folders: {}",
            dirs.iter()
                .map(|d| format!("'{}'", d.display()))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_move_file_renames() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.webm");
        let dst = dir.path().join("b.webm");
        fs::write(&src, b"clip").unwrap();

        move_file(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"clip");
    }

    #[test]
    fn test_remove_intermediate_ignores_missing() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("webm_stickers");
        let missing = dir.path().join("webm_stickers_optimized");
        fs::create_dir(&present).unwrap();
        fs::write(present.join("x.webm"), b"x").unwrap();

        assert!(remove_intermediate(&[&present, &missing]));
        assert!(!present.exists());
    }

    #[test]
    fn test_summary_records_fit_status() {
        let mut summary = BatchSummary::new(Path::new("finished"));
        summary.record_fit(FitStatus::AlreadyCompliant);
        summary.record_fit(FitStatus::OverBudget);
        summary.record_fit(FitStatus::OverBudget);
        assert_eq!(summary.already_compliant, 1);
        assert_eq!(summary.over_budget, 2);
        assert_eq!(summary.reencoded, 0);
    }
}
