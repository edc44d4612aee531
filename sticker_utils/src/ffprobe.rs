//! FFprobe wrapper module
//!
//! Container duration and stream dimensions for encoded clips. Probe
//! failures are never errors here: callers get `None` and decide how to
//! degrade.

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use crate::logging::log_external_tool;

/// Media probing capability.
pub trait Prober {
    /// Container-level duration in seconds.
    fn probe_duration(&self, path: &Path) -> Option<f64>;

    /// Width and height of the first video stream.
    fn probe_dimensions(&self, path: &Path) -> Option<(u32, u32)>;
}

/// `Prober` backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    program: String,
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl FfprobeProber {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str], path: &Path) -> Option<String> {
        let start = Instant::now();
        let output = Command::new(&self.program)
            .args(args)
            .arg("--")
            .arg(path)
            .output();

        let output = match output {
            Ok(o) => o,
            Err(e) => {
                tracing::warn!(tool = %self.program, error = %e, "Failed to launch probe");
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);
        let path_arg = path.to_string_lossy();
        let mut logged_args: Vec<&str> = args.to_vec();
        logged_args.push(&path_arg);
        log_external_tool(
            &self.program,
            &logged_args,
            if output.status.success() { &stdout } else { &stderr },
            output.status.code(),
            start.elapsed(),
        );

        if !output.status.success() {
            return None;
        }
        Some(stdout)
    }
}

impl Prober for FfprobeProber {
    fn probe_duration(&self, path: &Path) -> Option<f64> {
        let stdout = self.run(
            &[
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ],
            path,
        )?;
        let duration = parse_duration_output(&stdout);
        if duration.is_none() {
            tracing::warn!(file = %path.display(), output = %stdout.trim(), "Could not parse duration");
        }
        duration
    }

    fn probe_dimensions(&self, path: &Path) -> Option<(u32, u32)> {
        let stdout = self.run(
            &[
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height",
                "-of",
                "csv=p=0:s=x",
            ],
            path,
        )?;
        parse_dimensions_output(&stdout)
    }
}

/// Parses `format=duration` output. `N/A`, empty output, negative or
/// non-finite values all count as unknown.
pub fn parse_duration_output(stdout: &str) -> Option<f64> {
    let value: f64 = stdout.lines().next()?.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Parses `WIDTHxHEIGHT` as printed by `-of csv=p=0:s=x`.
pub fn parse_dimensions_output(stdout: &str) -> Option<(u32, u32)> {
    let line = stdout.lines().find(|l| !l.trim().is_empty())?;
    let (w, h) = line.trim().split_once('x')?;
    let width: u32 = w.trim().parse().ok()?;
    let height: u32 = h.trim().trim_end_matches('x').parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}
