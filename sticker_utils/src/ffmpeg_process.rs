//! FFmpeg 进程管理模块
//!
//! The encode capability used by the converter and the fitter. An
//! `EncodeRequest` describes one ffmpeg run; `FfmpegEncoder` executes it
//! through `FfmpegProcess`, which drains stderr on its own thread so a
//! verbose encoder can never fill the pipe and stall.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, warn};

use crate::errors::StickerError;
use crate::logging::log_external_tool;
use crate::types::Crf;

/// Lines of encoder stderr kept in an `Encode` error.
const STDERR_TAIL_LINES: usize = 20;

/// Encode capability.
pub trait Encoder {
    fn encode(&self, request: &EncodeRequest) -> crate::Result<()>;
}

/// Output scaling for an encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFilter {
    pub width: u32,
    pub height: u32,
    pub lanczos: bool,
}

impl ScaleFilter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            lanczos: false,
        }
    }

    pub fn lanczos(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            lanczos: true,
        }
    }

    pub fn to_filter_arg(&self) -> String {
        if self.lanczos {
            format!("scale={}:{}:flags=lanczos", self.width, self.height)
        } else {
            format!("scale={}:{}", self.width, self.height)
        }
    }
}

/// One silent, constant-quality encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    /// ffmpeg encoder name, e.g. `libvpx-vp9`
    pub codec: String,
    pub crf: Crf,
    pub scale: Option<ScaleFilter>,
    /// `-frames:v` cap
    pub max_frames: Option<u64>,
    /// `-t` output duration cap in seconds
    pub trim_seconds: Option<f64>,
}

impl EncodeRequest {
    pub fn new(input: &Path, output: &Path, codec: &str, crf: Crf) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            codec: codec.to_string(),
            crf,
            scale: None,
            max_frames: None,
            trim_seconds: None,
        }
    }

    pub fn with_scale(mut self, scale: ScaleFilter) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn with_trim(mut self, seconds: Option<f64>) -> Self {
        self.trim_seconds = seconds;
        self
    }

    /// Arguments placed between the input and the output path. Bitrate is
    /// pinned to 0 so the codec runs in pure CRF mode; audio is always
    /// dropped.
    pub fn option_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(t) = self.trim_seconds {
            args.push("-t".to_string());
            args.push(format!("{}", t));
        }
        if let Some(scale) = self.scale {
            args.push("-vf".to_string());
            args.push(scale.to_filter_arg());
        }
        args.extend([
            "-c:v".to_string(),
            self.codec.clone(),
            "-b:v".to_string(),
            "0".to_string(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-an".to_string(),
        ]);
        if let Some(frames) = self.max_frames {
            args.push("-frames:v".to_string());
            args.push(frames.to_string());
        }
        args
    }

    /// Full ffmpeg argument vector.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-hide_banner".into(), "-i".into()];
        args.push(self.input.clone().into_os_string());
        args.extend(self.option_args().into_iter().map(OsString::from));
        args.push(self.output.clone().into_os_string());
        args
    }
}

/// FFmpeg 进程包装器 - 自动处理 stderr 消耗，防止管道死锁
pub struct FfmpegProcess {
    child: Child,
    stderr_thread: Option<JoinHandle<String>>,
}

impl FfmpegProcess {
    pub fn spawn(cmd: &mut Command) -> Result<Self> {
        debug!(command = ?cmd, "Executing FFmpeg command");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().context("Failed to spawn FFmpeg process")?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow::anyhow!("Failed to capture FFmpeg stderr"))?;

        let stderr_thread = thread::spawn(move || {
            let mut buf = String::new();
            let reader = BufReader::new(stderr);
            for line in reader.lines().map_while(|l| l.ok()) {
                buf.push_str(&line);
                buf.push('\n');
            }
            buf
        });

        Ok(Self {
            child,
            stderr_thread: Some(stderr_thread),
        })
    }

    /// (ExitStatus, stderr_content)
    pub fn wait_with_output(mut self) -> Result<(ExitStatus, String)> {
        let status = self.child.wait().context("Failed to wait for FFmpeg")?;
        let stderr = self
            .stderr_thread
            .take()
            .map(|t| t.join().unwrap_or_default())
            .unwrap_or_default();
        Ok((status, stderr))
    }
}

/// `Encoder` backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: String,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(&self, request: &EncodeRequest) -> crate::Result<()> {
        let args = request.to_args();
        let start = Instant::now();

        let mut cmd = Command::new(&self.program);
        cmd.args(&args);

        let process = FfmpegProcess::spawn(&mut cmd).map_err(|e| {
            match e.downcast_ref::<std::io::Error>() {
                Some(io) if io.kind() == std::io::ErrorKind::NotFound => {
                    StickerError::ToolNotFound(self.program.clone())
                }
                _ => StickerError::Encode {
                    path: request.input.clone(),
                    exit_code: None,
                    stderr: format!("{:#}", e),
                },
            }
        })?;

        let (status, stderr) = process.wait_with_output().map_err(|e| StickerError::Encode {
            path: request.input.clone(),
            exit_code: None,
            stderr: format!("{:#}", e),
        })?;

        let logged: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        let logged: Vec<&str> = logged.iter().map(String::as_str).collect();
        log_external_tool(&self.program, &logged, &stderr, status.code(), start.elapsed());

        if !status.success() {
            return Err(StickerError::Encode {
                path: request.input.clone(),
                exit_code: status.code(),
                stderr: stderr_tail(&stderr, STDERR_TAIL_LINES),
            });
        }
        Ok(())
    }
}

/// Runs one encode; if it fails, whatever the encoder left at the output
/// path is deleted before the error is returned.
pub fn encode_or_discard(encoder: &dyn Encoder, request: &EncodeRequest) -> crate::Result<()> {
    let result = encoder.encode(request);
    if result.is_err() && request.output.exists() {
        if let Err(e) = std::fs::remove_file(&request.output) {
            warn!(file = %request.output.display(), error = %e, "⚠️  Failed to remove partial output");
        }
    }
    result
}

/// Last `lines` non-empty lines of `stderr`.
pub fn stderr_tail(stderr: &str, lines: usize) -> String {
    let kept: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = kept.len().saturating_sub(lines);
    kept[start..].join("\n")
}
