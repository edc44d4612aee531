//! Logging Module
//!
//! Every binary in the workspace logs through `tracing`:
//! - human-readable events on stderr
//! - a daily-rolling file `{program}.YYYY-MM-DD.log` in the temp directory,
//!   pruned to the newest `max_files`
//! - one structured event per ffmpeg/ffprobe run
//!
//! ```no_run
//! use sticker_utils::logging::{LogConfig, init_logging};
//!
//! init_logging("gif2webm", LogConfig::default()).expect("Failed to initialize logging");
//! tracing::info!("🚀 starting batch");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志目录路径（默认为系统临时目录）
    pub log_dir: PathBuf,
    /// 保留的最大日志文件数量
    pub max_files: usize,
    /// Used when `RUST_LOG` is unset
    pub level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::INFO,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    fn appender(&self, program_name: &str) -> Result<RollingFileAppender> {
        std::fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("Failed to create log directory: {:?}", self.log_dir))?;

        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(program_name)
            .filename_suffix("log")
            .max_log_files(self.max_files.max(1))
            .build(&self.log_dir)
            .with_context(|| format!("Failed to open log file in {:?}", self.log_dir))
    }
}

/// 初始化日志系统
///
/// Fails if a global subscriber is already installed; callers that only want
/// best-effort logging can ignore the error.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    let file_appender = config.appender(program_name)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    tracing::debug!(
        program = program_name,
        log_dir = ?config.log_dir,
        max_files = config.max_files,
        level = ?config.level,
        "Logging initialized"
    );
    Ok(())
}

/// 记录外部工具调用
///
/// A clean exit is a debug event with the output at trace level; anything
/// else is an error carrying the trimmed output.
pub fn log_external_tool(
    tool_name: &str,
    args: &[&str],
    output: &str,
    exit_code: Option<i32>,
    duration: Duration,
) {
    let command = format_command(tool_name, args);
    let secs = duration.as_secs_f64();

    if exit_code == Some(0) {
        tracing::debug!(tool = tool_name, command = %command, duration_secs = secs, "{} finished", tool_name);
        tracing::trace!(tool = tool_name, output = %output, "{} output", tool_name);
        return;
    }

    let status = match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "killed by signal".to_string(),
    };
    tracing::error!(
        tool = tool_name,
        command = %command,
        duration_secs = secs,
        exit_code = ?exit_code,
        output = %output.trim(),
        "❌ {} failed ({})",
        tool_name,
        status
    );
}

/// Shell-like rendering of a command line; arguments with spaces are quoted.
fn format_command(tool_name: &str, args: &[&str]) -> String {
    let mut command = tool_name.to_string();
    for arg in args {
        command.push(' ');
        if arg.contains(char::is_whitespace) {
            command.push('\'');
            command.push_str(arg);
            command.push('\'');
        } else {
            command.push_str(arg);
        }
    }
    command
}
