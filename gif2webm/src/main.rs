use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::{info, Level};

use gif2webm::{plan_conversion, render_human, Pipeline, StickerConfig, StickerError, Toolchain};
use sticker_utils::logging::{init_logging, LogConfig};
use sticker_utils::{require_tools, Decoder, FfmpegEncoder, FfprobeProber, ImageGifDecoder};

#[derive(Parser)]
#[command(name = "gif2webm")]
#[command(version, about = "Batch GIF → WEBM sticker converter (512px, 3s, 256 KiB, silent)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    options: GlobalOptions,
}

#[derive(Args)]
struct GlobalOptions {
    /// JSON config file; flags below override it
    #[arg(long, global = true, value_name = "JSON")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    gif_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    final_dir: Option<PathBuf>,

    /// Root for the two intermediate folders
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    max_kib: Option<u64>,

    #[arg(long, global = true)]
    max_seconds: Option<f64>,

    #[arg(long, global = true)]
    keep_intermediate: bool,

    #[arg(short, long, global = true, default_value = "human")]
    output: OutputFormat,

    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert, fit and collect every GIF (default)
    #[command(name = "run")]
    Run,

    /// Print the conversion plan for one GIF without encoding
    Inspect {
        #[arg(value_name = "GIF")]
        gif: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn build_config(options: &GlobalOptions) -> anyhow::Result<StickerConfig> {
    let mut config = match &options.config {
        Some(path) => StickerConfig::load(path).context("Failed to load config")?,
        None => StickerConfig::default(),
    };

    if let Some(dir) = &options.gif_dir {
        config.gif_dir = dir.clone();
    }
    if let Some(dir) = &options.final_dir {
        config.final_dir = dir.clone();
    }
    if let Some(root) = &options.work_dir {
        let defaults = StickerConfig::default();
        config.webm_dir = root.join(defaults.webm_dir);
        config.optimized_dir = root.join(defaults.optimized_dir);
    }
    if let Some(kib) = options.max_kib {
        config.budget.max_bytes = kib.saturating_mul(1024);
    }
    if let Some(seconds) = options.max_seconds {
        config.budget.max_seconds = seconds;
    }
    if options.keep_intermediate {
        config.keep_intermediate = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let options = cli.options;

    let level = if options.verbose { Level::DEBUG } else { Level::INFO };
    let _ = init_logging("gif2webm", LogConfig::default().with_level(level));

    let config = build_config(&options)?;
    let decoder = ImageGifDecoder::new(config.max_pixels);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            require_tools(&["ffmpeg", "ffprobe"]).context("Missing external tools")?;

            let prober = FfprobeProber::default();
            let encoder = FfmpegEncoder::default();
            let tools = Toolchain {
                prober: &prober,
                decoder: &decoder,
                encoder: &encoder,
            };

            let summary = match Pipeline::new(&config, tools).run() {
                Ok(summary) => summary,
                // already reported; nothing was touched
                Err(StickerError::MissingInput(_)) => return Ok(()),
                Err(e) => return Err(e).context("Batch aborted"),
            };

            match options.output {
                OutputFormat::Human => print!("{}", render_human(&summary)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            }
        }

        Commands::Inspect { gif } => {
            let asset = decoder
                .read_info(&gif)
                .with_context(|| format!("Failed to read {}", gif.display()))?;
            let plan = plan_conversion(&asset, &config);

            match options.output {
                OutputFormat::Human => {
                    info!("🎞️  {}", gif.display());
                    println!("Source:    {}x{}, {} frames", asset.width, asset.height, asset.frame_count);
                    println!(
                        "Delay:     {} ms{}",
                        plan.frame_delay_ms,
                        if asset.frame_delay_ms.is_none() { " (default)" } else { "" }
                    );
                    println!("Duration:  {:.2}s", plan.nominal_duration_secs);
                    println!("Output:    {}x{} @ {:.2} fps, {} frames max", plan.width, plan.height, plan.fps, plan.output_frames);
                    if plan.trimmed {
                        println!("⚠️  Longer than {}s, will be trimmed", config.budget.max_seconds);
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            }
        }
    }

    Ok(())
}
