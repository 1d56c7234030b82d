//! `splice` binary: one subcommand per pipeline stage.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use splice_media::{check_ffmpeg, check_ffprobe, FfmpegTranscoder, FfprobeProbe};
use splice_models::{AssembleRequest, JobRequest, SegmentWorkItem};
use splice_pipeline::{Assembler, PipelineConfig, Planner, SegmentTranscoder};
use splice_storage::S3Store;

#[derive(Parser)]
#[command(name = "splice")]
#[command(about = "Parallel HLS transcoding pipeline stages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the source and emit a partition plan
    Plan(IoArgs),
    /// Transcode one segment work item and emit its result
    Transcode(IoArgs),
    /// Reassemble grouped results into a playlist and emit a summary
    Assemble(IoArgs),
    /// Verify the work dir, external tools, and required environment
    Selfcheck,
}

#[derive(Args)]
struct IoArgs {
    /// Input JSON document, or `-` for stdin
    #[arg(short, long)]
    input: String,

    /// Output path, or `-` for stdout
    #[arg(short, long, default_value = "-")]
    output: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env();

    match cli.command {
        Command::Plan(io) => {
            let request: JobRequest = read_input(&io.input)?;
            let store = S3Store::from_env().await?;
            let planner = Planner::new(config, FfprobeProbe::new(), store);
            let plan = planner.plan(request).await?;
            write_output(&io.output, &plan)?;
        }
        Command::Transcode(io) => {
            let item: SegmentWorkItem = read_input(&io.input)?;
            let store = S3Store::from_env().await?;
            let transcoder = FfmpegTranscoder::new(config.scale_height);
            let stage = SegmentTranscoder::new(config, transcoder, store);
            let result = stage.transcode(item).await?;
            write_output(&io.output, &result)?;
        }
        Command::Assemble(io) => {
            let request: AssembleRequest = read_input(&io.input)?;
            let store = S3Store::from_env().await?;
            let assembler = Assembler::new(config, store);
            let summary = assembler.assemble(request).await?;
            write_output(&io.output, &summary)?;
        }
        Command::Selfcheck => {
            selfcheck(&config).await?;
        }
    }

    Ok(())
}

/// Initialize tracing with colored output for dev, JSON for production.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("splice=info".parse().expect("static directive"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }
}

fn read_input<T: DeserializeOwned>(input: &str) -> anyhow::Result<T> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input))?
    };

    serde_json::from_str(&text).context("parsing input JSON")
}

fn write_output<T: Serialize>(output: &str, value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    if output == "-" {
        println!("{}", text);
    } else {
        std::fs::write(output, text).with_context(|| format!("writing {}", output))?;
    }
    Ok(())
}

/// Verify everything a stage invocation needs before any job runs.
async fn selfcheck(config: &PipelineConfig) -> anyhow::Result<()> {
    info!("Selfcheck starting with work_dir={}", config.work_dir);

    ensure_workdir(&config.work_dir).await?;

    let ffmpeg = check_ffmpeg().context("ffmpeg not available")?;
    let ffprobe = check_ffprobe().context("ffprobe not available")?;
    info!("Found ffmpeg at {}", ffmpeg.display());
    info!("Found ffprobe at {}", ffprobe.display());

    ensure_env_present(&["MEDIA_BUCKET"])?;

    info!("Selfcheck ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("creating work dir {}", path.display()))?;

    let probe_file = path.join(".splice-selfcheck");
    tokio::fs::write(&probe_file, b"ok")
        .await
        .with_context(|| format!("work dir {} is not writable", path.display()))?;
    tokio::fs::remove_file(&probe_file).await.ok();
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            anyhow::bail!("missing required env var {}", var);
        }
    }
    Ok(())
}
