//! vstream - DASH/HLS packaging over ffmpeg
//!
//! Entry point for the command-line tool: parses arguments, sets up logging,
//! loads configuration and drives the encoding workflow.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{error, info, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vstream::cli::{Args, Commands, JobArgs};
use vstream::config::Config;
use vstream::error::VstreamError;
use vstream::job::EncodingRequest;
use vstream::stream::StreamType;
use vstream::workflow::Workflow;

const DEFAULT_CONFIG_FILE: &str = "vstream.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    let config = load_config(args.config.as_deref())?;
    let strict = config.execution.strict;
    let workflow = Workflow::new(config);

    match args.command {
        Commands::Encode { job } => {
            let request = build_request(&job, &workflow)?;
            info!("Encoding video file: {}", request.input_file.display());

            match workflow.encode(request).await {
                Ok(job) => info!("Manifest written to {}", job.output_file().display()),
                Err(e @ VstreamError::ExecutionFailed { .. }) if !strict => {
                    warn!("Transcode failed, continuing (execution.strict = false): {}", e);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Plan { job, json } => {
            let request = build_request(&job, &workflow)?;
            let job = workflow.plan(request).await?;

            if json {
                println!("{}", job.to_json()?);
            } else {
                println!("{}", job.summary());
            }
        }
        Commands::Batch { input_dir, codec, stream_type } => {
            let stream_type = resolve_stream_type(stream_type.as_deref(), &workflow)?;
            let summary = workflow
                .process_directory(&input_dir, stream_type, codec.as_deref())
                .await?;

            println!("Processed {} files, {} failed", summary.succeeded, summary.failed);
            if strict && summary.failed > 0 {
                error!("{} files failed to encode", summary.failed);
                anyhow::bail!("{} of {} files failed", summary.failed, summary.succeeded + summary.failed);
            }
        }
        Commands::InitConfig { path, force } => init_config(&path, force)?,
    }

    info!("vstream completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".vstream").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "vstream.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("vstream.log").display());

    Ok(())
}

/// `--config` first, then `vstream.toml` in the current directory, then defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };
    Ok(config)
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists, use --force to overwrite", path.display());
    }
    Config::default().save_to_file(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn resolve_stream_type(value: Option<&str>, workflow: &Workflow) -> Result<StreamType> {
    match value {
        Some(value) => Ok(value.parse()?),
        None => Ok(workflow.config().encode.default_stream_type),
    }
}

fn build_request(args: &JobArgs, workflow: &Workflow) -> Result<EncodingRequest> {
    let stream_type = resolve_stream_type(args.stream_type.as_deref(), workflow)?;

    let mut request = EncodingRequest::new(&args.input, stream_type);
    if let Some(codec) = &args.codec {
        request = request.with_codec(codec);
    }
    if let Some(output_dir) = &args.output_dir {
        request = request.with_output_dir(output_dir);
    }
    Ok(request)
}
