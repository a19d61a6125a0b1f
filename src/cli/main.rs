//! Batch Background Removal CLI Tool
//!
//! Command-line interface for driving the batch engine over a folder of
//! images: point at an input folder, get back a folder of transparent PNGs.

use crate::{
    config::{BatchJob, ResizeSpec},
    controller::{BatchController, CancellationToken},
    removal::LumaKeyRemover,
    services::{
        ConsoleErrorCollector, ItemProgressBarSink, JsonProgressSink, PlatformOpener, ProgressSink,
    },
    tracing_config::{TracingConfig, TracingFormat},
    types::BatchReport,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Batch background removal CLI tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "bgbatch")]
pub struct Cli {
    /// Input directory containing images (.png, .jpg, .jpeg)
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Output directory for transparent PNGs (created if absent)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Resize outputs to exactly WIDTHxHEIGHT, e.g. 500x500
    #[arg(short, long, value_name = "WIDTHxHEIGHT")]
    pub resize: Option<String>,

    /// Luminance threshold for the built-in matte remover (0-255)
    #[arg(long, default_value_t = 240)]
    pub threshold: u8,

    /// Emit progress as JSON event lines instead of a progress bar
    #[arg(long)]
    pub json: bool,

    /// Write the final report as JSON to the given path
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Open the output folder in the platform file browser on success
    #[arg(long)]
    pub open: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    TracingConfig::new()
        .with_verbosity(cli.verbose)
        .with_format(TracingFormat::Console)
        .init()
        .context("Failed to initialize tracing")?;

    let resize = cli
        .resize
        .as_deref()
        .map(parse_resize)
        .transpose()
        .context("Invalid --resize value")?;

    let mut builder = BatchJob::builder()
        .input_dir(&cli.input_dir)
        .output_dir(&cli.output_dir);
    if let Some(spec) = resize {
        builder = builder.resize(spec.width, spec.height);
    }
    let job = builder.build().context("Invalid job")?;

    info!(
        "Input: {}, Output: {}{}",
        cli.input_dir.display(),
        cli.output_dir.display(),
        job.resize.map_or_else(String::new, |r| format!(", Resize: {r}"))
    );

    let progress: Arc<dyn ProgressSink> = if cli.json {
        Arc::new(JsonProgressSink)
    } else {
        Arc::new(ItemProgressBarSink::new())
    };

    let mut controller = BatchController::new(Arc::new(LumaKeyRemover::new(cli.threshold)))
        .with_progress_sink(progress)
        .with_error_collector(Arc::new(ConsoleErrorCollector));
    if cli.open {
        controller = controller.with_folder_opener(Arc::new(PlatformOpener));
    }

    let token = CancellationToken::new();
    let handle = controller.start_with_token(job, token.clone())?;

    // Ctrl-C requests cooperative cancellation; the in-flight item finishes
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancellation requested, stopping after the current image");
            token.cancel();
        }
    });

    let report = handle.join().await?;
    print_summary(&report);

    if let Some(path) = &cli.report_json {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create report file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report).context("Failed to write report")?;
        info!("Report written to {}", path.display());
    }

    if report.total > 0 && report.succeeded == 0 && !report.cancelled {
        anyhow::bail!("all {} image(s) failed to process", report.total);
    }
    Ok(())
}

fn print_summary(report: &BatchReport) {
    if report.total == 0 {
        warn!("No images found in the input folder");
        return;
    }

    info!(
        "Processed {}/{} image(s), {} failed, {} skipped{}",
        report.succeeded,
        report.total,
        report.failed(),
        report.skipped(),
        if report.cancelled { " (cancelled)" } else { "" }
    );
    for task in &report.failed_tasks {
        error!(
            " - {}: {}",
            task.source_path.display(),
            task.error.as_deref().unwrap_or("unknown error")
        );
    }
}

/// Parse a `WIDTHxHEIGHT` string into a validated resize spec
fn parse_resize(value: &str) -> Result<ResizeSpec> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .context("expected WIDTHxHEIGHT, e.g. 500x500")?;
    let width: u32 = w
        .trim()
        .parse()
        .with_context(|| format!("width '{w}' must be a positive integer"))?;
    let height: u32 = h
        .trim()
        .parse()
        .with_context(|| format!("height '{h}' must be a positive integer"))?;
    ResizeSpec::new(width, height).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resize_accepts_both_separators() {
        assert_eq!(parse_resize("500x500").unwrap(), ResizeSpec { width: 500, height: 500 });
        assert_eq!(parse_resize("120X80").unwrap(), ResizeSpec { width: 120, height: 80 });
        assert_eq!(parse_resize(" 64 x 32 ").unwrap(), ResizeSpec { width: 64, height: 32 });
    }

    #[test]
    fn test_parse_resize_rejects_bad_values() {
        assert!(parse_resize("500").is_err(), "missing separator");
        assert!(parse_resize("-1x500").is_err(), "negative width");
        assert!(parse_resize("axb").is_err(), "non-numeric");
        assert!(parse_resize("0x500").is_err(), "zero dimension");
    }

    #[test]
    fn test_cli_parses_minimal_invocation() {
        use clap::Parser;
        let cli = Cli::parse_from(["bgbatch", "in", "out"]);
        assert_eq!(cli.input_dir, PathBuf::from("in"));
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert!(cli.resize.is_none());
        assert_eq!(cli.threshold, 240);
        assert!(!cli.open);
    }
}
