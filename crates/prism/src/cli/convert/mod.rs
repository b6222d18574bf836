//! The `prism convert` command for bulk transformation.

mod progress;
pub mod types;

pub use types::FormatArg;

use anyhow::Context;
use clap::Args;
use prism_core::{BatchProcessor, BatchRequest, Config, ConfigError, Rotation};
use std::path::{Path, PathBuf};

use progress::{print_summary, ProgressReporter};
use types::parse_rotation;

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source folder
    #[arg(long, value_name = "DIR")]
    pub from: PathBuf,

    /// Destination folder (created on demand)
    #[arg(long, value_name = "DIR")]
    pub to: PathBuf,

    /// Set width of all images to `width`, preserving aspect ratio if no height is given
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Set height of all images to `height`, preserving aspect ratio if no width is given
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Convert transformed images to `format` [default: from config, else jpeg]
    #[arg(short = 'F', long, value_enum)]
    pub format: Option<FormatArg>,

    /// Rotate all images counter-clockwise by `rotation` degrees (0, 90, 180, 270)
    #[arg(short = 'R', long, value_parser = parse_rotation)]
    pub rotation: Option<Rotation>,

    /// Number of parallel workers [default: from config, else 4]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Write a JSON summary with every failed file to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Execute the convert command.
///
/// A config file that failed to load is fatal: nothing is read or written.
pub async fn execute(
    args: ConvertArgs,
    config: Result<Config, ConfigError>,
) -> anyhow::Result<()> {
    let config = config.with_context(|| {
        format!(
            "Invalid config file {} (run `prism config check`)",
            Config::default_path().display()
        )
    })?;
    let request = build_request(&args, &config);
    tracing::debug!("Batch request: {:?}", request);

    let processor = BatchProcessor::new(&config);
    let mut reporter = ProgressReporter::new(!args.no_progress);
    let summary = processor
        .run(&request, &mut reporter)
        .await
        .with_context(|| {
            format!(
                "Failed to run transformations from {}",
                request.source_root.display()
            )
        })?;

    print_summary(&summary);

    if let Some(report) = &args.report {
        let report = expand_path(report);
        summary
            .write_report(&report)
            .with_context(|| format!("Failed to write report to {}", report.display()))?;
        tracing::info!("Report written to {:?}", report);
    }

    Ok(())
}

/// Merge CLI flags over the config file's defaults.
fn build_request(args: &ConvertArgs, config: &Config) -> BatchRequest {
    let mut options = config.transform;
    if let Some(format) = args.format {
        options.format = format.into();
    }
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    if let Some(rotation) = args.rotation {
        options.rotation = rotation;
    }

    BatchRequest {
        source_root: expand_path(&args.from),
        destination_root: expand_path(&args.to),
        options,
        workers: args.workers.unwrap_or(config.processing.parallel_workers),
    }
}

/// Expand a leading `~` in a user-supplied path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
