//! Terminal progress rendering and the end-of-run summary.

use indicatif::{ProgressBar, ProgressStyle};
use prism_core::pipeline::format_duration;
use prism_core::{BatchObserver, BatchSummary, Progress, TaskResult};
use std::time::Duration;

/// Maximum number of failed files listed in the summary.
const MAX_LISTED_FAILURES: usize = 20;

/// Renders batch progress as a single, continuously overwritten bar.
pub struct ProgressReporter {
    enabled: bool,
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, bar: None }
    }
}

impl BatchObserver for ProgressReporter {
    fn on_start(&mut self, total: usize) {
        if self.enabled && total > 0 {
            self.bar = Some(create_progress_bar(total as u64));
        }
    }

    fn on_result(&mut self, _result: &TaskResult, progress: &Progress) {
        if let Some(bar) = &self.bar {
            bar.set_position(progress.processed() as u64);
            bar.set_message(progress.to_string());
        }
    }

    fn on_finish(&mut self, _progress: &Progress) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message(format!("0/{total} - failed:0 ETA:--"));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Images per second over the whole run.
fn rate(summary: &BatchSummary) -> f64 {
    let secs = summary.elapsed_ms as f64 / 1000.0;
    if secs > 0.0 {
        summary.processed() as f64 / secs
    } else {
        0.0
    }
}

/// Print a formatted summary table after batch processing.
pub fn print_summary(summary: &BatchSummary) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.total);
    eprintln!(
        "    Duration:     {:>8}",
        format_duration(Duration::from_millis(summary.elapsed_ms))
    );
    eprintln!("    Rate:         {:>7.1} img/sec", rate(summary));
    eprintln!("  ====================================");

    if !summary.failures.is_empty() {
        eprintln!();
        eprintln!("  Failed files:");
        for failure in summary.failures.iter().take(MAX_LISTED_FAILURES) {
            eprintln!("    [{}] {}", failure.stage, failure.path.display());
        }
        if summary.failures.len() > MAX_LISTED_FAILURES {
            eprintln!(
                "    ... and {} more (use --report for the full list)",
                summary.failures.len() - MAX_LISTED_FAILURES
            );
        }
    }
}
