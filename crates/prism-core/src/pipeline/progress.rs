//! Batch progress: success/failure counts against a known total, with
//! elapsed time and a linear ETA.
//!
//! `Progress` has no interior synchronization. Its mutators take `&mut self`
//! and the batch driver owns the only instance, so all updates happen on
//! the single task draining the result queue. Sharing it with workers would
//! require wrapping it (or switching the counters to atomics).

use std::fmt;
use std::time::{Duration, Instant};

/// Live progress of one batch.
#[derive(Debug, Clone)]
pub struct Progress {
    total: usize,
    succeeded: usize,
    failed: usize,
    started: Instant,
}

impl Progress {
    /// Start tracking a batch of `total` items from now.
    pub fn new(total: usize) -> Self {
        Self::starting_at(total, Instant::now())
    }

    /// Start tracking a batch with an explicit start time.
    pub fn starting_at(total: usize, started: Instant) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            started,
        }
    }

    pub fn record_success(&mut self) {
        debug_assert!(self.processed() < self.total, "more results than tasks");
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        debug_assert!(self.processed() < self.total, "more results than tasks");
        self.failed += 1;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Items that have reported back, successfully or not.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// True once every item has reported back.
    pub fn is_complete(&self) -> bool {
        self.processed() == self.total
    }

    /// Time since the batch started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Estimated time remaining given `elapsed`.
    ///
    /// Linear extrapolation from the average time per processed item:
    /// `(total - processed) * elapsed / processed`. Returns `None` until at
    /// least one item has been processed, since there is no rate yet.
    pub fn eta_at(&self, elapsed: Duration) -> Option<Duration> {
        let processed = self.processed();
        if processed == 0 {
            return None;
        }
        let remaining = self.total.saturating_sub(processed);
        let per_item = elapsed.as_secs_f64() / processed as f64;
        Some(Duration::from_secs_f64(per_item * remaining as f64))
    }

    /// Estimated time remaining as of now.
    pub fn eta(&self) -> Option<Duration> {
        self.eta_at(self.elapsed())
    }
}

/// `processed/total - failed:F ETA:duration`
impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} - failed:{} ETA:",
            self.processed(),
            self.total,
            self.failed
        )?;
        match self.eta() {
            Some(eta) => f.write_str(&format_duration(eta)),
            None => f.write_str("--"),
        }
    }
}

/// Compact duration format: `850ms`, `12.4s`, `3m07s`, `1h02m03s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h{:02}m{:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else if secs >= 1 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut progress = Progress::new(3);
        progress.record_success();
        progress.record_failure();
        assert_eq!(progress.succeeded(), 1);
        assert_eq!(progress.failed(), 1);
        assert_eq!(progress.processed(), 2);
        assert!(!progress.is_complete());
        progress.record_success();
        assert!(progress.is_complete());
    }

    #[test]
    fn test_eta_linear_extrapolation() {
        let mut progress = Progress::new(10);
        for _ in 0..5 {
            progress.record_success();
        }
        assert_eq!(
            progress.eta_at(Duration::from_secs(10)),
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_eta_counts_failures_as_processed() {
        let mut progress = Progress::new(4);
        progress.record_failure();
        assert_eq!(
            progress.eta_at(Duration::from_secs(2)),
            Some(Duration::from_secs(6))
        );
    }

    #[test]
    fn test_eta_undefined_before_first_item() {
        let progress = Progress::new(10);
        assert_eq!(progress.eta_at(Duration::from_secs(10)), None);
        assert_eq!(progress.eta(), None);
    }

    #[test]
    fn test_eta_zero_when_complete() {
        let mut progress = Progress::new(1);
        progress.record_success();
        assert_eq!(progress.eta_at(Duration::from_secs(3)), Some(Duration::ZERO));
    }

    #[test]
    fn test_elapsed_uses_start_time() {
        let started = Instant::now()
            .checked_sub(Duration::from_secs(10))
            .unwrap();
        let progress = Progress::starting_at(10, started);
        assert!(progress.elapsed() >= Duration::from_secs(10));
    }

    #[test]
    fn test_display_before_first_item() {
        let progress = Progress::new(7);
        assert_eq!(progress.to_string(), "0/7 - failed:0 ETA:--");
    }

    #[test]
    fn test_display_format() {
        let mut progress = Progress::new(4);
        progress.record_success();
        progress.record_failure();
        let line = progress.to_string();
        assert!(line.starts_with("2/4 - failed:1 ETA:"), "{line}");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(850)), "850ms");
        assert_eq!(format_duration(Duration::from_millis(12_400)), "12.4s");
        assert_eq!(format_duration(Duration::from_secs(187)), "3m07s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h02m03s");
    }
}
