//! Batch orchestration: enumerate → build tasks → start pool → submit all
//! → drain every result → summarize.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ConfigError, PrismError, Result};
use crate::types::{BatchSummary, FailureRecord, TaskResult, TransformOptions};

use super::executor::{TaskRunner, TransformExecutor};
use super::pool::WorkerPool;
use super::progress::Progress;
use super::task::build_tasks;

/// One batch invocation.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Directory tree to read images from
    pub source_root: PathBuf,
    /// Directory tree to mirror results into (created on demand)
    pub destination_root: PathBuf,
    /// Transformation applied to every file
    pub options: TransformOptions,
    /// Number of concurrent workers (>= 1)
    pub workers: usize,
}

/// Receives progress updates from the batch driver.
///
/// Every callback runs on the task draining results, one at a time, in
/// arrival order.
pub trait BatchObserver {
    /// Called once the task list is built, before any work starts.
    fn on_start(&mut self, _total: usize) {}

    /// Called after each result has been recorded in `progress`.
    fn on_result(&mut self, _result: &TaskResult, _progress: &Progress) {}

    /// Called after the last result.
    fn on_finish(&mut self, _progress: &Progress) {}
}

impl BatchObserver for () {}

/// Drives a batch from a source tree to a destination tree.
pub struct BatchProcessor<R: TaskRunner = TransformExecutor> {
    runner: Arc<R>,
}

impl BatchProcessor<TransformExecutor> {
    /// Create a batch processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_runner(TransformExecutor::new(config.limits.clone()))
    }
}

impl<R: TaskRunner> BatchProcessor<R> {
    /// Create a batch processor around a custom task runner.
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner: Arc::new(runner),
        }
    }

    /// Run a batch to completion.
    ///
    /// Only setup failures (invalid worker count, unreadable source tree)
    /// are returned as errors. Individual files that fail are logged,
    /// counted, and listed in the summary; the batch carries on.
    pub async fn run<O: BatchObserver>(
        &self,
        request: &BatchRequest,
        observer: &mut O,
    ) -> Result<BatchSummary> {
        if request.workers == 0 {
            return Err(ConfigError::ValidationError("workers must be > 0".into()).into());
        }

        let tasks = build_tasks(
            &request.source_root,
            &request.destination_root,
            request.options,
        )?;
        let total = tasks.len();
        observer.on_start(total);

        if tasks.is_empty() {
            tracing::warn!("No files found under {:?}", request.source_root);
            let progress = Progress::new(0);
            observer.on_finish(&progress);
            return Ok(BatchSummary::default());
        }

        tracing::info!(
            "Transforming {} file(s) from {:?} to {:?} with {} worker(s)",
            total,
            request.source_root,
            request.destination_root,
            request.workers
        );

        let (mut pool, mut results) =
            WorkerPool::start(request.workers, total, self.runner.clone());
        for task in tasks {
            pool.submit(task).await?;
        }
        pool.close();

        let mut progress = Progress::new(total);
        let mut failures = Vec::new();
        for _ in 0..total {
            let Some(result) = results.recv().await else {
                return Err(PrismError::WorkerPool(format!(
                    "result queue closed with {} of {} results outstanding",
                    total - progress.processed(),
                    total
                )));
            };

            match &result.error {
                None => progress.record_success(),
                Some(e) => {
                    progress.record_failure();
                    tracing::error!("Failed: {:?} - {}", result.source_path, e);
                    failures.push(FailureRecord::from_error(e));
                }
            }
            observer.on_result(&result, &progress);
        }
        pool.join().await;
        observer.on_finish(&progress);

        let elapsed = progress.elapsed();
        tracing::info!(
            "Finished {} file(s) in {:?}: {} succeeded, {} failed",
            progress.processed(),
            elapsed,
            progress.succeeded(),
            progress.failed()
        );

        Ok(BatchSummary {
            total,
            succeeded: progress.succeeded(),
            failed: progress.failed(),
            elapsed_ms: elapsed.as_millis() as u64,
            failures,
        })
    }
}

/// Transform every file under `source_root` into `destination_root`.
///
/// Convenience form of [`BatchProcessor::run`] with default limits and no
/// progress observer.
pub async fn run_batch(
    source_root: &Path,
    destination_root: &Path,
    options: TransformOptions,
    workers: usize,
) -> Result<BatchSummary> {
    let request = BatchRequest {
        source_root: source_root.to_path_buf(),
        destination_root: destination_root.to_path_buf(),
        options,
        workers,
    };
    BatchProcessor::new(&Config::default())
        .run(&request, &mut ())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineResult;
    use crate::pipeline::task::Task;
    use crate::types::{OutputFormat, Rotation};
    use image::{DynamicImage, GenericImageView, ImageFormat};

    fn write_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        DynamicImage::new_rgb8(width, height)
            .save_with_format(path, format)
            .unwrap();
    }

    /// Collects every progress line the driver reports.
    #[derive(Default)]
    struct Recorder {
        started: Option<usize>,
        lines: Vec<String>,
        finished: bool,
    }

    impl BatchObserver for Recorder {
        fn on_start(&mut self, total: usize) {
            self.started = Some(total);
        }

        fn on_result(&mut self, _result: &TaskResult, progress: &Progress) {
            self.lines.push(progress.to_string());
        }

        fn on_finish(&mut self, progress: &Progress) {
            assert!(progress.is_complete());
            self.finished = true;
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_convert_rotate_resize_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("source");
        let dst = dir.path().join("destination");
        write_image(&src.join("a.jpg"), 200, 100, ImageFormat::Jpeg);
        write_image(&src.join("sub/b.png"), 400, 300, ImageFormat::Png);

        let request = BatchRequest {
            source_root: src,
            destination_root: dst.clone(),
            options: TransformOptions {
                format: OutputFormat::Png,
                width: 100,
                height: 0,
                rotation: Rotation::Deg90,
            },
            workers: 2,
        };
        let mut recorder = Recorder::default();
        let summary = BatchProcessor::new(&Config::default())
            .run(&request, &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.processed(), 2);
        assert_eq!(summary.failed, 0);
        assert!(summary.failures.is_empty());

        // Resized to width 100 first, then rotated: the axes swap
        let a = image::open(dst.join("a.png")).unwrap();
        assert_eq!(a.dimensions(), (50, 100));
        let b = image::open(dst.join("sub/b.png")).unwrap();
        assert_eq!(b.dimensions(), (75, 100));

        assert_eq!(recorder.started, Some(2));
        assert_eq!(recorder.lines.len(), 2);
        assert!(recorder.lines[1].starts_with("2/2 - failed:0"));
        assert!(recorder.finished);
    }

    #[tokio::test]
    async fn test_undecodable_file_is_counted_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("source");
        let dst = dir.path().join("destination");
        write_image(&src.join("one.png"), 16, 16, ImageFormat::Png);
        write_image(&src.join("two.jpg"), 16, 8, ImageFormat::Jpeg);
        std::fs::write(src.join("broken.jpg"), b"").unwrap();

        let summary = run_batch(&src, &dst, TransformOptions::default(), 1)
            .await
            .unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.processed(), 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].path, src.join("broken.jpg"));
        assert_eq!(summary.failures[0].stage, "decode");
        assert!(summary.failures[0].message.contains("broken.jpg"));
        assert!(dst.join("one.jpeg").is_file());
        assert!(dst.join("two.jpeg").is_file());
    }

    #[tokio::test]
    async fn test_every_task_failing_still_returns_ok() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("source");
        std::fs::create_dir_all(&src).unwrap();
        for name in ["a.txt", "b.txt", "c.txt"] {
            std::fs::write(src.join(name), b"plain text").unwrap();
        }

        let summary = run_batch(&src, &dir.path().join("out"), TransformOptions::default(), 2)
            .await
            .unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.succeeded, 0);
    }

    #[tokio::test]
    async fn test_missing_source_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("destination");
        let mut recorder = Recorder::default();
        let request = BatchRequest {
            source_root: dir.path().join("does-not-exist"),
            destination_root: dst.clone(),
            options: TransformOptions::default(),
            workers: 4,
        };

        let err = BatchProcessor::new(&Config::default())
            .run(&request, &mut recorder)
            .await
            .unwrap_err();

        assert!(matches!(err, PrismError::TaskBuild(_)));
        assert!(!dst.exists());
        assert_eq!(recorder.started, None);
        assert!(recorder.lines.is_empty());
    }

    #[tokio::test]
    async fn test_zero_workers_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_batch(dir.path(), dir.path(), TransformOptions::default(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, PrismError::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("empty");
        std::fs::create_dir_all(&src).unwrap();

        let summary = run_batch(&src, &dir.path().join("out"), TransformOptions::default(), 4)
            .await
            .unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.processed(), 0);
    }

    /// Fails every other file by name, without touching the filesystem.
    struct AlternatingRunner;

    impl TaskRunner for AlternatingRunner {
        fn run(&self, task: &Task) -> PipelineResult<PathBuf> {
            let name = task.relative_path.to_string_lossy();
            let index: usize = name.trim_end_matches(".jpg").parse().unwrap();
            if index % 2 == 0 {
                Ok(task.destination_path())
            } else {
                Err(crate::error::PipelineError::Encode {
                    path: task.source_path(),
                    format: task.options.format.to_string(),
                    message: "odd".to_string(),
                })
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_counts_conserved_for_any_worker_count() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..25 {
            std::fs::write(dir.path().join(format!("{i}.jpg")), b"x").unwrap();
        }
        let processor = BatchProcessor::with_runner(AlternatingRunner);

        for workers in [1, 2, 5, 32] {
            let request = BatchRequest {
                source_root: dir.path().to_path_buf(),
                destination_root: PathBuf::from("/unused"),
                options: TransformOptions::default(),
                workers,
            };
            let summary = processor.run(&request, &mut ()).await.unwrap();
            assert_eq!(summary.total, 25);
            assert_eq!(summary.succeeded + summary.failed, 25);
            assert_eq!(summary.failed, 12);
        }
    }
}
