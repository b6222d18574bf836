//! Fixed-size worker pool: N workers on a shared task queue, one shared
//! result queue.
//!
//! Both queues are sized by the caller (the batch driver sizes them to the
//! task count, so neither submission nor result delivery ever waits for
//! capacity). Workers share the input receiver behind a mutex: whichever
//! worker holds the lock takes the next task, so each task is delivered to
//! exactly one worker.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::{PipelineError, PrismError, Result};
use crate::types::TaskResult;

use super::executor::TaskRunner;
use super::task::Task;

/// A running pool of workers.
pub struct WorkerPool {
    sender: Option<mpsc::Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `workers` workers with queues of `capacity` slots.
    ///
    /// Returns the pool and the receiving end of the result queue. The
    /// result queue closes once every worker has exited.
    pub fn start<R: TaskRunner>(
        workers: usize,
        capacity: usize,
        runner: Arc<R>,
    ) -> (Self, mpsc::Receiver<TaskResult>) {
        let capacity = capacity.max(1);
        let (task_tx, task_rx) = mpsc::channel::<Task>(capacity);
        let (result_tx, result_rx) = mpsc::channel::<TaskResult>(capacity);
        let queue = Arc::new(Mutex::new(task_rx));

        let handles = (0..workers)
            .map(|id| {
                let queue = queue.clone();
                let results = result_tx.clone();
                let runner = runner.clone();
                tokio::spawn(worker(id, queue, results, runner))
            })
            .collect();

        tracing::debug!("Started {} worker(s), queue capacity {}", workers, capacity);
        (
            Self {
                sender: Some(task_tx),
                workers: handles,
            },
            result_rx,
        )
    }

    /// Number of workers in the pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a task for the next free worker.
    pub async fn submit(&self, task: Task) -> Result<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| PrismError::WorkerPool("submit after close".to_string()))?;
        sender
            .send(task)
            .await
            .map_err(|_| PrismError::WorkerPool("all workers have exited".to_string()))
    }

    /// Signal that no more tasks will be submitted. Workers drain what is
    /// queued and then exit.
    pub fn close(&mut self) {
        self.sender = None;
    }

    /// Close the queue and wait for every worker to exit.
    pub async fn join(mut self) {
        self.close();
        for handle in self.workers {
            if let Err(e) = handle.await {
                tracing::error!("Worker task panicked: {e}");
            }
        }
    }
}

/// Worker loop: take one task, run it, report exactly one result.
async fn worker<R: TaskRunner>(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<Task>>>,
    results: mpsc::Sender<TaskResult>,
    runner: Arc<R>,
) {
    loop {
        let task = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };
        let Some(task) = task else {
            break;
        };

        let source_path = task.source_path();
        let runner = runner.clone();
        let outcome = match tokio::task::spawn_blocking(move || runner.run(&task)).await {
            Ok(outcome) => outcome,
            Err(e) => Err(PipelineError::Worker {
                path: source_path.clone(),
                message: format!("Task join error: {}", e),
            }),
        };

        let result = TaskResult::from_outcome(source_path, outcome);
        if results.send(result).await.is_err() {
            // Collector went away, nobody is left to report to
            tracing::warn!("Worker {id}: result queue closed, stopping");
            break;
        }
    }
    tracing::trace!("Worker {id} exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineResult;
    use crate::types::TransformOptions;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Records every task it runs; fails tasks whose name starts with "bad".
    #[derive(Default)]
    struct RecordingRunner {
        seen: StdMutex<HashMap<PathBuf, usize>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    impl TaskRunner for RecordingRunner {
        fn run(&self, task: &Task) -> PipelineResult<PathBuf> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));
            *self
                .seen
                .lock()
                .unwrap()
                .entry(task.relative_path.clone())
                .or_default() += 1;
            self.active.fetch_sub(1, Ordering::SeqCst);

            if task.relative_path.to_string_lossy().starts_with("bad") {
                return Err(PipelineError::Decode {
                    path: task.source_path(),
                    message: "bad input".to_string(),
                });
            }
            Ok(task.destination_path())
        }
    }

    struct PanickingRunner;

    impl TaskRunner for PanickingRunner {
        fn run(&self, _task: &Task) -> PipelineResult<PathBuf> {
            panic!("codec blew up");
        }
    }

    fn tasks(names: &[&str]) -> Vec<Task> {
        names
            .iter()
            .map(|name| Task {
                source_root: PathBuf::from("/in"),
                destination_root: PathBuf::from("/out"),
                relative_path: PathBuf::from(name),
                options: TransformOptions::default(),
            })
            .collect()
    }

    async fn run_all<R: TaskRunner>(
        workers: usize,
        batch: Vec<Task>,
        runner: Arc<R>,
    ) -> Vec<TaskResult> {
        let count = batch.len();
        let (pool, mut results) = WorkerPool::start(workers, count, runner);
        assert_eq!(pool.size(), workers);
        for task in batch {
            pool.submit(task).await.unwrap();
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(results.recv().await.unwrap());
        }
        pool.join().await;
        out
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_task_runs_exactly_once() {
        let names: Vec<String> = (0..40).map(|i| format!("img{i}.jpg")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let runner = Arc::new(RecordingRunner::default());

        for workers in [1, 3, 8] {
            runner.seen.lock().unwrap().clear();
            let results = run_all(workers, tasks(&refs), runner.clone()).await;
            assert_eq!(results.len(), 40);
            assert!(results.iter().all(|r| r.success));

            let seen = runner.seen.lock().unwrap();
            assert_eq!(seen.len(), 40);
            assert!(seen.values().all(|&n| n == 1));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_bounded_by_worker_count() {
        let names: Vec<String> = (0..24).map(|i| format!("img{i}.jpg")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let runner = Arc::new(RecordingRunner::default());

        run_all(2, tasks(&refs), runner.clone()).await;
        let max = runner.max_active.load(Ordering::SeqCst);
        assert!(max >= 1 && max <= 2, "max active was {max}");
    }

    #[tokio::test]
    async fn test_failures_are_reported_not_fatal() {
        let runner = Arc::new(RecordingRunner::default());
        let results = run_all(2, tasks(&["a.jpg", "bad.jpg", "c.jpg"]), runner).await;

        let failed: Vec<_> = results.iter().filter(|r| !r.success).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].source_path, PathBuf::from("/in/bad.jpg"));
        assert!(failed[0].error.is_some());
    }

    #[tokio::test]
    async fn test_panic_becomes_worker_error() {
        let results = run_all(1, tasks(&["a.jpg", "b.jpg"]), Arc::new(PanickingRunner)).await;
        assert_eq!(results.len(), 2);
        for result in results {
            assert!(!result.success);
            let err = result.error.unwrap();
            assert_eq!(err.stage(), crate::error::Stage::Worker);
        }
    }

    #[tokio::test]
    async fn test_results_close_after_join() {
        let runner = Arc::new(RecordingRunner::default());
        let (pool, mut results) = WorkerPool::start(3, 1, runner);
        pool.submit(tasks(&["a.jpg"]).remove(0)).await.unwrap();
        assert!(results.recv().await.is_some());
        pool.join().await;
        assert!(results.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_submit_after_close_fails() {
        let runner = Arc::new(RecordingRunner::default());
        let (mut pool, _results) = WorkerPool::start(1, 1, runner);
        pool.close();
        let err = pool.submit(tasks(&["a.jpg"]).remove(0)).await.unwrap_err();
        assert!(matches!(err, PrismError::WorkerPool(_)));
        pool.join().await;
    }
}
