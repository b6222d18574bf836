//! Prism Core - bulk image transformation library.
//!
//! Prism walks a source directory tree, transforms every image it finds
//! (resize, rotate, format conversion) and writes the results into a
//! mirrored destination tree, using a fixed pool of parallel workers.
//!
//! # Architecture
//!
//! ```text
//! Source tree → Enumerate → Tasks → Worker pool (N) → Results → Progress
//!                                     │
//!                     read → decode → resize → rotate → encode → write
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use prism_core::{run_batch, OutputFormat, Rotation, TransformOptions};
//!
//! #[tokio::main]
//! async fn main() -> prism_core::Result<()> {
//!     let options = TransformOptions {
//!         format: OutputFormat::Png,
//!         width: 1024,
//!         height: 0,
//!         rotation: Rotation::Deg0,
//!     };
//!     let summary = run_batch("./photos".as_ref(), "./out".as_ref(), options, 4).await?;
//!     println!("{} converted, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, PrismError, Result, Stage};
pub use pipeline::{
    run_batch, BatchObserver, BatchProcessor, BatchRequest, Progress, Task, TransformExecutor,
};
pub use types::{
    BatchSummary, FailureRecord, OutputFormat, Rotation, TaskResult, TransformOptions,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
