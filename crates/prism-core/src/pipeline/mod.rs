//! Batch transformation pipeline.
//!
//! This module contains all the stages of a batch run:
//! - **discovery**: Enumerate regular files under the source root
//! - **task**: One work item per file, plus destination path rules
//! - **decode**: Load and decode images, honouring EXIF orientation
//! - **metadata**: EXIF orientation extraction
//! - **transform**: Resize and rotate
//! - **encode**: Fixed-setting encoders and destination directory creation
//! - **executor**: Runs a single task end to end
//! - **pool**: Fixed-size worker pool over a shared task queue
//! - **progress**: Counts, elapsed time and ETA
//! - **processor**: Orchestrates a full batch

pub mod decode;
pub mod discovery;
pub mod encode;
pub mod executor;
pub mod metadata;
pub mod pool;
pub mod processor;
pub mod progress;
pub mod task;
pub mod transform;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::FileDiscovery;
pub use encode::{ensure_parent_dir, Encoder};
pub use executor::{transform_bytes, TaskRunner, TransformExecutor};
pub use pool::WorkerPool;
pub use processor::{run_batch, BatchObserver, BatchProcessor, BatchRequest};
pub use progress::{format_duration, Progress};
pub use task::{build_tasks, trim_extension, Task};
