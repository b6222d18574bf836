//! Per-task execution: read → decode → resize → rotate → encode → write.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::TransformOptions;

use super::decode::ImageDecoder;
use super::encode::{ensure_parent_dir, Encoder};
use super::task::Task;
use super::transform::{resize, rotate};

/// Something that can run a task to completion on the calling thread.
///
/// The worker pool only depends on this trait; [`TransformExecutor`] is the
/// production implementation.
pub trait TaskRunner: Send + Sync + 'static {
    /// Run `task` and return the path of the written output.
    fn run(&self, task: &Task) -> PipelineResult<PathBuf>;
}

/// Apply `options` to an encoded image and return the re-encoded bytes.
///
/// `path` is only used for format fallback and error messages.
pub fn transform_bytes(
    bytes: &[u8],
    options: &TransformOptions,
    path: &Path,
) -> PipelineResult<Vec<u8>> {
    let start = Instant::now();
    let decoded = ImageDecoder::decode_bytes(bytes, path)?;
    tracing::trace!("  Decode: {:?}", start.elapsed());

    let resize_start = Instant::now();
    let image = resize(decoded.image, options.width, options.height, path)?;
    tracing::trace!("  Resize: {:?}", resize_start.elapsed());

    let image = rotate(image, options.rotation);

    let encode_start = Instant::now();
    let encoded = Encoder::encode(&image, options.format, path)?;
    tracing::trace!("  Encode: {:?}", encode_start.elapsed());

    Ok(encoded)
}

/// Runs tasks against the filesystem.
pub struct TransformExecutor {
    limits: LimitsConfig,
}

impl TransformExecutor {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Read the source file, enforcing the size limit.
    fn read_source(&self, path: &Path) -> PipelineResult<Vec<u8>> {
        let read_error = |e: std::io::Error| PipelineError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let metadata = std::fs::metadata(path).map_err(read_error)?;
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        std::fs::read(path).map_err(read_error)
    }
}

impl Default for TransformExecutor {
    fn default() -> Self {
        Self::new(LimitsConfig::default())
    }
}

impl TaskRunner for TransformExecutor {
    fn run(&self, task: &Task) -> PipelineResult<PathBuf> {
        let start = Instant::now();
        let source = task.source_path();
        tracing::debug!("Processing: {:?}", source);

        let bytes = self.read_source(&source)?;
        let encoded = transform_bytes(&bytes, &task.options, &source)?;

        let destination = task.destination_path();
        ensure_parent_dir(&destination).map_err(|e| PipelineError::CreateDir {
            path: source.clone(),
            dir: destination
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            message: e.to_string(),
        })?;
        std::fs::write(&destination, encoded).map_err(|e| PipelineError::Write {
            path: source.clone(),
            destination: destination.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            "Processed {:?} -> {:?} in {:?}",
            task.relative_path,
            destination,
            start.elapsed()
        );
        Ok(destination)
    }
}
