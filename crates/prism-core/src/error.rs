//! Error types for the Prism batch pipeline.
//!
//! Setup errors (`PrismError`, `ConfigError`) abort a run before any work is
//! done. Per-task errors (`PipelineError`) are scoped to one file: they name
//! the failing stage and the source path, and are counted rather than
//! propagated.

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for Prism operations.
#[derive(Error, Debug)]
pub enum PrismError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The source tree could not be enumerated
    #[error("Failed to list files under {root}: {source}")]
    Discovery {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Building the task list failed
    #[error("Failed to create tasks: {0}")]
    TaskBuild(#[source] Box<PrismError>),

    /// The worker pool stopped before every task reported back
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// The transform stage a per-task error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Decode,
    Resize,
    Encode,
    CreateDir,
    Write,
    Worker,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Read => "read",
            Stage::Decode => "decode",
            Stage::Resize => "resize",
            Stage::Encode => "encode",
            Stage::CreateDir => "create-dir",
            Stage::Write => "write",
            Stage::Worker => "worker",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-task errors, organized by stage. `path` is always the source file.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading the source file failed
    #[error("Read error for {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Input format could not be determined
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Geometric resize failed
    #[error("Resize error for {path}: {message}")]
    Resize { path: PathBuf, message: String },

    /// Encoding to the output format failed
    #[error("Encode error for {path} ({format}): {message}")]
    Encode {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Destination directory could not be created
    #[error("Cannot create directory {dir} for {path}: {message}")]
    CreateDir {
        path: PathBuf,
        dir: PathBuf,
        message: String,
    },

    /// Writing the encoded output failed
    #[error("Write error for {path} -> {destination}: {message}")]
    Write {
        path: PathBuf,
        destination: PathBuf,
        message: String,
    },

    /// The worker running the transform panicked
    #[error("Worker error for {path}: {message}")]
    Worker { path: PathBuf, message: String },
}

impl PipelineError {
    /// The stage this error was raised in.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Read { .. } | PipelineError::FileTooLarge { .. } => Stage::Read,
            PipelineError::Decode { .. } | PipelineError::UnsupportedFormat { .. } => {
                Stage::Decode
            }
            PipelineError::Resize { .. } => Stage::Resize,
            PipelineError::Encode { .. } => Stage::Encode,
            PipelineError::CreateDir { .. } => Stage::CreateDir,
            PipelineError::Write { .. } => Stage::Write,
            PipelineError::Worker { .. } => Stage::Worker,
        }
    }

    /// The source file the failing task was working on.
    pub fn path(&self) -> &Path {
        match self {
            PipelineError::Read { path, .. }
            | PipelineError::FileTooLarge { path, .. }
            | PipelineError::Decode { path, .. }
            | PipelineError::UnsupportedFormat { path, .. }
            | PipelineError::Resize { path, .. }
            | PipelineError::Encode { path, .. }
            | PipelineError::CreateDir { path, .. }
            | PipelineError::Write { path, .. }
            | PipelineError::Worker { path, .. } => path,
        }
    }
}

/// Convenience type alias for Prism results.
pub type Result<T> = std::result::Result<T, PrismError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
