//! Core data types for the Prism batch pipeline.
//!
//! The option types are closed enumerations: anything outside the supported
//! set is rejected when it is parsed, so the pipeline never sees an invalid
//! format or rotation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConfigError, PipelineError};

/// Output codecs Prism can encode to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
    Tiff,
    Gif,
}

impl OutputFormat {
    /// All supported output formats.
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Jpeg,
        OutputFormat::Png,
        OutputFormat::Webp,
        OutputFormat::Tiff,
        OutputFormat::Gif,
    ];

    /// File extension written for this format (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Gif => "gif",
        }
    }

    /// The matching `image` crate format.
    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Webp => image::ImageFormat::WebP,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
            OutputFormat::Gif => image::ImageFormat::Gif,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            "gif" => Ok(OutputFormat::Gif),
            other => Err(ConfigError::ValidationError(format!(
                "{other} is not a valid format (expected one of: jpeg, png, webp, tiff, gif)"
            ))),
        }
    }
}

/// Counter-clockwise rotation in multiples of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl TryFrom<u32> for Rotation {
    type Error = ConfigError;

    fn try_from(degrees: u32) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(ConfigError::ValidationError(format!(
                "{other}deg is not a valid rotation (expected 0, 90, 180 or 270)"
            ))),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}deg", self.degrees())
    }
}

/// Transformation applied to every file in a batch.
///
/// A zero `width` or `height` leaves that axis unconstrained; both zero
/// disables resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Output codec
    pub format: OutputFormat,

    /// Target width in pixels (0 = derive from height)
    pub width: u32,

    /// Target height in pixels (0 = derive from width)
    pub height: u32,

    /// Counter-clockwise rotation applied after resizing
    pub rotation: Rotation,
}

impl TransformOptions {
    /// Whether any resize is requested.
    pub fn resizes(&self) -> bool {
        self.width > 0 || self.height > 0
    }
}

/// Outcome of running one task. Exactly one is produced per task.
#[derive(Debug)]
pub struct TaskResult {
    /// Whether the task completed every stage
    pub success: bool,

    /// `source_root/relative_path` of the task
    pub source_path: PathBuf,

    /// The failure, if any
    pub error: Option<PipelineError>,
}

impl TaskResult {
    /// Build a result from a task outcome.
    pub fn from_outcome<T>(source_path: PathBuf, outcome: Result<T, PipelineError>) -> Self {
        let error = outcome.err();
        Self {
            success: error.is_none(),
            source_path,
            error,
        }
    }
}

/// A single failed file, as written to the failure report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Source file that failed
    pub path: PathBuf,

    /// Stage that failed ("decode", "write", ...)
    pub stage: String,

    /// Full error message
    pub message: String,
}

impl FailureRecord {
    pub fn from_error(error: &PipelineError) -> Self {
        Self {
            path: error.path().to_path_buf(),
            stage: error.stage().to_string(),
            message: error.to_string(),
        }
    }
}

/// Final status of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Number of tasks in the batch
    pub total: usize,

    /// Tasks that completed every stage
    pub succeeded: usize,

    /// Tasks that failed at some stage
    pub failed: usize,

    /// Wall-clock duration of the batch in milliseconds
    pub elapsed_ms: u64,

    /// One record per failed task, in arrival order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureRecord>,
}

impl BatchSummary {
    /// Total number of tasks that reported back.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Write the summary (including failures) as pretty-printed JSON.
    pub fn write_report(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
