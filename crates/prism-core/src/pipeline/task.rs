//! Work items: one task per source file, all sharing a batch's options.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{PrismError, Result};
use crate::types::TransformOptions;

use super::discovery::FileDiscovery;

/// Transformation of exactly one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Root directory to read from
    pub source_root: PathBuf,
    /// Root directory to write to
    pub destination_root: PathBuf,
    /// Path of the image relative to both roots
    pub relative_path: PathBuf,
    /// Transformation to apply
    pub options: TransformOptions,
}

impl Task {
    /// Absolute (or root-relative) path of the source file.
    pub fn source_path(&self) -> PathBuf {
        self.source_root.join(&self.relative_path)
    }

    /// Where the transformed image is written: the mirrored path with its
    /// extension replaced by the output format's.
    pub fn destination_path(&self) -> PathBuf {
        let stem = trim_extension(&self.destination_root.join(&self.relative_path));
        let mut name = OsString::from(stem);
        name.push(".");
        name.push(self.options.format.extension());
        PathBuf::from(name)
    }
}

/// Remove the final extension from a path, textually.
///
/// `a/b/file`, `a/b/file.txt` and `a/b/file.` all become `a/b/file`.
/// Everything from the last dot of the file name is an extension, so a
/// dot-file such as `a/.jpg` becomes `a/` with an empty name.
pub fn trim_extension(path: &Path) -> PathBuf {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.with_extension("");
    };
    match name.rfind('.') {
        Some(0) => path.parent().map(|p| p.join("")).unwrap_or_default(),
        Some(dot) => path.with_file_name(&name[..dot]),
        None => path.to_path_buf(),
    }
}

/// Build one task per regular file under `source_root`.
pub fn build_tasks(
    source_root: &Path,
    destination_root: &Path,
    options: TransformOptions,
) -> Result<Vec<Task>> {
    let files =
        FileDiscovery::discover(source_root).map_err(|e| PrismError::TaskBuild(Box::new(e)))?;

    Ok(files
        .into_iter()
        .map(|relative_path| Task {
            source_root: source_root.to_path_buf(),
            destination_root: destination_root.to_path_buf(),
            relative_path,
            options,
        })
        .collect())
}
