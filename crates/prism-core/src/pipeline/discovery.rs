//! File discovery: enumerate every regular file under a source root.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{PrismError, Result};

/// Discovers files in a directory tree.
pub struct FileDiscovery;

impl FileDiscovery {
    /// List all regular files under `root`, relative to `root`.
    ///
    /// Symbolic links are not followed and are never returned, nor are
    /// directories or special files. Any error during the walk fails the
    /// whole call; partial listings are discarded.
    pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
        let discovery_error = |source: io::Error| PrismError::Discovery {
            root: root.to_path_buf(),
            source,
        };

        let meta = std::fs::metadata(root).map_err(discovery_error)?;
        if !meta.is_dir() {
            return Err(discovery_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|e| discovery_error(e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| discovery_error(io::Error::new(io::ErrorKind::Other, e)))?;
            files.push(relative.to_path_buf());
        }

        // Sort by path for deterministic ordering
        files.sort();
        tracing::debug!("Discovered {} file(s) under {:?}", files.len(), root);
        Ok(files)
    }
}
