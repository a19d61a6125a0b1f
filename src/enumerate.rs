//! Input file enumeration

use crate::error::{BatchError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Lists candidate input files by extension filter
pub struct FileEnumerator;

impl FileEnumerator {
    /// List image files in `dir` whose extension matches the filter
    ///
    /// Matching is case-insensitive on the final extension segment; entries
    /// that are not plain files are skipped. Results are sorted
    /// lexicographically by file name so processing order is deterministic
    /// regardless of the underlying directory listing order.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::DirectoryUnreadable` when `dir` cannot be listed
    /// (missing, not a directory, or permission denied).
    pub fn list(dir: &Path, extensions: &BTreeSet<String>) -> Result<Vec<PathBuf>> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| BatchError::directory_unreadable(dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BatchError::directory_unreadable(dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            if extensions.contains(&ext.to_lowercase()) {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        log::debug!(
            "enumerated {} matching file(s) in {}",
            files.len(),
            dir.display()
        );
        Ok(files)
    }
}
