//! Job configuration for batch runs

use crate::error::{BatchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extensions scanned when a job does not override the filter
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Exact output dimensions for the optional resize step
///
/// No aspect-ratio preservation: outputs match the literal target dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeSpec {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
}

impl ResizeSpec {
    /// Create a resize spec, rejecting zero dimensions
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Validation` when either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BatchError::validation(format!(
                "resize dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl std::fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Description of one batch run, immutable once started
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Directory scanned for input images
    pub input_dir: PathBuf,
    /// Directory receiving `<stem>.png` outputs, created if absent
    pub output_dir: PathBuf,
    /// Optional exact-dimension resize applied after background removal
    pub resize: Option<ResizeSpec>,
    /// Lowercased extensions accepted by the enumeration filter
    pub extensions: BTreeSet<String>,
}

impl BatchJob {
    /// Create a new job builder
    #[must_use]
    pub fn builder() -> BatchJobBuilder {
        BatchJobBuilder::new()
    }

    /// Validate the job without touching the filesystem
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Validation` for empty directory paths, zero
    /// resize dimensions, or an empty extension filter.
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(BatchError::validation("input directory must not be empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(BatchError::validation("output directory must not be empty"));
        }
        if let Some(resize) = self.resize {
            // ResizeSpec::new enforces this, but jobs can be built literally
            ResizeSpec::new(resize.width, resize.height)?;
        }
        if self.extensions.is_empty() {
            return Err(BatchError::validation("extension filter must not be empty"));
        }
        Ok(())
    }
}

/// Builder for [`BatchJob`]
pub struct BatchJobBuilder {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    resize: Option<(u32, u32)>,
    extensions: BTreeSet<String>,
}

impl BatchJobBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            resize: None,
            extensions: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn input_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.input_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Request an exact resize to (width, height); validated at build time
    #[must_use]
    pub fn resize(mut self, width: u32, height: u32) -> Self {
        self.resize = Some((width, height));
        self
    }

    /// Add an extension to the filter (stored lowercased, leading dot ignored)
    #[must_use]
    pub fn extension<S: AsRef<str>>(mut self, ext: S) -> Self {
        let normalized = ext.as_ref().trim_start_matches('.').to_lowercase();
        if !normalized.is_empty() {
            self.extensions.insert(normalized);
        }
        self
    }

    /// Build the job
    ///
    /// Applies [`DEFAULT_EXTENSIONS`] when no filter was supplied. Has no
    /// filesystem side effects; directories are only checked at run time.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Validation` for missing or empty directories and
    /// for zero resize dimensions.
    pub fn build(self) -> Result<BatchJob> {
        let input_dir = self
            .input_dir
            .ok_or_else(|| BatchError::validation("input directory is required"))?;
        let output_dir = self
            .output_dir
            .ok_or_else(|| BatchError::validation("output directory is required"))?;

        let resize = match self.resize {
            Some((width, height)) => Some(ResizeSpec::new(width, height)?),
            None => None,
        };

        let extensions = if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect()
        } else {
            self.extensions
        };

        let job = BatchJob {
            input_dir,
            output_dir,
            resize,
            extensions,
        };
        job.validate()?;
        Ok(job)
    }
}

impl Default for BatchJobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let job = BatchJob::builder()
            .input_dir("/photos/in")
            .output_dir("/photos/out")
            .build()
            .expect("job should build");
        assert!(job.resize.is_none());
        assert_eq!(
            job.extensions.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["jpeg", "jpg", "png"]
        );
    }

    #[test]
    fn test_missing_directories_rejected() {
        let err = BatchJob::builder().build().unwrap_err();
        assert!(matches!(err, BatchError::Validation(_)));

        let err = BatchJob::builder()
            .input_dir("")
            .output_dir("/out")
            .build()
            .unwrap_err();
        assert!(matches!(err, BatchError::Validation(_)));
    }

    #[test]
    fn test_zero_resize_rejected() {
        let err = BatchJob::builder()
            .input_dir("/in")
            .output_dir("/out")
            .resize(0, 500)
            .build()
            .unwrap_err();
        assert!(matches!(err, BatchError::Validation(_)));
        assert!(err.to_string().contains("0x500"));
    }

    #[test]
    fn test_extensions_normalized() {
        let job = BatchJob::builder()
            .input_dir("/in")
            .output_dir("/out")
            .extension(".JPG")
            .extension("Png")
            .build()
            .expect("job should build");
        assert!(job.extensions.contains("jpg"));
        assert!(job.extensions.contains("png"));
        assert!(!job.extensions.contains("jpeg"));
    }

    #[test]
    fn test_resize_spec_display() {
        let spec = ResizeSpec::new(500, 500).expect("valid spec");
        assert_eq!(spec.to_string(), "500x500");
    }
}
