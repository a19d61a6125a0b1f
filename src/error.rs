//! Error types for batch background removal

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for run-level batch operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// Run-level errors that reject or abort a whole batch
///
/// These are raised before any item is processed (validation, admission,
/// enumeration) or when the worker itself cannot be driven to completion.
/// Per-item failures never surface here; they are carried by
/// [`TransformError`] and recorded on the failing task only.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Job rejected before any side effect took place
    #[error("invalid job: {0}")]
    Validation(String),

    /// The input directory could not be listed
    #[error("cannot list input directory '{path}': {source}")]
    DirectoryUnreadable {
        /// Directory that failed to enumerate
        path: PathBuf,
        /// Underlying listing failure
        #[source]
        source: std::io::Error,
    },

    /// A batch is already running; only one run is admitted at a time
    #[error("a batch run is already in progress")]
    AlreadyRunning,

    /// Input/output errors outside the per-item pipeline
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for unexpected conditions escaping the run boundary
    #[error("internal error: {0}")]
    Internal(String),
}

impl BatchError {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a directory enumeration error
    pub fn directory_unreadable<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::DirectoryUnreadable {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: std::io::Error) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("failed to {} '{}': {}", operation, path_display, error),
        ))
    }
}

/// Failure reported by a [`BackgroundRemover`](crate::removal::BackgroundRemover)
#[derive(Error, Debug)]
#[error("{0}")]
pub struct RemovalError(pub String);

impl RemovalError {
    /// Create a new removal error
    pub fn new<S: Into<String>>(msg: S) -> Self {
        Self(msg.into())
    }
}

/// Per-item transform failures, tagged with the pipeline stage that failed
///
/// A `TransformError` is always contained to the item that raised it; the
/// controller records it on the task and moves on to the next file.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Input file could not be decoded into a raster image
    #[error("decode failed: {0}")]
    Decode(#[source] image::ImageError),

    /// The segmentation capability reported a failure
    #[error("background removal failed: {0}")]
    Removal(#[from] RemovalError),

    /// Resize target was invalid
    #[error("resize failed: {0}")]
    Resize(String),

    /// Result image could not be encoded
    #[error("encode failed: {0}")]
    Encode(#[source] image::ImageError),

    /// Encoded output could not be written to disk
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),
}

impl TransformError {
    /// Name of the pipeline stage this error belongs to
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Removal(_) => "removal",
            Self::Resize(_) => "resize",
            Self::Encode(_) => "encode",
            Self::Write(_) => "write",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BatchError::validation("width must be positive");
        assert!(matches!(err, BatchError::Validation(_)));
        assert_eq!(err.to_string(), "invalid job: width must be positive");

        let err = BatchError::internal("worker vanished");
        assert!(matches!(err, BatchError::Internal(_)));
    }

    #[test]
    fn test_directory_unreadable_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = BatchError::directory_unreadable(Path::new("/photos/in"), io_error);
        let rendered = err.to_string();
        assert!(rendered.contains("/photos/in"));
        assert!(rendered.contains("cannot list input directory"));
    }

    #[test]
    fn test_file_io_error_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = BatchError::file_io_error("create output directory", Path::new("/photos/out"), io_error);
        let rendered = err.to_string();
        assert!(rendered.contains("create output directory"));
        assert!(rendered.contains("/photos/out"));
    }

    #[test]
    fn test_transform_error_stage_names() {
        let err = TransformError::Removal(RemovalError::new("model rejected input"));
        assert_eq!(err.stage(), "removal");
        assert_eq!(err.to_string(), "background removal failed: model rejected input");

        let err = TransformError::Resize("target dimensions must be positive".to_string());
        assert_eq!(err.stage(), "resize");

        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(TransformError::Write(io_error).stage(), "write");
    }
}
