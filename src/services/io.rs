//! Image decode and atomic encode
//!
//! Separates file I/O from the transform logic. Output writes are atomic:
//! the PNG is encoded into a temp file in the destination directory and
//! renamed over the final path, so a crash mid-write never leaves a partial
//! output behind. The temp file handle is cleaned up on all exit paths.

use crate::error::TransformError;
use image::{DynamicImage, RgbaImage};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Service for image file input/output operations
pub struct ImageIoService;

impl ImageIoService {
    /// Decode an image file into an in-memory raster image
    ///
    /// # Errors
    ///
    /// Returns `TransformError::Decode` for corrupt or unsupported input.
    pub fn load_image(path: &Path) -> Result<DynamicImage, TransformError> {
        image::open(path).map_err(TransformError::Decode)
    }

    /// Encode `image` as PNG and write it atomically to `path`
    ///
    /// The temp file lives in the same directory as `path` so the final
    /// rename never crosses a filesystem boundary.
    ///
    /// # Errors
    ///
    /// Returns `TransformError::Encode` when PNG encoding fails and
    /// `TransformError::Write` for I/O failures around the temp file or the
    /// rename.
    pub fn save_png_atomic(image: &RgbaImage, path: &Path) -> Result<(), TransformError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(TransformError::Write)?;

        image
            .write_to(tmp.as_file_mut(), image::ImageFormat::Png)
            .map_err(TransformError::Encode)?;
        tmp.as_file_mut().flush().map_err(TransformError::Write)?;

        tmp.persist(path).map_err(|e| TransformError::Write(e.error))?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }
}
