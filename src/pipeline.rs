//! Single-item transform pipeline
//!
//! Composes decode, background removal, optional resize, and atomic PNG
//! encode for one input file. Every stage can fail independently; the first
//! failure short-circuits the rest and is returned tagged with its stage.
//! Errors never cross the pipeline boundary as panics; continuation is the
//! controller's decision alone.

use crate::{
    config::ResizeSpec, error::TransformError, removal::BackgroundRemover,
    services::ImageIoService,
};
use image::imageops::{self, FilterType};
use std::path::Path;
use std::sync::Arc;

/// Drives one file through the full transform
pub struct TransformPipeline {
    remover: Arc<dyn BackgroundRemover>,
    resize: Option<ResizeSpec>,
}

impl TransformPipeline {
    /// Create a pipeline around a removal capability and an optional resize
    #[must_use]
    pub fn new(remover: Arc<dyn BackgroundRemover>, resize: Option<ResizeSpec>) -> Self {
        Self { remover, resize }
    }

    /// Transform `source` and write the result to `output`
    ///
    /// The output is always a lossless, alpha-preserving PNG, written
    /// atomically (temp file in the destination directory, then rename).
    ///
    /// # Errors
    ///
    /// Returns a [`TransformError`] tagged with the failing stage: `Decode`,
    /// `Removal`, `Resize`, `Encode`, or `Write`.
    pub fn apply(&self, source: &Path, output: &Path) -> Result<(), TransformError> {
        let image = ImageIoService::load_image(source)?;
        log::debug!(
            "decoded {} ({}x{})",
            source.display(),
            image.width(),
            image.height()
        );

        let mut cut = self.remover.remove_background(&image)?;

        if let Some(spec) = self.resize {
            if spec.width == 0 || spec.height == 0 {
                return Err(TransformError::Resize(format!(
                    "target dimensions must be positive, got {spec}"
                )));
            }
            cut = imageops::resize(&cut, spec.width, spec.height, FilterType::Lanczos3);
        }

        ImageIoService::save_png_atomic(&cut, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemovalError;
    use image::{DynamicImage, RgbaImage};
    use tempfile::TempDir;

    struct OpaqueRemover;

    impl BackgroundRemover for OpaqueRemover {
        fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage, RemovalError> {
            Ok(image.to_rgba8())
        }
    }

    struct RefusingRemover;

    impl BackgroundRemover for RefusingRemover {
        fn remove_background(&self, _image: &DynamicImage) -> Result<RgbaImage, RemovalError> {
            Err(RemovalError::new("unsupported color mode"))
        }
    }

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 80, 120]));
        img.save(&path).expect("failed to write fixture image");
        path
    }

    #[test]
    fn test_apply_writes_png_output() {
        let tmp = TempDir::new().expect("failed to create temp directory");
        let source = write_png(tmp.path(), "in.png", 8, 6);
        let output = tmp.path().join("out.png");

        let pipeline = TransformPipeline::new(Arc::new(OpaqueRemover), None);
        pipeline.apply(&source, &output).expect("transform should succeed");

        let written = image::open(&output).expect("output must decode");
        assert_eq!((written.width(), written.height()), (8, 6));
    }

    #[test]
    fn test_resize_hits_exact_dimensions() {
        let tmp = TempDir::new().expect("failed to create temp directory");
        let source = write_png(tmp.path(), "in.png", 64, 32);
        let output = tmp.path().join("out.png");

        let spec = ResizeSpec::new(10, 20).expect("valid spec");
        let pipeline = TransformPipeline::new(Arc::new(OpaqueRemover), Some(spec));
        pipeline.apply(&source, &output).expect("transform should succeed");

        let written = image::open(&output).expect("output must decode");
        // No aspect preservation: literal target dimensions
        assert_eq!((written.width(), written.height()), (10, 20));
    }

    #[test]
    fn test_decode_failure_is_tagged_and_writes_nothing() {
        let tmp = TempDir::new().expect("failed to create temp directory");
        let source = tmp.path().join("garbage.png");
        std::fs::write(&source, b"not an image at all").expect("failed to write fixture");
        let output = tmp.path().join("out.png");

        let pipeline = TransformPipeline::new(Arc::new(OpaqueRemover), None);
        let err = pipeline.apply(&source, &output).unwrap_err();
        assert_eq!(err.stage(), "decode");
        assert!(!output.exists());
    }

    #[test]
    fn test_removal_failure_short_circuits() {
        let tmp = TempDir::new().expect("failed to create temp directory");
        let source = write_png(tmp.path(), "in.png", 4, 4);
        let output = tmp.path().join("out.png");

        let pipeline = TransformPipeline::new(Arc::new(RefusingRemover), None);
        let err = pipeline.apply(&source, &output).unwrap_err();
        assert_eq!(err.stage(), "removal");
        assert!(err.to_string().contains("unsupported color mode"));
        assert!(!output.exists());
    }

    #[test]
    fn test_zero_resize_dimension_is_resize_error() {
        let tmp = TempDir::new().expect("failed to create temp directory");
        let source = write_png(tmp.path(), "in.png", 4, 4);
        let output = tmp.path().join("out.png");

        // Bypasses builder validation by constructing the struct literally
        let spec = ResizeSpec { width: 0, height: 10 };
        let pipeline = TransformPipeline::new(Arc::new(OpaqueRemover), Some(spec));
        let err = pipeline.apply(&source, &output).unwrap_err();
        assert_eq!(err.stage(), "resize");
        assert!(!output.exists());
    }
}
