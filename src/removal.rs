//! Background removal capability abstraction
//!
//! The segmentation model is an injected dependency with a single operation:
//! raster image in, alpha-matted raster image out. Backends are swappable
//! (local model, remote service) and irrelevant to the controller's
//! correctness.

use crate::error::RemovalError;
use image::{DynamicImage, RgbaImage};

/// Trait for background removal backends
pub trait BackgroundRemover: Send + Sync {
    /// Produce a copy of `image` with its background made transparent
    ///
    /// # Errors
    ///
    /// Returns `RemovalError` when the capability cannot process the image
    /// (model failure, unsupported color mode).
    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage, RemovalError>;
}

/// Deterministic built-in remover that mattes by luminance threshold
///
/// Pixels at or above the threshold luminance are treated as background and
/// made fully transparent. This gives the binary a working end-to-end path
/// for images shot against a light backdrop; heavier segmentation models plug
/// in through [`BackgroundRemover`] without touching the engine.
pub struct LumaKeyRemover {
    threshold: u8,
}

impl LumaKeyRemover {
    /// Create a remover keying out pixels at or above `threshold` luminance
    #[must_use]
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }
}

impl Default for LumaKeyRemover {
    fn default() -> Self {
        // Near-white backdrops survive JPEG compression around this level
        Self::new(240)
    }
}

impl BackgroundRemover for LumaKeyRemover {
    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage, RemovalError> {
        let mut rgba = image.to_rgba8();
        let threshold = u32::from(self.threshold);
        for pixel in rgba.pixels_mut() {
            // Rec. 601 integer luma
            let luma = (u32::from(pixel[0]) * 299
                + u32::from(pixel[1]) * 587
                + u32::from(pixel[2]) * 114)
                / 1000;
            if luma >= threshold {
                pixel[3] = 0;
            }
        }
        Ok(rgba)
    }
}
