//! Shared fixtures for integration tests
//!
//! Small real image files plus removal backends with controllable behavior.

#![allow(dead_code)]

use bgbatch::{BackgroundRemover, RemovalError};
use image::{DynamicImage, Rgb, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Mutex;
use std::time::Duration;

/// Write a small valid PNG with a solid mid-gray fill
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(width, height, Rgb([90, 90, 90]))
        .save(&path)
        .expect("failed to write PNG fixture");
    path
}

/// Write a small valid JPEG
pub fn write_jpeg(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::from_pixel(16, 16, Rgb([90, 90, 90]))
        .save_with_format(&path, image::ImageFormat::Jpeg)
        .expect("failed to write JPEG fixture");
    path
}

/// Write garbage bytes under an image extension
pub fn write_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"this is not an image").expect("failed to write corrupt fixture");
    path
}

/// Remover that adds an opaque alpha channel and nothing else
pub struct OpaqueRemover;

impl BackgroundRemover for OpaqueRemover {
    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage, RemovalError> {
        Ok(image.to_rgba8())
    }
}

/// Remover that always refuses
pub struct FailingRemover;

impl BackgroundRemover for FailingRemover {
    fn remove_background(&self, _image: &DynamicImage) -> Result<RgbaImage, RemovalError> {
        Err(RemovalError::new("model refused input"))
    }
}

/// Remover that panics, simulating a crashing backend
pub struct PanickingRemover;

impl BackgroundRemover for PanickingRemover {
    fn remove_background(&self, _image: &DynamicImage) -> Result<RgbaImage, RemovalError> {
        panic!("backend crashed");
    }
}

/// Remover that blocks on a channel until the test releases it
///
/// Lets tests hold a run open deterministically, e.g. to exercise admission
/// control while a run is in flight.
pub struct GatedRemover {
    gate: Mutex<Receiver<()>>,
}

impl GatedRemover {
    pub fn new(gate: Receiver<()>) -> Self {
        Self {
            gate: Mutex::new(gate),
        }
    }
}

impl BackgroundRemover for GatedRemover {
    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage, RemovalError> {
        self.gate
            .lock()
            .expect("gate mutex poisoned")
            .recv_timeout(Duration::from_secs(10))
            .map_err(|_| RemovalError::new("gate never released"))?;
        Ok(image.to_rgba8())
    }
}
