#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # bgbatch
//!
//! A batch background removal engine: point it at a folder of raster images
//! and get back a folder of transparent-background PNGs, with live progress
//! feedback, per-file failure isolation, and cooperative cancellation.
//!
//! The segmentation model is an injected capability behind the
//! [`BackgroundRemover`] trait, so local models, remote services, or the
//! built-in [`LumaKeyRemover`] all drive the same engine. Processing within a
//! run is strictly sequential; the worker executes on a blocking thread while
//! the controlling context stays responsive to cancellation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bgbatch::{BatchController, BatchJob, LumaKeyRemover};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let job = BatchJob::builder()
//!     .input_dir("photos/raw")
//!     .output_dir("photos/cutouts")
//!     .resize(500, 500)
//!     .build()?;
//!
//! let controller = BatchController::new(Arc::new(LumaKeyRemover::default()));
//! let handle = controller.start(job)?;
//! let report = handle.join().await?;
//! println!("{}/{} images processed", report.succeeded, report.total);
//! # Ok(())
//! # }
//! ```
//!
//! ## Observing progress
//!
//! The worker reports through [`ProgressSink`] and [`ErrorCollector`] in
//! strict enumeration order. [`ChannelProgressSink`] bridges events to an
//! async consumer:
//!
//! ```rust,no_run
//! use bgbatch::{BatchController, BatchJob, ChannelProgressSink, LumaKeyRemover};
//! use std::sync::Arc;
//!
//! # async fn example(job: BatchJob) -> anyhow::Result<()> {
//! let (sink, mut events) = ChannelProgressSink::new();
//! let controller = BatchController::new(Arc::new(LumaKeyRemover::default()))
//!     .with_progress_sink(Arc::new(sink));
//! let handle = controller.start(job)?;
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! handle.join().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): command-line interface with an indicatif progress bar

pub mod config;
pub mod controller;
pub mod enumerate;
pub mod error;
pub mod pipeline;
pub mod removal;
pub mod services;
pub mod tracing_config;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

// Public API exports
pub use config::{BatchJob, BatchJobBuilder, ResizeSpec, DEFAULT_EXTENSIONS};
pub use controller::{BatchController, CancellationToken, RunHandle};
pub use enumerate::FileEnumerator;
pub use error::{BatchError, RemovalError, Result, TransformError};
pub use pipeline::TransformPipeline;
pub use removal::{BackgroundRemover, LumaKeyRemover};
pub use services::{
    BatchEvent, ChannelProgressSink, CollectingErrorSink, ConsoleErrorCollector,
    ConsoleProgressSink, ErrorCollector, ImageIoService, JsonProgressSink, NoOpErrorCollector,
    NoOpOpener, NoOpProgressSink, OutputFolderOpener, PlatformOpener, ProgressSink,
};
pub use tracing_config::{TracingConfig, TracingFormat};
pub use types::{BatchReport, ImageTask, ItemOutcome, TaskStatus};

use std::sync::Arc;

/// Run one batch to completion with no-op observers
///
/// Convenience wrapper for embedders that only want the final report.
///
/// # Errors
///
/// Returns `BatchError` for validation failures, an unreadable input
/// directory, or an unwritable output directory.
pub async fn process_directory(
    job: BatchJob,
    remover: Arc<dyn BackgroundRemover>,
) -> Result<BatchReport> {
    let controller = BatchController::new(remover);
    let handle = controller.start(job)?;
    handle.join().await
}
