//! Progress and error observation for batch runs
//!
//! The worker reports through these traits; presentation layers implement
//! them without the engine knowing anything about terminals, GUIs, or wire
//! formats. Sinks are invoked in strict task-enumeration order with no
//! batching or reordering.

use crate::types::{BatchReport, ImageTask, ItemOutcome};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Trait for observing batch progress
pub trait ProgressSink: Send + Sync {
    /// Called once before the first item, with the enumerated total
    fn on_start(&self, total: usize);

    /// Called after each item finishes, success or failure
    fn on_item(&self, path: &Path, outcome: ItemOutcome);

    /// Called after every item with the monotonic progress counter
    fn on_progress(&self, current: usize, total: usize);

    /// Called once with the final report
    fn on_complete(&self, report: &BatchReport);
}

/// Trait for collecting per-item failures
pub trait ErrorCollector: Send + Sync {
    /// Called with the failed task, before the matching `on_item`
    fn on_error(&self, task: &ImageTask);
}

/// No-op progress sink that discards all updates
pub struct NoOpProgressSink;

impl ProgressSink for NoOpProgressSink {
    fn on_start(&self, _total: usize) {}
    fn on_item(&self, _path: &Path, _outcome: ItemOutcome) {}
    fn on_progress(&self, _current: usize, _total: usize) {}
    fn on_complete(&self, _report: &BatchReport) {}
}

/// No-op error collector that discards all failures
pub struct NoOpErrorCollector;

impl ErrorCollector for NoOpErrorCollector {
    fn on_error(&self, _task: &ImageTask) {}
}

/// Console progress sink that logs progress
pub struct ConsoleProgressSink {
    verbose: bool,
}

impl ConsoleProgressSink {
    /// Create a new console progress sink
    ///
    /// # Arguments
    /// * `verbose` - Whether to log every item rather than failures only
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressSink for ConsoleProgressSink {
    fn on_start(&self, total: usize) {
        log::info!("starting batch run over {total} image(s)");
    }

    fn on_item(&self, path: &Path, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Succeeded if self.verbose => {
                log::info!("processed {}", path.display());
            },
            ItemOutcome::Succeeded => {},
            ItemOutcome::Failed => log::error!("failed {}", path.display()),
        }
    }

    fn on_progress(&self, current: usize, total: usize) {
        if self.verbose {
            log::info!("[{current}/{total}]");
        }
    }

    fn on_complete(&self, report: &BatchReport) {
        log::info!(
            "batch complete: {}/{} succeeded, {} failed{}",
            report.succeeded,
            report.total,
            report.failed(),
            if report.cancelled { " (cancelled)" } else { "" }
        );
    }
}

/// Console error collector that logs each failed task with its message
pub struct ConsoleErrorCollector;

impl ErrorCollector for ConsoleErrorCollector {
    fn on_error(&self, task: &ImageTask) {
        log::error!(
            "{}: {}",
            task.source_path.display(),
            task.error.as_deref().unwrap_or("unknown error")
        );
    }
}

/// JSON progress sink emitting one event object per line to stdout
pub struct JsonProgressSink;

impl JsonProgressSink {
    fn emit(event: &BatchEvent) {
        match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => log::warn!("could not serialize progress event: {e}"),
        }
    }
}

impl ProgressSink for JsonProgressSink {
    fn on_start(&self, total: usize) {
        Self::emit(&BatchEvent::Started { total });
    }

    fn on_item(&self, path: &Path, outcome: ItemOutcome) {
        Self::emit(&BatchEvent::Item {
            path: path.to_path_buf(),
            outcome,
        });
    }

    fn on_progress(&self, current: usize, total: usize) {
        Self::emit(&BatchEvent::Progress { current, total });
    }

    fn on_complete(&self, report: &BatchReport) {
        Self::emit(&BatchEvent::Completed {
            report: report.clone(),
        });
    }
}

/// Progress event delivered over a channel by [`ChannelProgressSink`]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    /// Run started with the enumerated total
    Started {
        /// Number of enumerated input files
        total: usize,
    },
    /// One item finished
    Item {
        /// Input file path
        path: PathBuf,
        /// Success or failure
        outcome: ItemOutcome,
    },
    /// Monotonic progress counter advanced
    Progress {
        /// Items processed so far
        current: usize,
        /// Enumerated total
        total: usize,
    },
    /// Run finished with the final report
    Completed {
        /// The immutable batch report
        report: BatchReport,
    },
}

/// Progress sink that forwards events over a Tokio channel
///
/// The bridge between the blocking worker and an async controlling context:
/// the worker sends, the presentation layer receives at its own pace. A
/// dropped receiver silently discards further events rather than failing the
/// run.
pub struct ChannelProgressSink {
    tx: mpsc::UnboundedSender<BatchEvent>,
}

impl ChannelProgressSink {
    /// Create a sink and the receiving end for the controlling context
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgressSink {
    fn on_start(&self, total: usize) {
        let _ = self.tx.send(BatchEvent::Started { total });
    }

    fn on_item(&self, path: &Path, outcome: ItemOutcome) {
        let _ = self.tx.send(BatchEvent::Item {
            path: path.to_path_buf(),
            outcome,
        });
    }

    fn on_progress(&self, current: usize, total: usize) {
        let _ = self.tx.send(BatchEvent::Progress { current, total });
    }

    fn on_complete(&self, report: &BatchReport) {
        let _ = self.tx.send(BatchEvent::Completed {
            report: report.clone(),
        });
    }
}

/// Progress sink driving an indicatif terminal bar, one tick per item
#[cfg(feature = "cli")]
pub struct ItemProgressBarSink {
    bar: std::sync::Mutex<Option<indicatif::ProgressBar>>,
}

#[cfg(feature = "cli")]
impl ItemProgressBarSink {
    /// Create a sink; the bar appears once the total is known
    #[must_use]
    pub fn new() -> Self {
        Self {
            bar: std::sync::Mutex::new(None),
        }
    }
}

#[cfg(feature = "cli")]
impl Default for ItemProgressBarSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "cli")]
impl ProgressSink for ItemProgressBarSink {
    fn on_start(&self, total: usize) {
        let bar = indicatif::ProgressBar::new(total as u64);
        bar.set_style(
            indicatif::ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        *self.bar.lock().expect("progress bar mutex poisoned") = Some(bar);
    }

    fn on_item(&self, path: &Path, outcome: ItemOutcome) {
        if let Some(bar) = self.bar.lock().expect("progress bar mutex poisoned").as_ref() {
            let name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            match outcome {
                ItemOutcome::Succeeded => bar.set_message(name),
                ItemOutcome::Failed => bar.set_message(format!("failed {name}")),
            }
        }
    }

    fn on_progress(&self, current: usize, _total: usize) {
        if let Some(bar) = self.bar.lock().expect("progress bar mutex poisoned").as_ref() {
            bar.set_position(current as u64);
        }
    }

    fn on_complete(&self, report: &BatchReport) {
        if let Some(bar) = self.bar.lock().expect("progress bar mutex poisoned").take() {
            bar.finish_with_message(format!(
                "Completed! Processed: {}, Failed: {}",
                report.succeeded,
                report.failed()
            ));
        }
    }
}

/// Error collector that stores failed tasks for later inspection
///
/// Intended for tests and embedders that want the failures as data rather
/// than log lines.
#[derive(Default)]
pub struct CollectingErrorSink {
    tasks: std::sync::Mutex<Vec<ImageTask>>,
}

impl CollectingErrorSink {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the collected failures, in notification order
    #[must_use]
    pub fn take(&self) -> Vec<ImageTask> {
        std::mem::take(&mut self.tasks.lock().expect("error sink mutex poisoned"))
    }
}

impl ErrorCollector for CollectingErrorSink {
    fn on_error(&self, task: &ImageTask) {
        self.tasks
            .lock()
            .expect("error sink mutex poisoned")
            .push(task.clone());
    }
}
