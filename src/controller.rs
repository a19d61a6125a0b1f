//! Batch run orchestration
//!
//! The controller owns run admission (at most one batch at a time),
//! validation, and the worker that drives every enumerated file through the
//! transform pipeline. The worker executes on a blocking thread via
//! `tokio::task::spawn_blocking`; the controlling context stays responsive
//! and can request cancellation at any time. Cancellation is cooperative and
//! honored at item boundaries only.

use crate::{
    config::BatchJob,
    enumerate::FileEnumerator,
    error::{BatchError, Result},
    pipeline::TransformPipeline,
    removal::BackgroundRemover,
    services::{
        ErrorCollector, NoOpErrorCollector, NoOpOpener, NoOpProgressSink, OutputFolderOpener,
        ProgressSink,
    },
    types::{BatchReport, ImageTask, ItemOutcome, TaskStatus},
};
use chrono::Utc;
use log::{debug, error, info, warn};
use std::ffi::OsStr;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between controller and worker
///
/// A pure signal: setting it never drives allocation or teardown. The
/// controller writes, the worker reads once per item boundary.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a fresh, unset token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; idempotent, takes effect at the next item boundary
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Handle to an in-flight batch run
#[derive(Debug)]
pub struct RunHandle {
    token: CancellationToken,
    join: tokio::task::JoinHandle<Result<BatchReport>>,
}

impl RunHandle {
    /// Request cancellation of this run
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Clone of the run's cancellation token, usable from other contexts
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether the worker has finished
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the run and take its immutable report
    ///
    /// # Errors
    ///
    /// Returns the run's fatal error (enumeration or output-directory
    /// failure), or `BatchError::Internal` if the worker could not be joined.
    pub async fn join(self) -> Result<BatchReport> {
        self.join
            .await
            .map_err(|e| BatchError::internal(format!("batch worker could not be joined: {e}")))?
    }
}

/// Orchestrates batch background removal runs
///
/// Holds the injected capabilities (remover, sinks, folder opener) and the
/// admission flag. Reusable across runs, but admits only one at a time.
pub struct BatchController {
    remover: Arc<dyn BackgroundRemover>,
    progress: Arc<dyn ProgressSink>,
    errors: Arc<dyn ErrorCollector>,
    opener: Arc<dyn OutputFolderOpener>,
    running: Arc<AtomicBool>,
}

impl BatchController {
    /// Create a controller around a removal capability with no-op observers
    #[must_use]
    pub fn new(remover: Arc<dyn BackgroundRemover>) -> Self {
        Self {
            remover,
            progress: Arc::new(NoOpProgressSink),
            errors: Arc::new(NoOpErrorCollector),
            opener: Arc::new(NoOpOpener),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Install a progress sink
    #[must_use]
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Install an error collector
    #[must_use]
    pub fn with_error_collector(mut self, collector: Arc<dyn ErrorCollector>) -> Self {
        self.errors = collector;
        self
    }

    /// Install an output folder opener, invoked only on full success
    #[must_use]
    pub fn with_folder_opener(mut self, opener: Arc<dyn OutputFolderOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Start a batch run with a freshly created cancellation token
    ///
    /// Must be called from within a Tokio runtime; the worker runs on a
    /// blocking thread and never blocks the caller.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::AlreadyRunning` while a run is in flight and
    /// `BatchError::Validation` for a bad job. Rejections have no filesystem
    /// side effects and do not disturb an in-progress run.
    pub fn start(&self, job: BatchJob) -> Result<RunHandle> {
        self.start_with_token(job, CancellationToken::new())
    }

    /// Start a batch run observing an externally created token
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub fn start_with_token(&self, job: BatchJob, token: CancellationToken) -> Result<RunHandle> {
        let guard = RunGuard::acquire(&self.running).ok_or(BatchError::AlreadyRunning)?;
        job.validate()?;

        let worker = BatchWorker {
            pipeline: TransformPipeline::new(Arc::clone(&self.remover), job.resize),
            job,
            progress: Arc::clone(&self.progress),
            errors: Arc::clone(&self.errors),
            opener: Arc::clone(&self.opener),
            token: token.clone(),
            _guard: guard,
        };
        let join = tokio::task::spawn_blocking(move || worker.run());
        Ok(RunHandle { token, join })
    }

    /// Whether a run is currently in flight
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// RAII release of the admission flag
///
/// Dropping the guard returns the controller to idle on every exit path,
/// worker panics included.
struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl RunGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// One run's worth of state, executed sequentially on a blocking thread
struct BatchWorker {
    job: BatchJob,
    pipeline: TransformPipeline,
    progress: Arc<dyn ProgressSink>,
    errors: Arc<dyn ErrorCollector>,
    opener: Arc<dyn OutputFolderOpener>,
    token: CancellationToken,
    _guard: RunGuard,
}

impl BatchWorker {
    fn run(self) -> Result<BatchReport> {
        let started_at = Utc::now();

        std::fs::create_dir_all(&self.job.output_dir).map_err(|e| {
            BatchError::file_io_error("create output directory", &self.job.output_dir, e)
        })?;

        let files = FileEnumerator::list(&self.job.input_dir, &self.job.extensions)?;
        let total = files.len();
        let mut tasks: Vec<ImageTask> = files
            .into_iter()
            .map(|source| {
                let output = output_path_for(&source, &self.job.output_dir);
                ImageTask::new(source, output)
            })
            .collect();

        self.progress.on_start(total);
        if total == 0 {
            info!("no images found in {}", self.job.input_dir.display());
            return Ok(self.finish(total, 0, tasks, false, started_at));
        }
        info!("processing {total} image(s) from {}", self.job.input_dir.display());

        let mut succeeded = 0usize;
        let mut processed = 0usize;
        let mut cancelled = false;

        for task in &mut tasks {
            if self.token.is_cancelled() {
                cancelled = true;
                warn!(
                    "cancellation requested; leaving {} of {total} item(s) unprocessed",
                    total - processed
                );
                break;
            }

            match apply_guarded(&self.pipeline, &task.source_path, &task.output_path) {
                Ok(()) => {
                    debug!("processed {}", task.source_path.display());
                    task.mark_succeeded();
                    succeeded += 1;
                    self.progress.on_item(&task.source_path, ItemOutcome::Succeeded);
                },
                Err(message) => {
                    error!("failed {}: {message}", task.source_path.display());
                    task.mark_failed(message);
                    self.errors.on_error(task);
                    self.progress.on_item(&task.source_path, ItemOutcome::Failed);
                },
            }
            processed += 1;
            self.progress.on_progress(processed, total);
        }

        Ok(self.finish(total, succeeded, tasks, cancelled, started_at))
    }

    fn finish(
        &self,
        total: usize,
        succeeded: usize,
        tasks: Vec<ImageTask>,
        cancelled: bool,
        started_at: chrono::DateTime<Utc>,
    ) -> BatchReport {
        let failed_tasks: Vec<ImageTask> = tasks
            .into_iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .collect();

        let report = BatchReport {
            total,
            succeeded,
            failed_tasks,
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "batch finished: {}/{} succeeded, {} failed, {} skipped{}",
            report.succeeded,
            report.total,
            report.failed(),
            report.skipped(),
            if report.cancelled { " (cancelled)" } else { "" }
        );
        self.progress.on_complete(&report);

        if report.total > 0 && report.is_clean_success() {
            self.opener.open(&self.job.output_dir);
        }
        report
    }
}

/// Run the pipeline for one item, containing panics to that item
///
/// A panicking removal backend becomes a failed task with a synthetic
/// message instead of tearing down the run.
fn apply_guarded(pipeline: &TransformPipeline, source: &Path, output: &Path) -> std::result::Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(|| pipeline.apply(source, output))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!(
            "unexpected panic during transform: {}",
            panic_message(&*payload)
        )),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

/// Derive the output path: `<stem>.png` inside the output directory
///
/// The name is built by appending `.png` to the full stem, so dots inside
/// the stem survive (`archive.tar.jpg` maps to `archive.tar.png`).
fn output_path_for(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_else(|| OsStr::new("image"));
    output_dir.join(format!("{}.png", stem.to_string_lossy()))
}
