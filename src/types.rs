//! Core data types for batch runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle of a single input file within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not yet reached by the worker
    Pending,
    /// Transform completed and output written
    Succeeded,
    /// Transform failed; the error message is recorded on the task
    Failed,
}

/// Outcome of a single item, as delivered to progress sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    /// The item was transformed and written
    Succeeded,
    /// The item failed somewhere in the pipeline
    Failed,
}

/// The unit of work representing one input file's journey through the pipeline
///
/// Tasks are created during enumeration and mutated only by the worker as it
/// processes them sequentially. Each task transitions `Pending` to exactly one
/// of `Succeeded` or `Failed`, or stays `Pending` forever when a run is
/// cancelled before reaching it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageTask {
    /// Path of the input file
    pub source_path: PathBuf,
    /// Derived output path (`<stem>.png` inside the output directory)
    pub output_path: PathBuf,
    /// Current status
    pub status: TaskStatus,
    /// Error message when `status` is `Failed`
    pub error: Option<String>,
}

impl ImageTask {
    pub(crate) fn new(source_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            source_path,
            output_path,
            status: TaskStatus::Pending,
            error: None,
        }
    }

    pub(crate) fn mark_succeeded(&mut self) {
        self.status = TaskStatus::Succeeded;
        self.error = None;
    }

    pub(crate) fn mark_failed(&mut self, message: String) {
        self.status = TaskStatus::Failed;
        self.error = Some(message);
    }
}

/// Final summary of a batch run, produced once and immutable thereafter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of enumerated input files
    pub total: usize,
    /// Number of files transformed successfully
    pub succeeded: usize,
    /// Failed tasks, in enumeration order, each carrying its error message
    pub failed_tasks: Vec<ImageTask>,
    /// Whether the run stopped early due to a cancellation request
    pub cancelled: bool,
    /// When the worker started the run
    pub started_at: DateTime<Utc>,
    /// When the report was produced
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// Number of failed tasks
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed_tasks.len()
    }

    /// Number of tasks never reached because the run was cancelled
    ///
    /// `succeeded + failed() + skipped() == total` always holds.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.total - self.succeeded - self.failed_tasks.len()
    }

    /// True when every enumerated file was transformed successfully
    #[must_use]
    pub fn is_clean_success(&self) -> bool {
        !self.cancelled && self.failed_tasks.is_empty() && self.succeeded == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(name: &str) -> ImageTask {
        ImageTask::new(
            PathBuf::from(format!("/in/{name}.jpg")),
            PathBuf::from(format!("/out/{name}.png")),
        )
    }

    #[test]
    fn test_task_transitions() {
        let mut t = task("a");
        assert_eq!(t.status, TaskStatus::Pending);
        assert!(t.error.is_none());

        t.mark_failed("decode failed: truncated file".to_string());
        assert_eq!(t.status, TaskStatus::Failed);
        assert_eq!(t.error.as_deref(), Some("decode failed: truncated file"));

        let mut t = task("b");
        t.mark_succeeded();
        assert_eq!(t.status, TaskStatus::Succeeded);
        assert!(t.error.is_none());
    }

    #[test]
    fn test_report_accounting() {
        let mut failed = task("bad");
        failed.mark_failed("decode failed".to_string());
        let report = BatchReport {
            total: 5,
            succeeded: 2,
            failed_tasks: vec![failed],
            cancelled: true,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 2);
        assert!(!report.is_clean_success());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = BatchReport {
            total: 1,
            succeeded: 1,
            failed_tasks: vec![],
            cancelled: false,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };
        let json = serde_json::to_string(&report).expect("report must serialize");
        assert!(json.contains("\"total\":1"));
        assert!(json.contains("\"cancelled\":false"));
    }
}
