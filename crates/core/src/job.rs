//! Asynchronous generation job records.
//!
//! A job is created `Processing` and transitions exactly once, to either
//! `Completed` or `Failed`. `NotFound` is never stored; it is the sentinel
//! answer for unknown identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Timestamp;

/// Opaque job identifier.
pub type JobId = Uuid;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
    NotFound,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::NotFound => "not_found",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// How a background generation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { artifact_path: String },
    Failed { error: String },
}

/// One tracked generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub job_id: JobId,
    pub status: JobStatus,
    /// Set only when `status` is `Completed`.
    pub artifact_path: Option<String>,
    /// Set only when `status` is `Failed`.
    pub error: Option<String>,
    pub created_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

impl Job {
    /// A freshly submitted job.
    pub fn processing(job_id: JobId) -> Self {
        Self {
            job_id,
            status: JobStatus::Processing,
            artifact_path: None,
            error: None,
            created_at: Some(chrono::Utc::now()),
            finished_at: None,
        }
    }

    /// The sentinel returned for an unknown identifier.
    pub fn not_found(job_id: JobId) -> Self {
        Self {
            job_id,
            status: JobStatus::NotFound,
            artifact_path: None,
            error: None,
            created_at: None,
            finished_at: None,
        }
    }

    /// Apply the single permitted transition.
    ///
    /// Returns `false` and leaves the record untouched unless it is still
    /// `Processing`.
    pub fn finish(&mut self, outcome: JobOutcome) -> bool {
        if self.status != JobStatus::Processing {
            return false;
        }
        match outcome {
            JobOutcome::Completed { artifact_path } => {
                self.status = JobStatus::Completed;
                self.artifact_path = Some(artifact_path);
            }
            JobOutcome::Failed { error } => {
                self.status = JobStatus::Failed;
                self.error = Some(error);
            }
        }
        self.finished_at = Some(chrono::Utc::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_is_processing() {
        let job = Job::processing(Uuid::new_v4());
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.artifact_path.is_none());
        assert!(job.error.is_none());
        assert!(job.created_at.is_some());
    }

    #[test]
    fn completion_sets_path_only() {
        let mut job = Job::processing(Uuid::new_v4());
        assert!(job.finish(JobOutcome::Completed {
            artifact_path: "outputs/x.mp4".into()
        }));
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.artifact_path.as_deref(), Some("outputs/x.mp4"));
        assert!(job.error.is_none());
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn failure_sets_error_only() {
        let mut job = Job::processing(Uuid::new_v4());
        assert!(job.finish(JobOutcome::Failed {
            error: "boom".into()
        }));
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("boom"));
        assert!(job.artifact_path.is_none());
    }

    #[test]
    fn second_transition_is_refused() {
        let mut job = Job::processing(Uuid::new_v4());
        job.finish(JobOutcome::Failed {
            error: "first".into(),
        });
        let before = job.clone();

        assert!(!job.finish(JobOutcome::Completed {
            artifact_path: "late.mp4".into()
        }));
        assert_eq!(job, before);
    }

    #[test]
    fn not_found_sentinel_never_transitions() {
        let mut job = Job::not_found(Uuid::new_v4());
        assert!(!job.finish(JobOutcome::Failed { error: "x".into() }));
        assert_eq!(job.status, JobStatus::NotFound);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(JobStatus::NotFound).unwrap(),
            serde_json::json!("not_found")
        );
        for s in [
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::NotFound,
        ] {
            assert_eq!(serde_json::to_value(s).unwrap(), serde_json::json!(s.as_str()));
        }
    }

    #[test]
    fn terminal_states() {
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::NotFound.is_terminal());
    }
}
