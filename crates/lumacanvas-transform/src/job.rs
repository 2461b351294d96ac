//! Remote job record.
//!
//! A [`TransformJob`] lives only for the duration of one orchestrator run and
//! is dropped once it reaches a terminal status. There is no job history.

use std::fmt;

use lumacanvas_core::ImageSource;

/// Lifecycle of a remote job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Submitted,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::TimedOut
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Submitted => write!(f, "Submitted"),
            JobStatus::Polling => write!(f, "Polling"),
            JobStatus::Succeeded => write!(f, "Succeeded"),
            JobStatus::Failed => write!(f, "Failed"),
            JobStatus::TimedOut => write!(f, "TimedOut"),
        }
    }
}

/// A job accepted by the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformJob {
    pub job_id: String,
    pub submitted_at_ms: u64,
    pub status: JobStatus,
    /// Where the result lives, once known.
    pub result_ref: Option<ImageSource>,
}

impl TransformJob {
    pub fn new(job_id: impl Into<String>, submitted_at_ms: u64) -> Self {
        Self {
            job_id: job_id.into(),
            submitted_at_ms,
            status: JobStatus::Submitted,
            result_ref: None,
        }
    }

    /// Move to a new status. Terminal statuses are final.
    pub fn transition(&mut self, status: JobStatus) {
        if self.status.is_terminal() {
            tracing::warn!(
                "Job {} already {}, ignoring transition to {}",
                self.job_id,
                self.status,
                status
            );
            return;
        }
        tracing::debug!("Job {}: {} -> {}", self.job_id, self.status, status);
        self.status = status;
    }

    /// Record the result and mark the job succeeded.
    pub fn succeed(&mut self, result: ImageSource) {
        self.transition(JobStatus::Succeeded);
        if self.status == JobStatus::Succeeded {
            self.result_ref = Some(result);
        }
    }

    /// Milliseconds since submission.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.submitted_at_ms)
    }
}
