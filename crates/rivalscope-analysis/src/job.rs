use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use rivalscope_core::error::{AnalysisError, Result};
use rivalscope_core::progress::{ProgressEvent, ProgressPhase};
use rivalscope_core::report::AnalysisReport;

/// Lifecycle of the current analysis job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Idle,
    Crawling,
    Analyzing,
    Completed,
    Failed,
}

impl JobStatus {
    /// A job is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, JobStatus::Crawling | JobStatus::Analyzing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEvent {
    Submitted,
    Progress(ProgressPhase),
    Succeeded,
    Failed,
    ResetElapsed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event {event:?} is not allowed while {from:?}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub event: JobEvent,
}

/// Pure transition function for the job lifecycle.
pub fn transition(from: JobStatus, event: JobEvent) -> std::result::Result<JobStatus, TransitionError> {
    use JobEvent as E;
    use JobStatus as S;

    let next = match (from, event) {
        (S::Idle | S::Completed | S::Failed, E::Submitted) => S::Crawling,
        (S::Crawling, E::Progress(ProgressPhase::Synthesizing)) => S::Analyzing,
        (S::Crawling, E::Progress(_)) => S::Crawling,
        // Progress never moves a job backwards.
        (S::Analyzing, E::Progress(_)) => S::Analyzing,
        (S::Crawling | S::Analyzing, E::Succeeded) => S::Completed,
        (S::Crawling | S::Analyzing, E::Failed) => S::Failed,
        (S::Crawling | S::Analyzing, E::Cancelled) => S::Idle,
        (S::Failed, E::ResetElapsed) => S::Idle,
        _ => return Err(TransitionError { from, event }),
    };
    Ok(next)
}

/// Serializable view of the job for status polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub status: JobStatus,
    /// Latest progress or failure message.
    pub message: Option<String>,
    pub job_id: Option<String>,
}

/// A progress event together with the status it moved the job to.
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    pub job_id: String,
    pub status: JobStatus,
    pub event: ProgressEvent,
}

/// Handle returned to whoever starts a job.
#[derive(Debug, Clone)]
pub struct JobTicket {
    pub id: String,
    pub cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct JobState {
    status: JobStatus,
    message: Option<String>,
    job_id: Option<String>,
    cancel: Option<CancellationToken>,
    report: Option<AnalysisReport>,
}

impl JobState {
    fn owns(&self, job_id: &str) -> bool {
        self.job_id.as_deref() == Some(job_id)
    }

    fn apply(&mut self, event: JobEvent) -> bool {
        match transition(self.status, event) {
            Ok(next) => {
                self.status = next;
                true
            }
            Err(err) => {
                debug!(error = %err, "Ignoring job event");
                false
            }
        }
    }
}

/// Owner of the job status and the current-report slot.
///
/// Cloning shares the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    inner: Arc<RwLock<JobState>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new job, or reject with `Busy` while one is in flight.
    pub async fn begin(&self) -> Result<JobTicket> {
        let mut state = self.inner.write().await;
        if !state.apply(JobEvent::Submitted) {
            return Err(AnalysisError::Busy);
        }
        let ticket = JobTicket {
            id: Uuid::new_v4().to_string(),
            cancel: CancellationToken::new(),
        };
        state.job_id = Some(ticket.id.clone());
        state.cancel = Some(ticket.cancel.clone());
        state.message = None;
        info!(job_id = %ticket.id, "Analysis job started");
        Ok(ticket)
    }

    /// Apply a progress notification for `job_id` and return the resulting
    /// status. Stale jobs are ignored and yield `None`.
    pub async fn record_progress(&self, job_id: &str, event: &ProgressEvent) -> Option<JobStatus> {
        let mut state = self.inner.write().await;
        if !state.owns(job_id) || !state.apply(JobEvent::Progress(event.phase)) {
            return None;
        }
        state.message = Some(event.message.clone());
        Some(state.status)
    }

    /// Store the finished report. Returns `false` if the job is no longer current.
    pub async fn complete(&self, job_id: &str, report: AnalysisReport) -> bool {
        let mut state = self.inner.write().await;
        if !state.owns(job_id) || !state.apply(JobEvent::Succeeded) {
            return false;
        }
        info!(job_id, report_id = %report.id, "Analysis job completed");
        state.report = Some(report);
        state.message = None;
        state.cancel = None;
        true
    }

    /// Mark the job failed. The previous report is left in place.
    pub async fn fail(&self, job_id: &str, message: impl Into<String>) -> bool {
        let mut state = self.inner.write().await;
        if !state.owns(job_id) || !state.apply(JobEvent::Failed) {
            return false;
        }
        state.message = Some(message.into());
        state.cancel = None;
        true
    }

    /// Return to `Idle` after a failure, unless a newer job has started since.
    pub async fn reset_if_failed(&self, job_id: &str) -> bool {
        let mut state = self.inner.write().await;
        if !state.owns(job_id) || state.status != JobStatus::Failed {
            return false;
        }
        state.apply(JobEvent::ResetElapsed);
        state.message = None;
        debug!(job_id, "Failed job reset to idle");
        true
    }

    /// Cancel the in-flight job, returning its id.
    pub async fn cancel(&self) -> Option<String> {
        let mut state = self.inner.write().await;
        if !state.apply(JobEvent::Cancelled) {
            return None;
        }
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        state.message = None;
        info!(job_id = ?state.job_id, "Analysis job cancelled");
        state.job_id.clone()
    }

    pub async fn status(&self) -> JobStatus {
        self.inner.read().await.status
    }

    pub async fn snapshot(&self) -> JobSnapshot {
        let state = self.inner.read().await;
        JobSnapshot {
            status: state.status,
            message: state.message.clone(),
            job_id: state.job_id.clone(),
        }
    }

    /// The last successfully completed report, if any.
    pub async fn current_report(&self) -> Option<AnalysisReport> {
        self.inner.read().await.report.clone()
    }
}
