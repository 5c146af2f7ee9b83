use serde::{Deserialize, Serialize};

use rivalscope_analysis::job::JobStatus;
use rivalscope_analysis::request::AnalysisRequest;
use rivalscope_core::progress::ProgressPhase;
use rivalscope_core::report::AnalysisReport;

// --- Analysis ---

/// Body of `POST /api/analysis`, as submitted by the form.
#[derive(Debug, Deserialize)]
pub struct AnalysisInvokeRequest {
    pub primary_url: String,
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl AnalysisInvokeRequest {
    /// Trimmed request with blank competitor rows dropped.
    pub fn into_request(self) -> AnalysisRequest {
        AnalysisRequest::from_form(&self.primary_url, &self.competitors)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisSseEvent {
    Status {
        status: JobStatus,
        job_id: Option<String>,
    },
    Progress {
        phase: ProgressPhase,
        message: String,
    },
    Complete {
        report: Box<AnalysisReport>,
    },
    Error {
        message: String,
    },
}

impl AnalysisSseEvent {
    /// SSE `event:` name, matching the `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Progress { .. } => "progress",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }
}
