use thiserror::Error;

/// Message shown to the end user for any generation or hydration failure.
pub const FAILURE_MESSAGE: &str = "Analysis failed. Please try again.";

/// Top-level error type for an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(#[from] GenerationError),

    #[error("Malformed response: {0}")]
    MalformedResponse(#[from] MalformedResponse),

    #[error("An analysis is already in progress")]
    Busy,

    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Whether this error moves the job into the `Failed` state.
    ///
    /// Request validation and busy rejections happen before any transition;
    /// cancellation returns the job to `Idle` instead.
    pub fn is_job_failure(&self) -> bool {
        matches!(
            self,
            AnalysisError::GenerationUnavailable(_) | AnalysisError::MalformedResponse(_)
        )
    }

    /// Text suitable for the end user. Generation and hydration failures
    /// share one generic message.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::GenerationUnavailable(_) | AnalysisError::MalformedResponse(_) => {
                FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Failures talking to the external generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API request failed: {0}")]
    ApiRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Generation timed out after {millis} ms")]
    Timeout { millis: u64 },

    #[error("Missing API key for {0}")]
    MissingApiKey(String),
}

/// Reasons a generated payload cannot be hydrated into a report.
#[derive(Debug, Error)]
pub enum MalformedResponse {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("unusable report shape: {0}")]
    Shape(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
