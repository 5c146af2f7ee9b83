use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use rivalscope_core::error::{AnalysisError, GenerationError};

/// Application error type that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    MissingApiKey(String),
    Conflict(String),
    NotFound(String),
    Analysis(AnalysisError),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::Analysis(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MissingApiKey(provider) => (
                StatusCode::BAD_REQUEST,
                format!("Missing API key for {provider}"),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Analysis(err @ AnalysisError::InvalidRequest(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Analysis(err @ AnalysisError::Busy) => (StatusCode::CONFLICT, err.to_string()),
            AppError::Analysis(AnalysisError::GenerationUnavailable(GenerationError::Auth(msg))) => {
                (StatusCode::UNAUTHORIZED, msg.clone())
            }
            AppError::Analysis(AnalysisError::GenerationUnavailable(
                GenerationError::RateLimited { .. },
            )) => (StatusCode::TOO_MANY_REQUESTS, "Rate limited".into()),
            AppError::Analysis(AnalysisError::GenerationUnavailable(
                GenerationError::MissingApiKey(provider),
            )) => (
                StatusCode::BAD_REQUEST,
                format!("Missing API key for {provider}"),
            ),
            AppError::Analysis(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.user_message()),
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
