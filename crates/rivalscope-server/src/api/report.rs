use axum::extract::State;
use axum::{Json, Router, routing::get};

use rivalscope_analysis::view::ReportView;
use rivalscope_core::report::AnalysisReport;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/report", get(current_report))
        .route("/report/view", get(current_view))
}

async fn load(state: &AppState) -> Result<AnalysisReport, AppError> {
    state
        .store
        .current_report()
        .await
        .ok_or_else(|| AppError::NotFound("No active report".into()))
}

async fn current_report(State(state): State<AppState>) -> Result<Json<AnalysisReport>, AppError> {
    Ok(Json(load(&state).await?))
}

async fn current_view(State(state): State<AppState>) -> Result<Json<ReportView>, AppError> {
    let report = load(&state).await?;
    Ok(Json(ReportView::build(&report)))
}
