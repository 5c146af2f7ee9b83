use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::KeepAliveStream;
use axum::{Json, Router, routing::get, routing::post};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use rivalscope_analysis::job::{JobSnapshot, JobUpdate};
use rivalscope_analysis::pipeline::AnalysisRunner;
use rivalscope_analysis::request::AnalysisRequest;

use crate::error::AppError;
use crate::extractors::ApiKeys;
use crate::sse::{SseItem, SseSender, sse_done, sse_event, sse_response};
use crate::state::AppState;
use crate::types::{AnalysisInvokeRequest, AnalysisSseEvent};

type SseStream = ReceiverStream<SseItem>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analysis", post(start_analysis))
        .route("/analysis/status", get(analysis_status))
        .route("/analysis/cancel", post(cancel_analysis))
}

async fn start_analysis(
    State(state): State<AppState>,
    api_keys: ApiKeys,
    Json(req): Json<AnalysisInvokeRequest>,
) -> Result<Sse<KeepAliveStream<SseStream>>, AppError> {
    let api_key = api_keys.gemini()?;
    let request = req.into_request();
    request.validate(state.config.max_competitors)?;
    if state.store.status().await.is_busy() {
        return Err(AppError::Conflict("An analysis is already in progress".into()));
    }

    let runner = state.runner(&api_key);
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        run_analysis(tx, runner, request).await;
    });

    Ok(sse_response(ReceiverStream::new(rx)))
}

async fn send(tx: &SseSender, event: &AnalysisSseEvent) {
    let _ = tx.send(sse_event(event)).await;
}

async fn run_analysis(tx: SseSender, runner: AnalysisRunner, request: AnalysisRequest) {
    let (update_tx, mut update_rx) = mpsc::channel::<JobUpdate>(16);

    // Statuses come from the updates themselves; the store may already have
    // moved on by the time an event is forwarded.
    let forward = async {
        let mut job_id = None;
        let mut last_status = None;
        while let Some(update) = update_rx.recv().await {
            if last_status != Some(update.status) {
                last_status = Some(update.status);
                let status = AnalysisSseEvent::Status {
                    status: update.status,
                    job_id: Some(update.job_id.clone()),
                };
                send(&tx, &status).await;
            }
            job_id = Some(update.job_id);
            let progress = AnalysisSseEvent::Progress {
                phase: update.event.phase,
                message: update.event.message,
            };
            send(&tx, &progress).await;
        }
        job_id
    };
    let work = runner.run_with_updates(request, update_tx);
    let (job_id, result) = tokio::join!(forward, work);

    // No update means this request never owned a job (e.g. it lost the busy
    // race), so there is no status of ours to report.
    if let Some(job_id) = job_id {
        let snapshot = runner.store().snapshot().await;
        if snapshot.job_id.as_deref() == Some(job_id.as_str()) {
            let status = AnalysisSseEvent::Status {
                status: snapshot.status,
                job_id: Some(job_id),
            };
            send(&tx, &status).await;
        }
    }

    let outcome = match result {
        Ok(report) => AnalysisSseEvent::Complete {
            report: Box::new(report),
        },
        Err(err) => AnalysisSseEvent::Error {
            message: err.user_message(),
        },
    };
    send(&tx, &outcome).await;
    let _ = tx.send(sse_done()).await;
}

async fn analysis_status(State(state): State<AppState>) -> Json<JobSnapshot> {
    Json(state.store.snapshot().await)
}

async fn cancel_analysis(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    match state.store.cancel().await {
        Some(job_id) => Ok(Json(json!({"status": "cancelled", "job_id": job_id}))),
        None => Err(AppError::Conflict("No analysis in progress".into())),
    }
}
