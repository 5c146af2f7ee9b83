use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use rivalscope_core::config::AnalysisConfig;
use rivalscope_core::error::{AnalysisError, GenerationError, Result};
use rivalscope_core::progress::{ProgressEvent, ProgressPhase, ProgressSink};
use rivalscope_core::report::AnalysisReport;
use rivalscope_llm::client::{GenerationClient, GenerationOptions};

use crate::hydrate::hydrate;
use crate::job::{JobStore, JobTicket, JobUpdate};
use crate::prompt::build_instruction;
use crate::request::AnalysisRequest;

pub fn initializing_message(site_count: usize) -> String {
    format!("Initializing research agents for {site_count} sites...")
}

/// Runs one analysis at a time: build the instruction, generate, hydrate,
/// and record the outcome in the job store.
#[derive(Clone)]
pub struct AnalysisRunner {
    client: Arc<dyn GenerationClient>,
    store: JobStore,
    config: AnalysisConfig,
}

impl AnalysisRunner {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            store: JobStore::new(),
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing store, e.g. one owned by a server.
    pub fn with_store(mut self, store: JobStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze `primary_url` against `competitors` without progress reporting.
    pub async fn start_analysis(
        &self,
        primary_url: &str,
        competitors: &[String],
    ) -> Result<AnalysisReport> {
        let request = AnalysisRequest::new(primary_url, competitors.to_vec());
        self.run(request, ProgressSink::noop()).await
    }

    /// Run a full analysis, forwarding progress to `progress`.
    ///
    /// Every progress event is applied to the job store before it reaches
    /// `progress`, and all of them land before the terminal state change.
    pub async fn run(
        &self,
        request: AnalysisRequest,
        progress: ProgressSink,
    ) -> Result<AnalysisReport> {
        self.run_inner(request, progress, None).await
    }

    /// Like [`run`](Self::run), but each progress event arrives paired with
    /// the job status it produced, so callers never read the store out of band.
    pub async fn run_with_updates(
        &self,
        request: AnalysisRequest,
        updates: mpsc::Sender<JobUpdate>,
    ) -> Result<AnalysisReport> {
        self.run_inner(request, ProgressSink::noop(), Some(updates)).await
    }

    async fn run_inner(
        &self,
        request: AnalysisRequest,
        progress: ProgressSink,
        updates: Option<mpsc::Sender<JobUpdate>>,
    ) -> Result<AnalysisReport> {
        request.validate(self.config.max_competitors)?;
        let ticket = self.store.begin().await?;
        info!(
            job_id = %ticket.id,
            primary_url = %request.primary_url,
            competitors = request.competitors.len(),
            model = self.client.model_name(),
            "Starting analysis"
        );

        let (tx, mut rx) = mpsc::channel::<ProgressEvent>(16);
        let relay = async {
            while let Some(event) = rx.recv().await {
                let status = self.store.record_progress(&ticket.id, &event).await;
                if let (Some(updates), Some(status)) = (&updates, status) {
                    let update = JobUpdate {
                        job_id: ticket.id.clone(),
                        status,
                        event: event.clone(),
                    };
                    let _ = updates.send(update).await;
                }
                progress.emit(event.phase, event.message).await;
            }
        };
        let work = async {
            let sink = ProgressSink::new(tx);
            let result = self.execute(&request, &ticket, &sink).await;
            drop(sink);
            result
        };
        let ((), result) = tokio::join!(relay, work);

        self.finish(&ticket, result).await
    }

    /// Cancel the in-flight analysis. Returns the cancelled job id.
    pub async fn cancel(&self) -> Option<String> {
        self.store.cancel().await
    }

    async fn execute(
        &self,
        request: &AnalysisRequest,
        ticket: &JobTicket,
        progress: &ProgressSink,
    ) -> Result<AnalysisReport> {
        progress
            .emit(
                ProgressPhase::Initializing,
                initializing_message(request.site_count()),
            )
            .await;

        let instruction = build_instruction(request);
        let options = GenerationOptions::from(&self.config);
        let timeout = self.config.timeout();
        let call = tokio::time::timeout(
            timeout,
            self.client.generate(&instruction, &options, progress),
        );

        let raw = tokio::select! {
            _ = ticket.cancel.cancelled() => return Err(AnalysisError::Cancelled),
            outcome = call => match outcome {
                Ok(result) => result?,
                Err(_) => {
                    let millis = timeout.as_millis() as u64;
                    return Err(GenerationError::Timeout { millis }.into());
                }
            },
        };

        Ok(hydrate(&raw, &request.primary_url, &request.competitors)?)
    }

    async fn finish(
        &self,
        ticket: &JobTicket,
        result: Result<AnalysisReport>,
    ) -> Result<AnalysisReport> {
        match result {
            Ok(report) => {
                if !self.store.complete(&ticket.id, report.clone()).await {
                    // cancelled after the response arrived
                    return Err(AnalysisError::Cancelled);
                }
                info!(job_id = %ticket.id, report_id = %report.id, "Analysis completed");
                Ok(report)
            }
            Err(err) => {
                warn!(job_id = %ticket.id, error = %err, "Analysis failed");
                if err.is_job_failure() && self.store.fail(&ticket.id, err.user_message()).await {
                    self.schedule_reset(ticket.id.clone());
                }
                Err(err)
            }
        }
    }

    fn schedule_reset(&self, job_id: String) {
        let store = self.store.clone();
        let delay = self.config.reset_delay();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.reset_if_failed(&job_id).await;
        });
    }
}
