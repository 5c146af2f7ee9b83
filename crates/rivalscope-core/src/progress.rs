use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Coarse phase a progress message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    Initializing,
    Crawling,
    Synthesizing,
}

/// A human-readable status update emitted while a report is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub phase: ProgressPhase,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(phase: ProgressPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
        }
    }
}

/// Ordered channel for progress events.
///
/// Sends never fail the caller: a dropped receiver just means nobody is
/// listening any more.
#[derive(Debug, Clone, Default)]
pub struct ProgressSink {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that discards every event.
    pub fn noop() -> Self {
        Self::default()
    }

    pub async fn emit(&self, phase: ProgressPhase, message: impl Into<String>) {
        let event = ProgressEvent::new(phase, message);
        tracing::debug!(phase = ?event.phase, message = %event.message, "Progress");
        if let Some(tx) = &self.tx
            && tx.send(event).await.is_err()
        {
            tracing::debug!("Progress receiver dropped");
        }
    }
}
