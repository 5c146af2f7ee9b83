use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use rivalscope_core::error::GenerationError;
use rivalscope_core::progress::{ProgressPhase, ProgressSink};

use crate::client::{
    CRAWLING_MESSAGE, GenerationClient, GenerationOptions, GenerationResult, SYNTHESIZING_MESSAGE,
};

enum MockReply {
    Text(String),
    Error(String),
    Empty,
}

/// Mock client for testing without HTTP.
///
/// Replies are consumed in order; once exhausted the last reply repeats.
pub struct MockGenerationClient {
    replies: Mutex<VecDeque<MockReply>>,
    delay: Duration,
    instructions: Mutex<Vec<String>>,
}

impl MockGenerationClient {
    fn from_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(replies)),
            delay: Duration::ZERO,
            instructions: Mutex::new(Vec::new()),
        }
    }

    /// Always returns the given text.
    pub fn completed(text: impl Into<String>) -> Self {
        Self::from_replies(vec![MockReply::Text(text.into())])
    }

    /// Always fails with a transport-level error.
    pub fn failing(error_msg: impl Into<String>) -> Self {
        Self::from_replies(vec![MockReply::Error(error_msg.into())])
    }

    /// Always answers with an empty payload.
    pub fn empty() -> Self {
        Self::from_replies(vec![MockReply::Empty])
    }

    /// Returns each text in turn.
    pub fn sequence(texts: Vec<String>) -> Self {
        Self::from_replies(texts.into_iter().map(MockReply::Text).collect())
    }

    /// Wait this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Instructions received so far, oldest first.
    pub fn instructions(&self) -> Vec<String> {
        self.instructions.lock().unwrap().clone()
    }

    fn next_reply(&self) -> GenerationResult<String> {
        let mut replies = self.replies.lock().unwrap();
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            None
        };
        let current = reply.as_ref().or_else(|| replies.front());
        match current {
            Some(MockReply::Text(text)) => Ok(text.clone()),
            Some(MockReply::Error(msg)) => Err(GenerationError::ApiRequest(msg.clone())),
            Some(MockReply::Empty) | None => Err(GenerationError::EmptyResponse),
        }
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn generate(
        &self,
        instruction: &str,
        _options: &GenerationOptions,
        progress: &ProgressSink,
    ) -> GenerationResult<String> {
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());
        progress.emit(ProgressPhase::Crawling, CRAWLING_MESSAGE).await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = self.next_reply()?;
        progress
            .emit(ProgressPhase::Synthesizing, SYNTHESIZING_MESSAGE)
            .await;
        Ok(reply)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    async fn call(client: &MockGenerationClient) -> GenerationResult<String> {
        client
            .generate("prompt", &GenerationOptions::default(), &ProgressSink::noop())
            .await
    }

    #[tokio::test]
    async fn completed_repeats_text() {
        let client = MockGenerationClient::completed("{}");
        assert_eq!(call(&client).await.unwrap(), "{}");
        assert_eq!(call(&client).await.unwrap(), "{}");
        assert_eq!(client.instructions(), vec!["prompt", "prompt"]);
    }

    #[tokio::test]
    async fn sequence_returns_in_order_then_repeats_last() {
        let client = MockGenerationClient::sequence(vec!["a".into(), "b".into()]);
        assert_eq!(call(&client).await.unwrap(), "a");
        assert_eq!(call(&client).await.unwrap(), "b");
        assert_eq!(call(&client).await.unwrap(), "b");
    }

    #[tokio::test]
    async fn failing_and_empty_map_to_errors() {
        let err = call(&MockGenerationClient::failing("boom")).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        let err = call(&MockGenerationClient::empty()).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn emits_crawling_then_synthesizing() {
        let (tx, mut rx) = mpsc::channel(8);
        let client = MockGenerationClient::completed("{}");
        client
            .generate("p", &GenerationOptions::default(), &ProgressSink::new(tx))
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().phase, ProgressPhase::Crawling);
        assert_eq!(rx.recv().await.unwrap().phase, ProgressPhase::Synthesizing);
    }

    #[tokio::test]
    async fn failure_skips_synthesizing() {
        let (tx, mut rx) = mpsc::channel(8);
        let client = MockGenerationClient::failing("down");
        let _ = client
            .generate("p", &GenerationOptions::default(), &ProgressSink::new(tx))
            .await;

        assert_eq!(rx.recv().await.unwrap().phase, ProgressPhase::Crawling);
        assert!(rx.recv().await.is_none());
    }
}
