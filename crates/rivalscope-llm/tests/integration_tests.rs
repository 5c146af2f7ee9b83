use tokio::sync::mpsc;

use rivalscope_core::progress::{ProgressPhase, ProgressSink};
use rivalscope_llm::client::{GenerationClient, GenerationOptions};
use rivalscope_llm::gemini::GeminiGenerationClient;

// ---------------------------------------------------------------------------
// Gemini integration tests
// Run with: cargo test -p rivalscope-llm --test integration_tests -- --ignored
// ---------------------------------------------------------------------------

#[tokio::test]
#[ignore]
async fn gemini_grounded_generation() {
    let key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY required");
    let client = GeminiGenerationClient::new(key, "gemini-2.5-flash");
    let (tx, mut rx) = mpsc::channel(8);

    let text = client
        .generate(
            "Using Google Search, state the current headquarters city of Stripe in one word.",
            &GenerationOptions::default(),
            &ProgressSink::new(tx),
        )
        .await
        .unwrap();
    assert!(!text.trim().is_empty());

    assert_eq!(rx.recv().await.unwrap().phase, ProgressPhase::Crawling);
    assert_eq!(rx.recv().await.unwrap().phase, ProgressPhase::Synthesizing);
}

#[tokio::test]
#[ignore]
async fn gemini_invalid_key_is_auth_or_request_error() {
    let client = GeminiGenerationClient::new("invalid-key", "gemini-2.5-flash");
    let result = client
        .generate("Say hello", &GenerationOptions::default(), &ProgressSink::noop())
        .await;
    assert!(result.is_err());
}
