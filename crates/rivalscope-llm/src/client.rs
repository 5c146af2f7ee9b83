use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use rivalscope_core::config::AnalysisConfig;
use rivalscope_core::error::GenerationError;
use rivalscope_core::progress::ProgressSink;

pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

pub const CRAWLING_MESSAGE: &str = "Crawling and extracting deep insights (SWOT, Pricing, Tech)...";
pub const SYNTHESIZING_MESSAGE: &str = "Synthesizing strategic report...";

/// Options controlling a single generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling temperature (0.0 - 2.0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Let the model ground its answer in live search results.
    #[serde(default)]
    pub search_grounding: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.2),
            search_grounding: true,
        }
    }
}

impl From<&AnalysisConfig> for GenerationOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            temperature: Some(config.temperature),
            search_grounding: config.search_grounding,
        }
    }
}

/// A text-generation service that turns an instruction into raw text.
///
/// Implementations report `Crawling` before the request goes out and
/// `Synthesizing` once a response arrives. Every failure, including an empty
/// payload, is a single `GenerationError`; no partial text is returned and
/// no retries are attempted.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        instruction: &str,
        options: &GenerationOptions,
        progress: &ProgressSink,
    ) -> GenerationResult<String>;

    /// Return the model name/identifier.
    fn model_name(&self) -> &str;
}
