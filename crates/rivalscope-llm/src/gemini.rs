use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use rivalscope_core::error::GenerationError;
use rivalscope_core::progress::{ProgressPhase, ProgressSink};

use crate::client::{
    CRAWLING_MESSAGE, GenerationClient, GenerationOptions, GenerationResult, SYNTHESIZING_MESSAGE,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// ---------------------------------------------------------------------------
// Gemini API request types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Tool entry enabling Google Search grounding.
#[derive(Debug, Serialize)]
pub struct GeminiTool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Default, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

// ---------------------------------------------------------------------------
// Gemini API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    pub candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "usageMetadata")]
    pub usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
    #[serde(rename = "groundingMetadata")]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct GroundingMetadata {
    #[serde(rename = "webSearchQueries", default)]
    pub web_search_queries: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiUsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    pub prompt_token_count: u64,
    #[serde(rename = "candidatesTokenCount", default)]
    pub candidates_token_count: u64,
    #[serde(rename = "totalTokenCount", default)]
    pub total_token_count: u64,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.as_ref()?.first()?;
        let parts = &candidate.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        Some(text)
    }
}

// ---------------------------------------------------------------------------
// GeminiGenerationClient
// ---------------------------------------------------------------------------

pub struct GeminiGenerationClient {
    api_key: String,
    model_id: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiGenerationClient {
    pub fn new(api_key: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_id: model_id.into(),
            base_url: DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different endpoint (for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model_id, self.api_key
        )
    }

    pub fn build_request(&self, instruction: &str, options: &GenerationOptions) -> GeminiRequest {
        let generation_config = options.temperature.map(|temperature| GenerationConfig {
            temperature: Some(temperature),
        });

        let tools = if options.search_grounding {
            Some(vec![GeminiTool {
                google_search: GoogleSearch::default(),
            }])
        } else {
            None
        };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart {
                    text: Some(instruction.to_string()),
                }],
            }],
            generation_config,
            tools,
        }
    }

    fn map_status_error(status: StatusCode, body: String) -> GenerationError {
        match status.as_u16() {
            401 | 403 => GenerationError::Auth(body),
            429 => GenerationError::RateLimited {
                retry_after_secs: None,
            },
            _ => GenerationError::ApiRequest(format!("HTTP {status}: {body}")),
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiGenerationClient {
    async fn generate(
        &self,
        instruction: &str,
        options: &GenerationOptions,
        progress: &ProgressSink,
    ) -> GenerationResult<String> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::MissingApiKey("gemini".into()));
        }

        progress.emit(ProgressPhase::Crawling, CRAWLING_MESSAGE).await;

        let request_body = self.build_request(instruction, options);
        info!(model = %self.model_id, grounded = options.search_grounding, "Sending generateContent POST");

        let response = self
            .client
            .post(self.generate_url())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "generateContent POST failed");
                GenerationError::ApiRequest(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read response body".into());
            warn!(%status, body = %body, "Gemini API error");
            return Err(Self::map_status_error(status, body));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        progress
            .emit(ProgressPhase::Synthesizing, SYNTHESIZING_MESSAGE)
            .await;

        if let Some(usage) = &gemini_response.usage_metadata {
            info!(
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Gemini usage"
            );
        }
        if let Some(candidate) = gemini_response.candidates.as_ref().and_then(|c| c.first()) {
            let queries = candidate
                .grounding_metadata
                .as_ref()
                .map(|g| g.web_search_queries.len())
                .unwrap_or(0);
            info!(finish_reason = ?candidate.finish_reason, search_queries = queries, "Gemini candidate received");
        }

        match gemini_response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                warn!("Gemini response carried no text");
                Err(GenerationError::EmptyResponse)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> GeminiGenerationClient {
        GeminiGenerationClient::new("test-key", "gemini-2.5-flash")
    }

    #[test]
    fn build_request_grounded() {
        let client = make_client();
        let req = client.build_request("Analyze acme.com", &GenerationOptions::default());
        assert_eq!(req.contents.len(), 1);
        assert_eq!(req.contents[0].role.as_deref(), Some("user"));
        assert_eq!(req.contents[0].parts[0].text.as_deref(), Some("Analyze acme.com"));
        assert_eq!(req.generation_config.unwrap().temperature, Some(0.2));
        assert_eq!(req.tools.unwrap().len(), 1);
    }

    #[test]
    fn build_request_serializes_google_search_tool() {
        let client = make_client();
        let req = client.build_request("x", &GenerationOptions::default());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["tools"][0]["google_search"], serde_json::json!({}));
        assert_eq!(value["generation_config"]["temperature"], 0.2);
    }

    #[test]
    fn build_request_without_grounding() {
        let client = make_client();
        let options = GenerationOptions {
            temperature: None,
            search_grounding: false,
        };
        let req = client.build_request("x", &options);
        assert!(req.tools.is_none());
        assert!(req.generation_config.is_none());
    }

    #[test]
    fn generate_url_includes_model_and_key() {
        let client = make_client().with_base_url("http://localhost:9999");
        assert_eq!(
            client.generate_url(),
            "http://localhost:9999/models/gemini-2.5-flash:generateContent?key=test-key"
        );
        assert_eq!(client.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn parse_response_joins_text_parts() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "{\"summary\":"}, {"text": " \"ok\"}"}],
                    "role": "model"
                },
                "finishReason": "STOP",
                "groundingMetadata": {"webSearchQueries": ["acme pricing"]}
            }],
            "usageMetadata": {
                "promptTokenCount": 5,
                "candidatesTokenCount": 2,
                "totalTokenCount": 7
            }
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text().as_deref(), Some("{\"summary\": \"ok\"}"));
        let candidate = &resp.candidates.as_ref().unwrap()[0];
        assert_eq!(
            candidate.grounding_metadata.as_ref().unwrap().web_search_queries,
            vec!["acme pricing"]
        );
        assert_eq!(resp.usage_metadata.unwrap().total_token_count, 7);
    }

    #[test]
    fn parse_response_empty_candidates() {
        let resp: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(resp.text().is_none());
    }

    #[test]
    fn parse_response_blocked_candidate_without_content() {
        let resp: GeminiResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert!(resp.text().is_none());
    }

    #[test]
    fn status_errors_map_to_generation_errors() {
        assert!(matches!(
            GeminiGenerationClient::map_status_error(StatusCode::UNAUTHORIZED, "no".into()),
            GenerationError::Auth(_)
        ));
        assert!(matches!(
            GeminiGenerationClient::map_status_error(StatusCode::TOO_MANY_REQUESTS, String::new()),
            GenerationError::RateLimited { .. }
        ));
        assert!(matches!(
            GeminiGenerationClient::map_status_error(StatusCode::BAD_GATEWAY, "down".into()),
            GenerationError::ApiRequest(_)
        ));
    }

    #[tokio::test]
    async fn missing_key_fails_before_request() {
        let client = GeminiGenerationClient::new("", "gemini-2.5-flash");
        let result = client
            .generate("x", &GenerationOptions::default(), &ProgressSink::noop())
            .await;
        assert!(matches!(result, Err(GenerationError::MissingApiKey(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_api_request_error() {
        let client = make_client().with_base_url("http://127.0.0.1:1");
        let result = client
            .generate("x", &GenerationOptions::default(), &ProgressSink::noop())
            .await;
        assert!(matches!(result, Err(GenerationError::ApiRequest(_))));
    }
}
