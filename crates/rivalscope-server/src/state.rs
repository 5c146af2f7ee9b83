use std::sync::Arc;

use rivalscope_analysis::job::JobStore;
use rivalscope_analysis::pipeline::AnalysisRunner;
use rivalscope_core::config::AnalysisConfig;
use rivalscope_llm::client::GenerationClient;
use rivalscope_llm::gemini::GeminiGenerationClient;

/// Builds a generation client for a request's API key.
pub type ClientFactory = Arc<dyn Fn(&str, &AnalysisConfig) -> Arc<dyn GenerationClient> + Send + Sync>;

fn gemini_client(api_key: &str, config: &AnalysisConfig) -> Arc<dyn GenerationClient> {
    Arc::new(GeminiGenerationClient::new(api_key, config.model.clone()))
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: JobStore,
    pub config: AnalysisConfig,
    client_factory: ClientFactory,
}

impl AppState {
    /// Gemini-backed state configured from the environment.
    pub fn new() -> Self {
        Self::with_client_factory(AnalysisConfig::from_env(), Arc::new(gemini_client))
    }

    pub fn with_client_factory(config: AnalysisConfig, client_factory: ClientFactory) -> Self {
        Self {
            store: JobStore::new(),
            config,
            client_factory,
        }
    }

    /// Use one client for every request regardless of API key (for testing).
    pub fn with_client(config: AnalysisConfig, client: Arc<dyn GenerationClient>) -> Self {
        Self::with_client_factory(
            config,
            Arc::new(move |_: &str, _: &AnalysisConfig| client.clone()),
        )
    }

    /// A runner sharing this state's job store.
    pub fn runner(&self, api_key: &str) -> AnalysisRunner {
        let client = (self.client_factory)(api_key, &self.config);
        AnalysisRunner::new(client)
            .with_config(self.config.clone())
            .with_store(self.store.clone())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
