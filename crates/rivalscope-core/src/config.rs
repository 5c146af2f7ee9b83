use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const MAX_COMPETITORS: usize = 4;

/// Configuration for a competitive analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Model identifier sent to the generation service.
    pub model: String,

    /// Sampling temperature. Kept low so the JSON shape stays stable.
    pub temperature: f64,

    /// Enable search grounding on the generation request.
    pub search_grounding: bool,

    /// Upper bound on a single generation call. Never zero.
    pub timeout_ms: u64,

    /// Delay before a failed job returns to idle.
    pub reset_delay_ms: u64,

    /// Maximum number of competitor URLs per request.
    pub max_competitors: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            temperature: 0.2,
            search_grounding: true,
            timeout_ms: 120_000,
            reset_delay_ms: 3000,
            max_competitors: MAX_COMPETITORS,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `RIVALSCOPE_*` environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model) = std::env::var("RIVALSCOPE_MODEL")
            && !model.trim().is_empty()
        {
            config.model = model.trim().to_string();
        }
        match env_number("RIVALSCOPE_TIMEOUT_SECS") {
            Some(0) => tracing::warn!("Ignoring zero RIVALSCOPE_TIMEOUT_SECS"),
            Some(secs) => config.timeout_ms = secs.saturating_mul(1000),
            None => {}
        }
        if let Some(ms) = env_number("RIVALSCOPE_RESET_DELAY_MS") {
            config.reset_delay_ms = ms;
        }
        config
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_search_grounding(mut self, enabled: bool) -> Self {
        self.search_grounding = enabled;
        self
    }

    /// Sub-millisecond values round up to 1 ms.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX).max(1);
        self
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

fn env_number(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable config value");
            None
        }
    }
}
