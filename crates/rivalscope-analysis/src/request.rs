use serde::{Deserialize, Serialize};

use rivalscope_core::error::{AnalysisError, Result};

/// A request to analyze one primary company against its competitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub primary_url: String,
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl AnalysisRequest {
    /// Build a request from URLs exactly as given.
    pub fn new(primary_url: impl Into<String>, competitors: Vec<String>) -> Self {
        Self {
            primary_url: primary_url.into(),
            competitors,
        }
    }

    /// Build a request from raw form input: trims every URL and drops blank
    /// competitor entries.
    pub fn from_form(primary_url: &str, competitors: &[String]) -> Self {
        Self {
            primary_url: primary_url.trim().to_string(),
            competitors: competitors
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    /// Reject requests that must never reach the generation service.
    pub fn validate(&self, max_competitors: usize) -> Result<()> {
        if self.primary_url.trim().is_empty() {
            return Err(AnalysisError::InvalidRequest("primary URL is empty".into()));
        }
        if self.competitors.len() > max_competitors {
            return Err(AnalysisError::InvalidRequest(format!(
                "at most {max_competitors} competitors are supported, got {}",
                self.competitors.len()
            )));
        }
        if self.competitors.iter().any(|c| c.trim().is_empty()) {
            return Err(AnalysisError::InvalidRequest(
                "competitor URLs must not be blank".into(),
            ));
        }
        Ok(())
    }

    /// Number of sites in scope, primary included.
    pub fn site_count(&self) -> usize {
        1 + self.competitors.len()
    }

    /// Primary URL followed by competitors.
    pub fn urls(&self) -> Vec<&str> {
        std::iter::once(self.primary_url.as_str())
            .chain(self.competitors.iter().map(String::as_str))
            .collect()
    }
}
