use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Availability map where a `null` cell means the company was not assessed.
fn availability_cells<'de, D>(deserializer: D) -> Result<BTreeMap<String, Availability>, D::Error>
where
    D: Deserializer<'de>,
{
    let cells = Option::<BTreeMap<String, Option<Availability>>>::deserialize(deserializer)?;
    Ok(cells
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(url, cell)| cell.map(|cell| (url, cell)))
        .collect())
}

// ---------------------------------------------------------------------------
// Report sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Brand colours as hex strings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: Vec<String>,
}

/// Availability of a feature for one company.
///
/// A string value means partial or qualified support, e.g. `"Enterprise only"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Availability {
    Flag(bool),
    Note(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    /// Normalized bucket grouping equivalent features across companies.
    #[serde(default, deserialize_with = "null_as_default")]
    pub canonical_feature: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidence_snippet: String,
    #[serde(default, deserialize_with = "availability_cells")]
    pub availability: BTreeMap<String, Availability>,
}

impl Feature {
    pub fn availability_for(&self, url: &str) -> Option<&Availability> {
        self.availability.get(url)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub tier_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub billing_cycle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features_included: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingModel {
    pub url: String,
    /// `None` when the trial offer could not be determined.
    #[serde(default)]
    pub has_free_trial: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    /// Empty when pricing is custom-quote only.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tiers: Vec<PricingTier>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetaHealth {
    #[serde(alias = "good", alias = "GOOD")]
    Good,
    #[serde(alias = "fair", alias = "FAIR")]
    Fair,
    #[serde(alias = "poor", alias = "POOR")]
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Freshness {
    #[serde(alias = "high", alias = "HIGH")]
    High,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "low", alias = "LOW")]
    Low,
}

impl std::fmt::Display for MetaHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "Good"),
            Self::Fair => write!(f, "Fair"),
            Self::Poor => write!(f, "Poor"),
        }
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoSignals {
    pub url: String,
    /// Estimated 0-100.
    pub page_speed_score: f64,
    pub meta_description_health: MetaHealth,
    #[serde(default, deserialize_with = "null_as_default")]
    pub schema_types: Vec<String>,
    pub blog_freshness: Freshness,
    #[serde(default)]
    pub mobile_friendly: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Swot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub opportunities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechStack {
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub frontend: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub backend: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub analytics: Vec<String>,
}

/// Placement on the strategic map. `x` is innovation, `y` is market presence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

// ---------------------------------------------------------------------------
// Report body and root aggregate
// ---------------------------------------------------------------------------

/// The model-produced part of a report, before identity fields are attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBody {
    #[serde(deserialize_with = "null_as_default")]
    pub profiles: Vec<CompanyProfile>,
    #[serde(deserialize_with = "null_as_default")]
    pub features: Vec<Feature>,
    #[serde(deserialize_with = "null_as_default")]
    pub pricing: Vec<PricingModel>,
    #[serde(deserialize_with = "null_as_default")]
    pub seo: Vec<SeoSignals>,
    #[serde(deserialize_with = "null_as_default")]
    pub swot: BTreeMap<String, Swot>,
    #[serde(deserialize_with = "null_as_default")]
    pub tech_stacks: Vec<TechStack>,
    #[serde(deserialize_with = "null_as_default")]
    pub market_positioning: BTreeMap<String, Position>,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
}

impl ReportBody {
    /// Top-level keys every generated payload must carry.
    pub const REQUIRED_FIELDS: [&'static str; 9] = [
        "profiles",
        "features",
        "pricing",
        "seo",
        "swot",
        "tech_stacks",
        "market_positioning",
        "summary",
        "recommendations",
    ];
}

/// A complete competitive analysis. Built once by hydration and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "primaryUrl")]
    pub primary_url: String,
    pub competitors: Vec<String>,
    #[serde(flatten)]
    pub body: ReportBody,
}

impl AnalysisReport {
    /// Primary URL followed by competitors, in submission order.
    pub fn urls(&self) -> Vec<&str> {
        std::iter::once(self.primary_url.as_str())
            .chain(self.competitors.iter().map(String::as_str))
            .collect()
    }

    pub fn is_primary(&self, url: &str) -> bool {
        self.primary_url == url
    }

    pub fn profile(&self, url: &str) -> Option<&CompanyProfile> {
        self.body.profiles.iter().find(|p| p.url == url)
    }

    pub fn pricing_for(&self, url: &str) -> Option<&PricingModel> {
        self.body.pricing.iter().find(|p| p.url == url)
    }

    pub fn seo_for(&self, url: &str) -> Option<&SeoSignals> {
        self.body.seo.iter().find(|s| s.url == url)
    }

    pub fn tech_stack_for(&self, url: &str) -> Option<&TechStack> {
        self.body.tech_stacks.iter().find(|t| t.url == url)
    }

    pub fn swot_for(&self, url: &str) -> Option<&Swot> {
        self.body.swot.get(url)
    }

    pub fn position_for(&self, url: &str) -> Option<&Position> {
        self.body.market_positioning.get(url)
    }
}
