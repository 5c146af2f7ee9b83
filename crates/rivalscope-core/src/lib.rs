pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod urls;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::error::{AnalysisError, GenerationError, MalformedResponse, Result};
    pub use crate::progress::{ProgressEvent, ProgressPhase, ProgressSink};
    pub use crate::report::{
        AnalysisReport, Availability, CompanyProfile, Feature, Freshness, MetaHealth, Position,
        PricingModel, PricingTier, SeoSignals, Swot, TechStack,
    };
    pub use crate::urls::{canonical_key, display_label};
}
