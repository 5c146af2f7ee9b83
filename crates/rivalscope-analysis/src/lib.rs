pub mod hydrate;
pub mod job;
pub mod pipeline;
pub mod prompt;
pub mod request;
pub mod view;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::hydrate::{hydrate, strip_fences};
    pub use crate::job::{
        JobEvent, JobSnapshot, JobStatus, JobStore, JobTicket, JobUpdate, transition,
    };
    pub use crate::pipeline::AnalysisRunner;
    pub use crate::prompt::build_instruction;
    pub use crate::request::AnalysisRequest;
    pub use crate::view::{
        FeatureCell, FeatureDensity, PositionPoint, ReportView, SeoCell, SeoMetric,
        feature_density, positioning_series, seo_cell,
    };
}
