pub mod client;
pub mod gemini;
pub mod mock;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::client::{GenerationClient, GenerationOptions, GenerationResult};
    pub use crate::gemini::GeminiGenerationClient;
    pub use crate::mock::MockGenerationClient;
}
