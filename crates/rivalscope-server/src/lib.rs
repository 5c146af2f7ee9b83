pub mod api;
pub mod error;
pub mod extractors;
pub mod sse;
pub mod state;
pub mod types;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Router backed by the Gemini client and environment configuration.
pub fn app_router() -> Router {
    app_router_with_state(AppState::new())
}

pub fn app_router_with_state(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::api_routes(state).layer(cors)
}
