pub mod analysis;
pub mod report;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest(
            "/api",
            analysis::routes()
                .merge(report::routes())
                .with_state(state),
        )
}
