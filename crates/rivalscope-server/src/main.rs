use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rivalscope_server=info,rivalscope_analysis=info".into()),
        )
        .init();

    let app = rivalscope_server::app_router();

    let addr = std::env::var("RIVALSCOPE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.into());
    tracing::info!("Rivalscope server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await
}
