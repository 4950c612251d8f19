//! HERMES web server
//!
//! Run with: cargo run -p hermes-web --bin hermes

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hermes_config::Config;
use hermes_web::router::build_router;
use hermes_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hermes_web=debug,hermes_client=debug,info")),
        )
        .init();

    info!("Starting HERMES...");

    let config = Config::load().context("loading configuration")?;
    info!("Classification service: {}", config.api.base_url);

    let bind = config.server.bind.clone();
    let state = AppState::from_config(config).context("building HTTP client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
