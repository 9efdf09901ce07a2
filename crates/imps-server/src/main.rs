//! IMPS Server - REST backend for mission planning

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imps_server::api;
use imps_server::config::Config;
use imps_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("imps_server=debug".parse()?)
            .add_directive("imps_core=debug".parse()?))
        .init();

    tracing::info!("Starting IMPS Server...");

    let config = Config::from_env();
    let port = config.server_port;
    let state = Arc::new(AppState::new(&config)?);
    tracing::info!(
        "Planner grid {}x{}, scenarios in {}",
        config.planner.grid_size,
        config.planner.grid_size,
        config.scenario_dir.display()
    );

    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
