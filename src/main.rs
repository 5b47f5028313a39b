// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::feed_runtime::FeedRuntime;
use crate::application::feed_simulator::FeedSimulator;
use crate::domain::service::ServiceId;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::synthetic_generator::SyntheticGenerator;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config()?;
    let initial: ServiceId = config.feed.initial_service.parse()?;

    // Create generator (infrastructure layer)
    let generator = SyntheticGenerator::new(config.feed.seed, config.generator_options());

    // Create simulator and schedules (application layer)
    let simulator = FeedSimulator::new(
        Box::new(generator),
        config.feed_options(),
        config.settings(),
        initial,
    );
    let feed = Arc::new(FeedRuntime::start(simulator, config.timing()));

    let state = Arc::new(AppState { feed: feed.clone() });

    // Build router (presentation layer)
    let router = presentation::router(state);

    // Start server
    let addr: SocketAddr = config.server.addr.parse()?;
    tracing::info!("Starting service-health feed on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    feed.shutdown().await;

    Ok(())
}
