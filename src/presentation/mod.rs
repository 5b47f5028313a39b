// Presentation layer - HTTP surface over the feed runtime
pub mod app_state;
pub mod error;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_feed, health_check, list_services, process_table, select_service, set_service_status,
    stream_feed, update_settings,
};
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/services", get(list_services))
        .route("/services/:id/status", put(set_service_status))
        .route("/feed", get(get_feed))
        .route("/feed/select/:id", post(select_service))
        .route("/feed/settings", put(update_settings))
        .route("/feed/processes", get(process_table))
        .route("/feed/stream", get(stream_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
