// HTTP request handlers
use crate::domain::service::{ServiceId, ServiceInfo, ServiceStatus};
use crate::domain::telemetry::Settings;
use crate::infrastructure::chunked_json::stream_from_broadcast;
use crate::infrastructure::http_response::json_response;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Response},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type ApiResult = Result<Response<Body>, ApiError>;

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Whether the client accepts Brotli compression
fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false)
}

async fn respond<T: Serialize>(data: &T, headers: &HeaderMap) -> ApiResult {
    json_response(data, accepts_brotli(headers))
        .await
        .map_err(ApiError::Encoding)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List the monitored services with their current status
pub async fn list_services(headers: HeaderMap, State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.feed.snapshot().await;
    let services: Vec<ServiceInfo> = ServiceId::ALL
        .into_iter()
        .map(|id| ServiceInfo {
            id,
            name: id.name().to_string(),
            status: snapshot
                .service_status
                .get(&id)
                .copied()
                .unwrap_or(ServiceStatus::Running),
        })
        .collect();

    respond(&services, &headers).await
}

/// Current feed snapshot
pub async fn get_feed(headers: HeaderMap, State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state.feed.snapshot().await;
    respond(&snapshot, &headers).await
}

pub async fn select_service(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> ApiResult {
    let service: ServiceId = id.parse()?;
    let snapshot = state.feed.select(service).await;
    respond(&snapshot, &headers).await
}

pub async fn update_settings(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> ApiResult {
    if !settings.interval_in_range() {
        return Err(ApiError::InvalidInterval);
    }
    let snapshot = state.feed.configure(settings).await;
    respond(&snapshot, &headers).await
}

/// Force a service's running/stopped status
pub async fn set_service_status(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<StatusRequest>,
) -> ApiResult {
    let service: ServiceId = id.parse()?;
    let status: ServiceStatus = request.status.parse()?;
    let snapshot = state.feed.set_service_status(service, status).await;
    respond(&snapshot, &headers).await
}

/// Process table for the selected service
pub async fn process_table(headers: HeaderMap, State(state): State<Arc<AppState>>) -> ApiResult {
    let rows = state.feed.process_table().await;
    respond(&rows, &headers).await
}

/// Stream snapshots as they are produced
pub async fn stream_feed(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);

    // subscribe first so nothing published after the initial snapshot is missed
    let rx = state.feed.subscribe();
    let initial = state.feed.snapshot().await;
    stream_from_broadcast(initial, rx, compress).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::feed_runtime::{FeedRuntime, RuntimeTiming};
    use crate::application::feed_simulator::{FeedOptions, FeedSimulator};
    use crate::domain::telemetry::ConnectionStatus;
    use crate::infrastructure::synthetic_generator::{GeneratorOptions, SyntheticGenerator};
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    fn state() -> Arc<AppState> {
        let generator = SyntheticGenerator::new(Some(1), GeneratorOptions::default());
        let simulator = FeedSimulator::new(
            Box::new(generator),
            FeedOptions::default(),
            Settings::default(),
            ServiceId::Service1,
        );
        Arc::new(AppState {
            feed: Arc::new(FeedRuntime::start(simulator, RuntimeTiming::default())),
        })
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_accepts_brotli() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_brotli(&headers));
        headers.insert("accept-encoding", "gzip, br".parse().unwrap());
        assert!(accepts_brotli(&headers));
    }

    #[tokio::test]
    async fn test_list_services() {
        let response = list_services(HeaderMap::new(), State(state())).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[1]["id"], "service2");
        assert_eq!(json[1]["name"], "Payment Gateway");
        assert_eq!(json[1]["status"], "running");
    }

    #[tokio::test]
    async fn test_select_unknown_service_is_bad_request() {
        let err = select_service(Path("service9".to_string()), HeaderMap::new(), State(state()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_select_returns_connecting_snapshot() {
        let response = select_service(Path("service3".to_string()), HeaderMap::new(), State(state()))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["service"], "service3");
        assert_eq!(json["connection"], "connecting");
        assert_eq!(json["history"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let settings = Settings {
            interval: 0,
            ..Settings::default()
        };
        let err = update_settings(HeaderMap::new(), State(state()), Json(settings))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInterval));
    }

    #[tokio::test]
    async fn test_oversized_interval_rejected() {
        let state = state();
        let settings = Settings {
            interval: u64::MAX,
            ..Settings::default()
        };
        let err = update_settings(HeaderMap::new(), State(state.clone()), Json(settings))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInterval));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.feed.snapshot().await.settings, Settings::default());
    }

    #[tokio::test]
    async fn test_update_settings_round_trip() {
        let state = state();
        let settings = Settings {
            realtime: false,
            interval: 2,
            log_auto_scroll: false,
        };
        let response = update_settings(HeaderMap::new(), State(state.clone()), Json(settings))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["settings"]["realtime"], false);
        assert_eq!(json["settings"]["logAutoScroll"], false);
        assert_eq!(state.feed.snapshot().await.settings, settings);
    }

    #[tokio::test]
    async fn test_force_stopped_status_logs_error() {
        let state = state();
        let request = StatusRequest {
            status: "stopped".to_string(),
        };
        let response = set_service_status(
            Path("service1".to_string()),
            HeaderMap::new(),
            State(state.clone()),
            Json(request),
        )
        .await
        .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["serviceStatus"]["service1"], "stopped");
        assert_eq!(json["logs"][0]["level"], "error");
        assert_eq!(state.feed.snapshot().await.connection, ConnectionStatus::Connecting);
    }

    #[tokio::test]
    async fn test_invalid_status_token() {
        let request = StatusRequest {
            status: "paused".to_string(),
        };
        let err = set_service_status(Path("service1".to_string()), HeaderMap::new(), State(state()), Json(request))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnknownStatus(_)));
    }
}
