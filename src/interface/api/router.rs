//! HTTP router: health, metrics and the session gateway

use super::metrics_handler::metrics_handler;
use crate::interface::gateway::{ws_handler, GatewayState};
use axum::{routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// Liveness probe
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the router
pub fn build_router(state: GatewayState, prometheus_handle: PrometheusHandle) -> Router {
    let health_routes = Router::new().route("/health", get(health_check));

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    let gateway_routes = Router::new()
        .route("/sessions/:room/ws", get(ws_handler))
        .with_state(state);

    Router::new()
        .merge(health_routes)
        .merge(metrics_routes)
        .merge(gateway_routes)
        .layer(TraceLayer::new_for_http())
}
