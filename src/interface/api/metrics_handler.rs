//! Prometheus metrics handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!("switchboard_sessions_total", "Total number of call sessions accepted");
    describe_gauge!("switchboard_active_sessions", "Number of call sessions currently running");
    describe_counter!("switchboard_dtmf_digits_total", "Total number of DTMF digits received");
    describe_counter!(
        "switchboard_transfers_total",
        "Total number of transfer attempts by outcome"
    );

    Ok(handle)
}

/// HTTP metrics handler
pub async fn metrics_handler(State(prometheus_handle): State<PrometheusHandle>) -> Response {
    let metrics = prometheus_handle.render();
    (StatusCode::OK, metrics).into_response()
}
