use axum::extract::State;
use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Register descriptions for the relay's metrics.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "roast_jobs_submitted_total",
        "Generation jobs accepted by the AI service"
    );
    metrics::describe_counter!(
        "roast_webhooks_received_total",
        "Status webhooks received, labelled by reported status"
    );
    metrics::describe_counter!(
        "roast_notifications_failed_total",
        "Push notifications that failed or timed out"
    );
    metrics::describe_histogram!(
        "generation_request_seconds",
        "Latency of calls to the AI service"
    );
}

/// `/metrics` scrape endpoint, carrying its own state.
pub fn router(handle: Arc<PrometheusHandle>) -> Router {
    Router::new()
        .route("/metrics", get(prometheus_metrics))
        .with_state(handle)
}

/// Prometheus text exposition format.
async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> String {
    handle.render()
}
