use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

pub mod health;
pub mod metrics;
pub mod roast;
pub mod webhooks;

/// Client and webhook API, mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/roast/generate", post(roast::generate_video))
        .route("/roast/status/{job_id}", get(roast::get_video_status))
        .route("/roast/user/{user_id}", get(roast::list_user_videos))
        .route("/webhooks/video-complete", post(webhooks::video_complete))
}

/// Full application router with middleware.
pub fn build_router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
}
