pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::cv::handlers as cv;
use crate::insights::handlers as insights;
use crate::observability::{metrics_handler, track_requests};
use crate::security;
use crate::state::AppState;

/// Composition root: routes, per-route metrics, then the security stack.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();
    let metrics = state.metrics.clone();

    let router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/metrics", get(metrics_handler))
        // CV API
        .route("/upload", post(cv::handle_upload))
        .route("/upload/", post(cv::handle_upload))
        .route("/improve", post(cv::handle_improve))
        .route("/improve/", post(cv::handle_improve))
        // Career insights API
        .route(
            "/career-insights",
            post(insights::handle_career_insights),
        )
        .route_layer(middleware::from_fn_with_state(metrics, track_requests))
        .with_state(state);

    security::harden(router, &config)
}
