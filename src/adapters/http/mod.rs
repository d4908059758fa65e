//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the full service: subscription endpoints under
//! `/api`, a liveness probe at `/health`, request tracing and a per-request
//! timeout.

pub mod subscription;

use std::time::Duration;

use axum::{routing::get, Json, Router};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use subscription::{subscription_router, SubscriptionAppState};

/// Build the application router.
pub fn app_router(state: SubscriptionAppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", subscription_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
}

/// GET /health - Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
