//! API Routes
//!
//! Configures the Axum router with all stats endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_handler, entity_handler, evaluate_handler, health_handler, metrics_handler,
    progression_handler, sweep_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /metrics` - Fetch counters and cache totals
/// - `GET /entities/:kind/:name` - Stat formulas, optionally evaluated with `?level=N`
/// - `GET /entities/:kind/:name/progression` - One stat over a level range
/// - `POST /evaluate` - Evaluate caller-supplied formulas
/// - `POST /cache/sweep` - Delete stale cached documents now
/// - `GET /cache` - List cached documents
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/entities/:kind/:name", get(entity_handler))
        .route("/entities/:kind/:name/progression", get(progression_handler))
        .route("/evaluate", post(evaluate_handler))
        .route("/cache", get(cache_handler))
        .route("/cache/sweep", post(sweep_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
