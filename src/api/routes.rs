//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cleanup_handler, get_entry_handler, health_handler, invalidate_entry_handler,
    invalidate_handler, list_entries_handler, passthrough_handler, set_entry_handler,
    set_ttl_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/*path` - Cached passthrough to the backend
/// - `GET /cache/entries` - List entries with age and TTL
/// - `PUT /cache/entries` - Store a value
/// - `GET /cache/entries/*key` - Read a fresh value
/// - `DELETE /cache/entries/*key` - Invalidate one key
/// - `DELETE /cache` - Clear, or invalidate by `?prefix=`
/// - `POST /cache/cleanup` - Remove stale entries now
/// - `PUT /cache/ttl` - Change a category TTL
/// - `GET /cache/stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (the admin UI is served from elsewhere)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/*path", get(passthrough_handler))
        .route("/cache", delete(invalidate_handler))
        .route(
            "/cache/entries",
            get(list_entries_handler).put(set_entry_handler),
        )
        .route(
            "/cache/entries/*key",
            get(get_entry_handler).delete(invalidate_entry_handler),
        )
        .route("/cache/cleanup", post(cleanup_handler))
        .route("/cache/ttl", put(set_ttl_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
