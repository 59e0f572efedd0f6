use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/recordings/start", post(handlers::start_recording))
        .route("/recordings/stop", post(handlers::stop_recording))
        .route("/recordings/status", get(handlers::recording_status))
        // Sample data (static segment must sit beside the :id capture)
        .route(
            "/recordings/samples",
            post(handlers::seed_samples).delete(handlers::delete_samples),
        )
        // Stored recordings
        .route(
            "/recordings",
            get(handlers::list_recordings).delete(handlers::delete_all_recordings),
        )
        .route(
            "/recordings/:id",
            get(handlers::get_recording).delete(handlers::delete_recording),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
