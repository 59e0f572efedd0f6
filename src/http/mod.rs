//! HTTP control API
//!
//! REST surface replacing the original application's UI:
//! - POST /recordings/start - Start the (single) recording session
//! - POST /recordings/stop - Stop it, reconcile the track, persist
//! - GET  /recordings/status - Active-session statistics
//! - GET  /recordings - List recordings (optional ?title= filter)
//! - GET  /recordings/:id - One recording with its full track
//! - DELETE /recordings/:id | /recordings - Delete one / all
//! - POST|DELETE /recordings/samples - Seed / remove demo recordings
//! - GET  /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, ServiceSettings};
