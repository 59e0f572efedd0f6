//! Recording session management
//!
//! This module provides the `RecordingSession` abstraction that manages:
//! - Audio capture into a WAV file
//! - GPS track collection while recording
//! - The one-shot roads correction call and track reconciliation at stop
//! - Single-write persistence of the finished recording

mod config;
mod session;
mod stats;

pub use config::SessionConfig;
pub use session::RecordingSession;
pub use stats::SessionStats;
