use super::state::AppState;
use crate::audio::{AudioBackendConfig, AudioBackendFactory, AudioProbe};
use crate::gps::{GpsCollector, LocationRequest, LocationSourceFactory};
use crate::roads::{load_sample_track, SAMPLE_TRACK_JSON};
use crate::session::{RecordingSession, SessionConfig, SessionStats};
use crate::storage::Recording;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const SAMPLE_RECORDING_COUNT: usize = 10;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StopRecordingRequest {
    /// Title for the persisted recording
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub recording_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub recording: RecordingSummary,
    pub status: String,
    pub stats: SessionStats,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Title substring filter
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordingSummary {
    pub id: String,
    pub title: String,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
    pub points: usize,
    pub is_sample: bool,
}

impl From<&Recording> for RecordingSummary {
    fn from(recording: &Recording) -> Self {
        Self {
            id: recording.id.clone(),
            title: recording.title.clone(),
            duration_ms: recording.duration_ms,
            created_at: recording.created_at,
            points: recording.track.len(),
            is_sample: recording.is_sample,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: usize,
}

#[derive(Debug, Serialize)]
pub struct SeededResponse {
    pub seeded: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn internal_error(message: String) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { error: message }),
    )
        .into_response()
}

// ============================================================================
// Recording control
// ============================================================================

/// POST /recordings/start
/// Start the recording session (one at a time)
pub async fn start_recording(State(state): State<AppState>) -> impl IntoResponse {
    // The slot lock is held across check, build and start: two concurrent
    // starts must not both pass the check and orphan one session.
    let mut active = state.active.write().await;
    if active.is_some() {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "a recording is already in progress".to_string(),
            }),
        )
            .into_response();
    }

    let settings = &state.settings;

    let config = SessionConfig {
        output_dir: settings.recordings_path.clone(),
        sample_rate: settings.sample_rate,
        channels: settings.channels,
        location: LocationRequest {
            interval: Duration::from_millis(settings.location.interval_ms),
            fastest_interval: Duration::from_millis(settings.location.fastest_interval_ms),
        },
        ..SessionConfig::default()
    };

    let backend = match AudioBackendFactory::create(
        settings.audio_source.clone(),
        AudioBackendConfig {
            sample_rate: settings.sample_rate,
            channels: settings.channels,
            ..AudioBackendConfig::default()
        },
    ) {
        Ok(backend) => backend,
        Err(e) => {
            error!("failed to create audio backend: {e:#}");
            return internal_error(format!("failed to create audio backend: {e}"));
        }
    };

    let source = match LocationSourceFactory::create(&settings.location) {
        Ok(source) => source,
        Err(e) => {
            error!("failed to create location source: {e:#}");
            return internal_error(format!("failed to create location source: {e}"));
        }
    };
    let collector = GpsCollector::new(source, config.location.clone());

    let session = Arc::new(RecordingSession::new(
        config,
        state.store.clone(),
        Arc::clone(&state.snap_service),
        Arc::clone(&state.connectivity),
        backend,
        collector,
    ));

    if let Err(e) = session.start().await {
        error!("failed to start recording: {e:#}");
        return internal_error(format!("failed to start recording: {e}"));
    }

    let recording_id = session.recording_id().to_string();
    *active = Some(session);
    drop(active);

    info!(%recording_id, "recording started");

    (
        StatusCode::OK,
        Json(StartRecordingResponse {
            recording_id: recording_id.clone(),
            status: "recording".to_string(),
            message: format!("recording {recording_id} started"),
        }),
    )
        .into_response()
}

/// POST /recordings/stop
/// Stop the active session, reconcile its track and persist it
pub async fn stop_recording(
    State(state): State<AppState>,
    body: Option<Json<StopRecordingRequest>>,
) -> impl IntoResponse {
    let session = {
        let mut active = state.active.write().await;
        active.take()
    };

    let Some(session) = session else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no recording in progress".to_string(),
            }),
        )
            .into_response();
    };

    let title = body
        .and_then(|Json(req)| req.title)
        .unwrap_or_else(|| format!("Recording {}", Utc::now().format("%Y-%m-%d %H:%M")));

    let stats = session.stats().await;

    match session.stop(title).await {
        Ok(recording) => {
            info!(recording_id = %recording.id, "recording stopped");
            (
                StatusCode::OK,
                Json(StopRecordingResponse {
                    recording: RecordingSummary::from(&recording),
                    status: "stopped".to_string(),
                    stats: SessionStats {
                        is_recording: false,
                        ..stats
                    },
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("failed to stop recording: {e:#}");
            internal_error(format!("failed to stop recording: {e}"))
        }
    }
}

/// GET /recordings/status
/// Statistics of the active session
pub async fn recording_status(State(state): State<AppState>) -> impl IntoResponse {
    let active = state.active.read().await;

    match active.as_ref() {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no recording in progress".to_string(),
            }),
        )
            .into_response(),
    }
}

// ============================================================================
// Stored recordings
// ============================================================================

/// GET /recordings?title=
pub async fn list_recordings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse {
    match state.store.list(query.title).await {
        Ok(recordings) => {
            let summaries: Vec<RecordingSummary> =
                recordings.iter().map(RecordingSummary::from).collect();
            (StatusCode::OK, Json(summaries)).into_response()
        }
        Err(e) => {
            error!("failed to list recordings: {e:#}");
            internal_error(format!("failed to list recordings: {e}"))
        }
    }
}

/// GET /recordings/:id — full recording including its track
pub async fn get_recording(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.get(&id).await {
        Ok(Some(recording)) => (StatusCode::OK, Json(recording)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("recording {id} not found"),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("failed to load recording: {e:#}");
            internal_error(format!("failed to load recording: {e}"))
        }
    }
}

/// DELETE /recordings/:id
pub async fn delete_recording(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete(&id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("recording {id} not found"),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("failed to delete recording: {e:#}");
            internal_error(format!("failed to delete recording: {e}"))
        }
    }
}

/// DELETE /recordings
pub async fn delete_all_recordings(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.delete_all().await {
        Ok(deleted) => (StatusCode::OK, Json(DeletedResponse { deleted })).into_response(),
        Err(e) => {
            error!("failed to delete recordings: {e:#}");
            internal_error(format!("failed to delete recordings: {e}"))
        }
    }
}

// ============================================================================
// Sample recordings
// ============================================================================

/// POST /recordings/samples
/// Seed demo recordings from the bundled snapped-points fixture
pub async fn seed_samples(State(state): State<AppState>) -> impl IntoResponse {
    let track = match load_sample_track(SAMPLE_TRACK_JSON) {
        Ok(track) => track,
        Err(e) => {
            error!("failed to load sample track: {e:#}");
            return internal_error(format!("failed to load sample track: {e}"));
        }
    };

    let sample_audio = state.settings.sample_audio_path.clone().unwrap_or_default();
    let duration_ms = match AudioProbe::open(&sample_audio) {
        Ok(probe) => probe.duration_ms,
        Err(_) => {
            warn!("sample audio unavailable, seeding with zero duration");
            0
        }
    };

    let recordings: Vec<Recording> = (0..SAMPLE_RECORDING_COUNT)
        .map(|i| Recording {
            id: format!("sample-{}", uuid::Uuid::new_v4()),
            title: format!("Sample recording {i}"),
            audio_path: sample_audio.clone(),
            duration_ms,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            track: track.clone(),
            is_sample: true,
        })
        .collect();

    let count = recordings.len();
    match state.store.insert_many(recordings).await {
        Ok(()) => {
            info!(count, "sample recordings seeded");
            (StatusCode::OK, Json(SeededResponse { seeded: count })).into_response()
        }
        Err(e) => {
            error!("failed to seed sample recordings: {e:#}");
            internal_error(format!("failed to seed sample recordings: {e}"))
        }
    }
}

/// DELETE /recordings/samples
pub async fn delete_samples(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.delete_samples().await {
        Ok(deleted) => (StatusCode::OK, Json(DeletedResponse { deleted })).into_response(),
        Err(e) => {
            error!("failed to delete sample recordings: {e:#}");
            internal_error(format!("failed to delete sample recordings: {e}"))
        }
    }
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
