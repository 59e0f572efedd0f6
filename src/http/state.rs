use crate::audio::AudioSource;
use crate::config::LocationConfig;
use crate::net::Connectivity;
use crate::roads::SnapService;
use crate::session::RecordingSession;
use crate::storage::RecordingStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Pieces of service configuration the handlers need to build sessions
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub recordings_path: PathBuf,
    pub audio_source: AudioSource,
    pub sample_rate: u32,
    pub channels: u16,
    pub location: LocationConfig,
    pub sample_audio_path: Option<String>,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: RecordingStore,
    pub snap_service: Arc<dyn SnapService>,
    pub connectivity: Arc<dyn Connectivity>,
    pub settings: Arc<ServiceSettings>,

    /// The single active recording session, if any
    pub active: Arc<RwLock<Option<Arc<RecordingSession>>>>,
}

impl AppState {
    pub fn new(
        store: RecordingStore,
        snap_service: Arc<dyn SnapService>,
        connectivity: Arc<dyn Connectivity>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            store,
            snap_service,
            connectivity,
            settings: Arc::new(settings),
            active: Arc::new(RwLock::new(None)),
        }
    }
}
