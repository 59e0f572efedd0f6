pub mod audio;
pub mod config;
pub mod gps;
pub mod http;
pub mod net;
pub mod roads;
pub mod session;
pub mod storage;

pub use audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioSource, RecordingFile,
    WavRecorder,
};
pub use config::Config;
pub use gps::{reconcile, GpsCollector, GpsSample, LocationFix, LocationSource, ReconciledPoint};
pub use http::{create_router, AppState, ServiceSettings};
pub use net::{Connectivity, TcpProbe};
pub use roads::{RoadsClient, RoadsError, SnapService, SnappedPoint};
pub use session::{RecordingSession, SessionConfig, SessionStats};
pub use storage::{Recording, RecordingStore};
