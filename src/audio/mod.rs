pub mod backend;
pub mod file;
pub mod mic;
pub mod writer;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioSource, SilenceBackend};
pub use file::AudioProbe;
pub use mic::MicBackend;
pub use writer::{RecordingFile, WavRecorder};
