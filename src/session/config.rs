use crate::gps::LocationRequest;
use std::path::PathBuf;

/// Configuration for a recording session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique recording identifier
    pub recording_id: String,

    /// Directory the audio file is written to
    pub output_dir: PathBuf,

    /// Fallback WAV format when the capture device delivers nothing
    pub sample_rate: u32,
    pub channels: u16,

    /// Location update cadence (interval 3 s, floor 2 s by default)
    pub location: LocationRequest,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recording_id: format!("rec-{}", uuid::Uuid::new_v4()),
            output_dir: PathBuf::from("recordings"),
            sample_rate: 44_100,
            channels: 1,
            location: LocationRequest::default(),
        }
    }
}

impl SessionConfig {
    pub fn audio_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.wav", self.recording_id))
    }
}
