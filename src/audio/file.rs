use anyhow::{Context, Result};
use hound::WavReader;
use std::path::Path;

/// Format and duration of an existing WAV file, read without loading samples
#[derive(Debug, Clone)]
pub struct AudioProbe {
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioProbe {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = WavReader::open(path)
            .with_context(|| format!("failed to open WAV file: {}", path.display()))?;

        let spec = reader.spec();
        // duration() is per-channel sample frames
        let duration_ms = reader.duration() as u64 * 1000 / spec.sample_rate as u64;

        Ok(Self {
            duration_ms,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }
}
