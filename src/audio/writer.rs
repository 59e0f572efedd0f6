use super::backend::AudioFrame;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::info;

/// Metadata of a finished recording file
#[derive(Debug, Clone)]
pub struct RecordingFile {
    pub path: PathBuf,
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_count: usize,
}

/// Drains captured audio frames into a single WAV file.
///
/// The WAV spec is taken from the first frame (frames carry the device's
/// native format); the configured format is the fallback when no audio
/// arrives at all, so an empty recording still yields a valid file.
pub struct WavRecorder {
    path: PathBuf,
    fallback_sample_rate: u32,
    fallback_channels: u16,
}

impl WavRecorder {
    pub fn new(path: PathBuf, fallback_sample_rate: u32, fallback_channels: u16) -> Self {
        Self {
            path,
            fallback_sample_rate,
            fallback_channels,
        }
    }

    /// Consume frames until the channel closes, then finalize the file.
    pub async fn record(self, mut audio_rx: mpsc::Receiver<AudioFrame>) -> Result<RecordingFile> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("failed to create recordings directory")?;
        }

        let mut writer: Option<hound::WavWriter<BufWriter<File>>> = None;
        let mut sample_rate = self.fallback_sample_rate;
        let mut channels = self.fallback_channels;
        let mut sample_count = 0usize;

        while let Some(frame) = audio_rx.recv().await {
            if writer.is_none() {
                sample_rate = frame.sample_rate;
                channels = frame.channels;
                writer = Some(create_writer(&self.path, sample_rate, channels)?);
            }

            if let Some(w) = writer.as_mut() {
                for &sample in &frame.samples {
                    w.write_sample(sample)
                        .context("failed to write sample to WAV")?;
                }
                sample_count += frame.samples.len();
            }
        }

        let writer = match writer {
            Some(w) => w,
            None => create_writer(&self.path, sample_rate, channels)?,
        };
        writer.finalize().context("failed to finalize WAV file")?;

        let duration_ms =
            sample_count as u64 * 1000 / (sample_rate as u64 * channels.max(1) as u64);

        info!(
            path = %self.path.display(),
            duration_ms, sample_count, "recording file finalized"
        );

        Ok(RecordingFile {
            path: self.path,
            duration_ms,
            sample_rate,
            channels,
            sample_count,
        })
    }
}

fn create_writer(
    path: &Path,
    sample_rate: u32,
    channels: u16,
) -> Result<hound::WavWriter<BufWriter<File>>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    hound::WavWriter::create(path, spec)
        .with_context(|| format!("failed to create WAV file: {}", path.display()))
}
