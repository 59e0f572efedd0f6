use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for audio backend
#[derive(Debug, Clone)]
pub struct AudioBackendConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Frame size in milliseconds (affects latency)
    pub frame_duration_ms: u64,
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 1,
            frame_duration_ms: 100,
        }
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - `MicBackend`: default input device via cpal
/// - `SilenceBackend`: timer-driven zero frames (headless runs, tests)
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio; the frame channel closes
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio source type
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Default microphone input
    Microphone,
    /// Generated silence (no capture hardware required)
    Silence,
}

/// Audio backend factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    pub fn create(source: AudioSource, config: AudioBackendConfig) -> Result<Box<dyn AudioBackend>> {
        match source {
            AudioSource::Microphone => Ok(Box::new(super::mic::MicBackend::new(config))),
            AudioSource::Silence => Ok(Box::new(SilenceBackend::new(config))),
        }
    }

    /// Map a config string ("microphone" / "silence") to a source.
    pub fn source_from_str(name: &str) -> Result<AudioSource> {
        match name {
            "microphone" => Ok(AudioSource::Microphone),
            "silence" => Ok(AudioSource::Silence),
            other => anyhow::bail!("unknown audio source: {other}"),
        }
    }
}

/// Emits zeroed frames at the configured cadence until stopped.
pub struct SilenceBackend {
    config: AudioBackendConfig,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl SilenceBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for SilenceBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = mpsc::channel(32);
        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let sample_rate = self.config.sample_rate;
        let channels = self.config.channels;
        let frame_ms = self.config.frame_duration_ms;
        let samples_per_frame =
            (sample_rate as u64 * channels as u64 * frame_ms / 1000) as usize;

        let task = tokio::spawn(async move {
            let mut timestamp_ms = 0u64;
            let mut ticker = tokio::time::interval(std::time::Duration::from_millis(frame_ms));

            while running.load(Ordering::SeqCst) {
                ticker.tick().await;
                let frame = AudioFrame {
                    samples: vec![0i16; samples_per_frame],
                    sample_rate,
                    channels,
                    timestamp_ms,
                };
                timestamp_ms += frame_ms;
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "silence"
    }
}
