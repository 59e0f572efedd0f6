//! Microphone capture via cpal.
//!
//! cpal streams are not `Send`, so the stream lives on a dedicated capture
//! thread for the lifetime of the recording; frames are forwarded into a
//! tokio channel from the audio callback. Frames carry the device's native
//! sample rate and channel count.

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};
use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub struct MicBackend {
    config: AudioBackendConfig,
    running: Arc<AtomicBool>,
    stop_tx: Option<std::sync::mpsc::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl MicBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            thread: None,
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        let (frame_tx, frame_rx) = mpsc::channel::<AudioFrame>(64);
        let (stop_tx, stop_rx) = std::sync::mpsc::channel::<()>();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<()>>();

        let frame_ms = self.config.frame_duration_ms;

        let thread = std::thread::Builder::new()
            .name("voicelogger-mic".into())
            .spawn(move || {
                let stream = match build_input_stream(frame_tx, frame_ms) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(e).context("failed to start capture stream"));
                    return;
                }

                let _ = ready_tx.send(Ok(()));

                // Park until stop; dropping the stream ends capture and
                // closes the frame channel.
                let _ = stop_rx.recv();
                drop(stream);
            })
            .context("failed to spawn capture thread")?;

        tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .context("ready listener task failed")?
            .context("capture thread exited before signalling ready")??;

        self.running.store(true, Ordering::SeqCst);
        self.stop_tx = Some(stop_tx);
        self.thread = Some(thread);

        info!("microphone capture started");
        Ok(frame_rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.running.store(false, Ordering::SeqCst);

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let joined = tokio::task::spawn_blocking(move || thread.join()).await?;
            if joined.is_err() {
                error!("capture thread panicked");
            }
        }

        info!("microphone capture stopped");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

fn build_input_stream(
    frame_tx: mpsc::Sender<AudioFrame>,
    frame_ms: u64,
) -> Result<cpal::Stream> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("no input device found on the default audio host")?;

    let supported = device
        .default_input_config()
        .context("failed to query default input config")?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels();
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    let device_name = device.name().unwrap_or_else(|_| "unknown".into());
    info!(device = %device_name, sample_rate, channels, "opening input stream");

    // Accumulate callback buffers into frames of roughly frame_ms each.
    let samples_per_frame = (sample_rate as u64 * channels as u64 * frame_ms / 1000) as usize;
    let mut pending: Vec<i16> = Vec::with_capacity(samples_per_frame * 2);
    let mut samples_sent: u64 = 0;

    let mut push_samples = move |converted: &mut dyn Iterator<Item = i16>| {
        pending.extend(converted);
        while pending.len() >= samples_per_frame {
            let rest = pending.split_off(samples_per_frame);
            let samples = std::mem::replace(&mut pending, rest);
            let timestamp_ms = samples_sent * 1000 / (sample_rate as u64 * channels as u64);
            samples_sent += samples.len() as u64;

            let frame = AudioFrame {
                samples,
                sample_rate,
                channels,
                timestamp_ms,
            };
            // The writer may lag; dropping a frame beats stalling the
            // audio callback.
            if frame_tx.try_send(frame).is_err() {
                warn!("audio frame dropped, writer not keeping up");
            }
        }
    };

    let err_fn = |e: cpal::StreamError| error!("capture stream error: {e}");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mut converted = data
                    .iter()
                    .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16);
                push_samples(&mut converted);
            },
            err_fn,
            None,
        )?,
        cpal::SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mut converted = data.iter().copied();
                push_samples(&mut converted);
            },
            err_fn,
            None,
        )?,
        other => anyhow::bail!("unsupported input sample format: {other}"),
    };

    Ok(stream)
}
