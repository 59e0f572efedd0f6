use super::config::SessionConfig;
use super::stats::SessionStats;
use crate::audio::{AudioBackend, RecordingFile, WavRecorder};
use crate::gps::{reconcile, GpsCollector, GpsSample, ReconciledPoint};
use crate::net::Connectivity;
use crate::roads::SnapService;
use crate::storage::{Recording, RecordingStore};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// One voice recording in progress: audio capture plus GPS collection,
/// reconciled and persisted once at stop.
///
/// Explicit start/stop boundaries; a session is created per recording and
/// discarded after `stop` returns.
pub struct RecordingSession {
    config: SessionConfig,
    store: RecordingStore,
    snap_service: Arc<dyn SnapService>,
    connectivity: Arc<dyn Connectivity>,

    started_at: chrono::DateTime<chrono::Utc>,
    is_recording: Arc<AtomicBool>,

    audio_backend: Mutex<Box<dyn AudioBackend>>,
    collector: Mutex<GpsCollector>,
    writer_task: Mutex<Option<JoinHandle<Result<RecordingFile>>>>,
}

impl RecordingSession {
    pub fn new(
        config: SessionConfig,
        store: RecordingStore,
        snap_service: Arc<dyn SnapService>,
        connectivity: Arc<dyn Connectivity>,
        audio_backend: Box<dyn AudioBackend>,
        collector: GpsCollector,
    ) -> Self {
        Self {
            config,
            store,
            snap_service,
            connectivity,
            started_at: Utc::now(),
            is_recording: Arc::new(AtomicBool::new(false)),
            audio_backend: Mutex::new(audio_backend),
            collector: Mutex::new(collector),
            writer_task: Mutex::new(None),
        }
    }

    /// Start audio capture and location updates.
    pub async fn start(&self) -> Result<()> {
        if self.is_recording.load(Ordering::SeqCst) {
            warn!("recording already started");
            return Ok(());
        }

        info!(recording_id = %self.config.recording_id, "starting recording session");

        let audio_rx = {
            let mut backend = self.audio_backend.lock().await;
            backend
                .start()
                .await
                .context("failed to start audio capture")?
        };

        let recorder = WavRecorder::new(
            self.config.audio_path(),
            self.config.sample_rate,
            self.config.channels,
        );
        let writer_task = tokio::spawn(async move { recorder.record(audio_rx).await });
        {
            let mut task = self.writer_task.lock().await;
            *task = Some(writer_task);
        }

        if let Err(e) = self.collector.lock().await.start().await {
            // Mirror a revoked location permission: the recording proceeds
            // with an empty track.
            error!("location updates unavailable: {e:#}");
        }

        self.is_recording.store(true, Ordering::SeqCst);
        info!("recording session started");
        Ok(())
    }

    /// Stop capture, resolve the track and persist the recording.
    ///
    /// The roads call is attempted at most once and only when connectivity
    /// is present; every failure degrades to the raw track. Persistence is
    /// a single write of the fully reconciled recording.
    pub async fn stop(&self, title: String) -> Result<Recording> {
        if !self.is_recording.swap(false, Ordering::SeqCst) {
            anyhow::bail!("recording not active");
        }

        info!(recording_id = %self.config.recording_id, "stopping recording session");

        {
            let mut backend = self.audio_backend.lock().await;
            backend.stop().await.context("failed to stop audio capture")?;
        }

        let audio_file = {
            let mut task = self.writer_task.lock().await;
            match task.take() {
                Some(task) => task
                    .await
                    .context("audio writer task panicked")?
                    .context("failed to finalize recording file")?,
                None => anyhow::bail!("no audio writer task for this session"),
            }
        };

        // Location updates stop before the buffer is read; reconciliation
        // sees a settled sequence.
        let samples = self.collector.lock().await.stop().await?;
        let track = self.resolve_track(&samples).await;

        let recording = Recording {
            id: self.config.recording_id.clone(),
            title,
            audio_path: audio_file.path.display().to_string(),
            duration_ms: audio_file.duration_ms,
            created_at: self.started_at,
            track,
            is_sample: false,
        };

        self.store
            .insert(&recording)
            .await
            .context("failed to persist recording")?;

        info!(
            recording_id = %recording.id,
            duration_ms = recording.duration_ms,
            points = recording.track.len(),
            "recording persisted"
        );

        Ok(recording)
    }

    /// Decide the correction branch and reconcile.
    ///
    /// Offline, an empty track, or any roads failure all resolve to the
    /// uncorrected samples; this step cannot fail the stop sequence.
    async fn resolve_track(&self, samples: &[GpsSample]) -> Vec<ReconciledPoint> {
        if samples.is_empty() {
            return reconcile(samples, None);
        }

        if !self.connectivity.is_online().await {
            info!("no connectivity, keeping the raw gps track");
            return reconcile(samples, None);
        }

        match self.snap_service.snap(samples).await {
            Ok(corrected) => {
                info!(points = corrected.len(), "snapped points received");
                reconcile(samples, Some(&corrected))
            }
            Err(e) => {
                error!("roads api call failed: {e}");
                reconcile(samples, None)
            }
        }
    }

    /// Get current session statistics
    pub async fn stats(&self) -> SessionStats {
        let duration = Utc::now().signed_duration_since(self.started_at);

        SessionStats {
            is_recording: self.is_recording.load(Ordering::SeqCst),
            started_at: self.started_at,
            duration_secs: duration.num_milliseconds() as f64 / 1000.0,
            samples_collected: self.collector.lock().await.len().await,
        }
    }

    pub fn recording_id(&self) -> &str {
        &self.config.recording_id
    }
}
