use super::point::GpsSample;
use super::source::{LocationRequest, LocationSource};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Buffers GPS fixes while a recording is in progress.
///
/// Fixes arrive asynchronously from the location source and are appended in
/// arrival order with sequential indices. `stop` halts updates before the
/// buffer is handed to the caller, so reconciliation never races the append
/// task.
pub struct GpsCollector {
    source: Box<dyn LocationSource>,
    request: LocationRequest,
    samples: Arc<Mutex<Vec<GpsSample>>>,
    collect_task: Option<JoinHandle<()>>,
}

impl GpsCollector {
    pub fn new(source: Box<dyn LocationSource>, request: LocationRequest) -> Self {
        Self {
            source,
            request,
            samples: Arc::new(Mutex::new(Vec::new())),
            collect_task: None,
        }
    }

    /// Start location updates and begin buffering fixes.
    ///
    /// Fixes arriving closer together than the fastest-interval floor are
    /// dropped rather than buffered.
    pub async fn start(&mut self) -> Result<()> {
        self.samples.lock().await.clear();

        let mut fix_rx = self
            .source
            .start(self.request.clone())
            .await
            .context("failed to start location updates")?;

        info!(source = self.source.name(), "location updates started");

        let samples = Arc::clone(&self.samples);
        let fastest_ms = self.request.fastest_interval.as_millis() as i64;

        let task = tokio::spawn(async move {
            let mut last_accepted_ms: Option<i64> = None;

            while let Some(fix) = fix_rx.recv().await {
                if let Some(last) = last_accepted_ms {
                    if fix.timestamp_ms - last < fastest_ms {
                        debug!("dropping fix under the fastest-interval floor");
                        continue;
                    }
                }
                last_accepted_ms = Some(fix.timestamp_ms);

                let mut buffer = samples.lock().await;
                let index = buffer.len();
                buffer.push(GpsSample::from_fix(fix, index));
            }
        });

        self.collect_task = Some(task);
        Ok(())
    }

    /// Stop location updates and take the captured sample sequence.
    ///
    /// The source is stopped first and the append task drained before the
    /// buffer is returned, so the caller reads a settled sequence.
    pub async fn stop(&mut self) -> Result<Vec<GpsSample>> {
        self.source
            .stop()
            .await
            .context("failed to stop location updates")?;

        if let Some(task) = self.collect_task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!("gps collect task panicked: {e}");
                }
            }
        }

        let samples = std::mem::take(&mut *self.samples.lock().await);
        info!(samples = samples.len(), "location updates stopped");
        Ok(samples)
    }

    /// Number of fixes buffered so far
    pub async fn len(&self) -> usize {
        self.samples.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
