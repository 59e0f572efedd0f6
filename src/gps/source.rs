use super::point::LocationFix;
use crate::config::LocationConfig;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// Requested location-update cadence
#[derive(Debug, Clone)]
pub struct LocationRequest {
    /// Target interval between fixes
    pub interval: Duration,
    /// Floor below which fixes are dropped by the collector
    pub fastest_interval: Duration,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            fastest_interval: Duration::from_secs(2),
        }
    }
}

/// Location update source
///
/// Implementations:
/// - `ReplaySource`: plays a pre-recorded track file (demos, tests)
/// - A GNSS/gpsd provider plugs in behind this trait on real hardware
#[async_trait::async_trait]
pub trait LocationSource: Send + Sync {
    /// Start delivering fixes at the requested cadence
    ///
    /// Returns a channel receiver that will receive location fixes
    async fn start(&mut self, request: LocationRequest) -> Result<mpsc::Receiver<LocationFix>>;

    /// Stop delivering fixes; the receiver's channel closes
    async fn stop(&mut self) -> Result<()>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// One entry of a replayable track file (JSON array of these)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub bearing: f32,
    #[serde(default)]
    pub speed: f32,
}

/// Replays a fixed list of track points at the requested interval,
/// timestamping each fix at emission time.
pub struct ReplaySource {
    points: Vec<TrackPoint>,
    task: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points, task: None }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read track file {}", path.display()))?;
        let points: Vec<TrackPoint> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse track file {}", path.display()))?;
        Ok(Self::new(points))
    }
}

#[async_trait::async_trait]
impl LocationSource for ReplaySource {
    async fn start(&mut self, request: LocationRequest) -> Result<mpsc::Receiver<LocationFix>> {
        let (tx, rx) = mpsc::channel(20);
        let points = self.points.clone();

        info!(points = points.len(), "starting track replay");

        let task = tokio::spawn(async move {
            for point in points {
                let fix = LocationFix {
                    latitude: point.latitude,
                    longitude: point.longitude,
                    altitude: point.altitude,
                    bearing: point.bearing,
                    speed: point.speed,
                    timestamp_ms: Utc::now().timestamp_millis(),
                };
                if tx.send(fix).await.is_err() {
                    break;
                }
                tokio::time::sleep(request.interval).await;
            }
            // Sender drops here; the receiver sees a closed channel.
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Location source factory
pub struct LocationSourceFactory;

impl LocationSourceFactory {
    /// Create a location source from service configuration
    pub fn create(config: &LocationConfig) -> Result<Box<dyn LocationSource>> {
        match config.provider.as_str() {
            "replay" => {
                let source = ReplaySource::from_file(&config.track_path)?;
                Ok(Box::new(source))
            }
            other => anyhow::bail!("unknown location provider: {other}"),
        }
    }
}
