// Tests for the GPS collector
//
// A scripted location source with preset timestamps drives the collector,
// verifying sequential index assignment, the fastest-interval floor, and
// the stop-then-read handoff.

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use voicelogger::gps::{GpsCollector, LocationFix, LocationRequest, LocationSource};

/// Emits a preset fix list immediately; timestamps are scripted, so the
/// fastest-interval behaviour is deterministic.
struct ScriptedSource {
    fixes: Vec<LocationFix>,
    task: Option<JoinHandle<()>>,
}

impl ScriptedSource {
    fn new(fixes: Vec<LocationFix>) -> Self {
        Self { fixes, task: None }
    }
}

#[async_trait::async_trait]
impl LocationSource for ScriptedSource {
    async fn start(&mut self, _request: LocationRequest) -> Result<mpsc::Receiver<LocationFix>> {
        let (tx, rx) = mpsc::channel(20);
        let fixes = self.fixes.clone();
        self.task = Some(tokio::spawn(async move {
            for fix in fixes {
                if tx.send(fix).await.is_err() {
                    break;
                }
            }
        }));
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn fix(timestamp_ms: i64) -> LocationFix {
    LocationFix {
        latitude: 35.68,
        longitude: 139.76,
        altitude: 4.0,
        bearing: 10.0,
        speed: 1.0,
        timestamp_ms,
    }
}

fn request(fastest_ms: u64) -> LocationRequest {
    LocationRequest {
        interval: std::time::Duration::from_millis(fastest_ms.max(1)),
        fastest_interval: std::time::Duration::from_millis(fastest_ms),
    }
}

#[tokio::test]
async fn collector_assigns_sequential_indices() -> Result<()> {
    let source = ScriptedSource::new(vec![fix(0), fix(3_000), fix(6_000)]);
    let mut collector = GpsCollector::new(Box::new(source), request(2_000));

    collector.start().await?;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let samples = collector.stop().await?;

    assert_eq!(samples.len(), 3);
    for (i, sample) in samples.iter().enumerate() {
        assert_eq!(sample.index, i);
    }
    Ok(())
}

#[tokio::test]
async fn fixes_under_the_floor_are_dropped() -> Result<()> {
    // Floor of 2s: 0 kept, 1000 dropped, 2500 kept, 4100 dropped.
    let source = ScriptedSource::new(vec![fix(0), fix(1_000), fix(2_500), fix(4_100)]);
    let mut collector = GpsCollector::new(Box::new(source), request(2_000));

    collector.start().await?;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let samples = collector.stop().await?;

    let timestamps: Vec<_> = samples.iter().map(|s| s.timestamp_ms).collect();
    assert_eq!(timestamps, vec![0, 2_500]);
    assert_eq!(samples[1].index, 1);
    Ok(())
}

#[tokio::test]
async fn stop_drains_the_buffer() -> Result<()> {
    let source = ScriptedSource::new(vec![fix(0), fix(3_000)]);
    let mut collector = GpsCollector::new(Box::new(source), request(0));

    collector.start().await?;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(collector.len().await, 2);
    let samples = collector.stop().await?;
    assert_eq!(samples.len(), 2);
    assert_eq!(collector.len().await, 0);
    Ok(())
}
