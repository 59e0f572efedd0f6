// End-to-end recording session tests
//
// These drive a full start/stop cycle with the silence audio backend and a
// replayed GPS track, exercising the correction-branch decision: offline
// fallback, snapped-point merge, roads failure fallback, and the
// no-samples path where the service is never called.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use voicelogger::audio::{AudioBackendConfig, SilenceBackend};
use voicelogger::gps::{GpsCollector, GpsSample, LocationRequest, ReplaySource, TrackPoint};
use voicelogger::net::Connectivity;
use voicelogger::roads::{RoadsError, SnapService, SnappedLocation, SnappedPoint};
use voicelogger::session::{RecordingSession, SessionConfig};
use voicelogger::storage::RecordingStore;

struct Online;
struct Offline;

#[async_trait::async_trait]
impl Connectivity for Online {
    async fn is_online(&self) -> bool {
        true
    }
}

#[async_trait::async_trait]
impl Connectivity for Offline {
    async fn is_online(&self) -> bool {
        false
    }
}

/// Returns a fixed snapped-point list and records whether it was called.
struct FixedSnap {
    points: Vec<SnappedPoint>,
    called: AtomicBool,
}

impl FixedSnap {
    fn new(points: Vec<SnappedPoint>) -> Self {
        Self {
            points,
            called: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl SnapService for FixedSnap {
    async fn snap(&self, _samples: &[GpsSample]) -> Result<Vec<SnappedPoint>, RoadsError> {
        self.called.store(true, Ordering::SeqCst);
        Ok(self.points.clone())
    }
}

struct TimeoutSnap;

#[async_trait::async_trait]
impl SnapService for TimeoutSnap {
    async fn snap(&self, _samples: &[GpsSample]) -> Result<Vec<SnappedPoint>, RoadsError> {
        Err(RoadsError::Timeout)
    }
}

fn demo_track(points: usize) -> Vec<TrackPoint> {
    (0..points)
        .map(|i| TrackPoint {
            latitude: 35.68 + i as f64 * 0.001,
            longitude: 139.76 + i as f64 * 0.001,
            altitude: 9.5 + i as f64,
            bearing: 45.0,
            speed: 1.2,
        })
        .collect()
}

fn test_session(
    dir: &TempDir,
    track_points: usize,
    snap_service: Arc<dyn SnapService>,
    connectivity: Arc<dyn Connectivity>,
) -> Result<(RecordingSession, RecordingStore)> {
    let store = RecordingStore::open(dir.path().join("test.db"))?;

    let config = SessionConfig {
        output_dir: dir.path().join("recordings"),
        sample_rate: 8_000,
        channels: 1,
        location: LocationRequest {
            interval: Duration::from_millis(10),
            // No floor so the fast replay cadence is fully buffered.
            fastest_interval: Duration::ZERO,
        },
        ..SessionConfig::default()
    };

    let backend = Box::new(SilenceBackend::new(AudioBackendConfig {
        sample_rate: 8_000,
        channels: 1,
        frame_duration_ms: 20,
    }));

    let source = Box::new(ReplaySource::new(demo_track(track_points)));
    let collector = GpsCollector::new(source, config.location.clone());

    let session = RecordingSession::new(
        config,
        store.clone(),
        snap_service,
        connectivity,
        backend,
        collector,
    );

    Ok((session, store))
}

fn snapped(lat: f64, lng: f64, original_index: Option<usize>) -> SnappedPoint {
    SnappedPoint {
        location: SnappedLocation {
            latitude: lat,
            longitude: lng,
        },
        original_index,
        place_id: None,
    }
}

#[tokio::test]
async fn offline_stop_persists_the_raw_track() -> Result<()> {
    let dir = TempDir::new()?;
    let snap = Arc::new(FixedSnap::new(vec![snapped(0.0, 0.0, Some(0))]));
    let (session, store) = test_session(&dir, 3, snap.clone(), Arc::new(Offline))?;

    session.start().await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    let recording = session.stop("Offline walk".to_string()).await?;

    assert!(!snap.called.load(Ordering::SeqCst), "no roads call offline");
    assert!(!recording.track.is_empty());
    for (i, point) in recording.track.iter().enumerate() {
        assert_eq!(point.original_index, Some(i));
        assert!(point.altitude.is_some());
        assert!(point.timestamp_ms.is_some());
    }

    let stored = store.get(&recording.id).await?.expect("persisted");
    assert_eq!(stored.title, "Offline walk");
    assert_eq!(stored.track, recording.track);
    assert!(std::path::Path::new(&stored.audio_path).exists());

    Ok(())
}

#[tokio::test]
async fn online_stop_merges_snapped_points() -> Result<()> {
    let dir = TempDir::new()?;
    let snap = Arc::new(FixedSnap::new(vec![
        snapped(35.9, 139.9, Some(0)),
        snapped(35.95, 139.95, None),
    ]));
    let (session, store) = test_session(&dir, 3, snap.clone(), Arc::new(Online))?;

    session.start().await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    let recording = session.stop("Snapped walk".to_string()).await?;

    assert!(snap.called.load(Ordering::SeqCst));
    assert_eq!(recording.track.len(), 2);

    // Matched point: corrected position, sensor data from sample 0.
    assert_eq!(recording.track[0].latitude, 35.9);
    assert_eq!(recording.track[0].original_index, Some(0));
    assert_eq!(recording.track[0].altitude, Some(9.5));
    assert!(recording.track[0].timestamp_ms.is_some());

    // Interpolated point: position only.
    assert_eq!(recording.track[1].latitude, 35.95);
    assert_eq!(recording.track[1].original_index, None);
    assert_eq!(recording.track[1].altitude, None);

    assert!(store.get(&recording.id).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn roads_timeout_falls_back_to_raw_track() -> Result<()> {
    let dir = TempDir::new()?;
    let (session, store) = test_session(&dir, 3, Arc::new(TimeoutSnap), Arc::new(Online))?;

    session.start().await?;
    tokio::time::sleep(Duration::from_millis(200)).await;
    let recording = session.stop("Timed out".to_string()).await?;

    // The failed call never fails the save; the raw track is kept.
    assert!(!recording.track.is_empty());
    for (i, point) in recording.track.iter().enumerate() {
        assert_eq!(point.original_index, Some(i));
        assert!(point.altitude.is_some());
    }
    assert!(store.get(&recording.id).await?.is_some());

    Ok(())
}

#[tokio::test]
async fn stop_without_fixes_saves_an_empty_track_and_skips_the_service() -> Result<()> {
    let dir = TempDir::new()?;
    let snap = Arc::new(FixedSnap::new(vec![snapped(0.0, 0.0, Some(0))]));
    let (session, store) = test_session(&dir, 0, snap.clone(), Arc::new(Online))?;

    session.start().await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let recording = session.stop("No gps".to_string()).await?;

    assert!(recording.track.is_empty());
    assert!(!snap.called.load(Ordering::SeqCst));
    assert!(store.get(&recording.id).await?.is_some());

    Ok(())
}

#[tokio::test]
async fn stop_twice_reports_not_active() -> Result<()> {
    let dir = TempDir::new()?;
    let snap = Arc::new(FixedSnap::new(vec![]));
    let (session, _store) = test_session(&dir, 1, snap, Arc::new(Offline))?;

    session.start().await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    session.stop("First".to_string()).await?;

    assert!(session.stop("Second".to_string()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn stats_report_recording_state() -> Result<()> {
    let dir = TempDir::new()?;
    let snap = Arc::new(FixedSnap::new(vec![]));
    let (session, _store) = test_session(&dir, 2, snap, Arc::new(Offline))?;

    session.start().await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let stats = session.stats().await;
    assert!(stats.is_recording);
    assert!(stats.samples_collected >= 1);

    session.stop("Done".to_string()).await?;
    let stats = session.stats().await;
    assert!(!stats.is_recording);

    Ok(())
}
