use super::client::SnappedPointsResponse;
use crate::gps::ReconciledPoint;
use anyhow::{Context, Result};

/// Bundled snapped-points response used to seed sample recordings.
pub const SAMPLE_TRACK_JSON: &str = include_str!("../../assets/sample_track.json");

/// Parse a snapped-points JSON document into a persistable track.
///
/// The document is consumed exactly like a live service response, except
/// that no raw samples exist to carry sensor data from: points with an
/// originating index get timestamps synthesized at a fixed 1-second
/// cadence, points without one stay positional-only.
pub fn load_sample_track(json: &str) -> Result<Vec<ReconciledPoint>> {
    let response: SnappedPointsResponse =
        serde_json::from_str(json).context("failed to parse sample track JSON")?;

    let mut track = Vec::with_capacity(response.snapped_points.len());
    let mut timestamp_ms: i64 = 0;

    for point in response.snapped_points {
        let lat = point.location.latitude;
        let lng = point.location.longitude;

        match point.original_index {
            Some(index) => {
                track.push(ReconciledPoint {
                    latitude: lat,
                    longitude: lng,
                    altitude: None,
                    bearing: None,
                    speed: None,
                    timestamp_ms: Some(timestamp_ms),
                    original_index: Some(index),
                });
                timestamp_ms += 1000;
            }
            None => track.push(ReconciledPoint::positional(lat, lng)),
        }
    }

    Ok(track)
}
