use serde::{Deserialize, Serialize};

/// One raw location event as delivered by a [`super::LocationSource`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    /// Heading in degrees, 0..360
    pub bearing: f32,
    /// Ground speed in m/s
    pub speed: f32,
    /// Epoch milliseconds reported by the source
    pub timestamp_ms: i64,
}

/// One raw GPS fix captured during a recording session, with its position
/// in capture order. Immutable once appended to the session buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub bearing: f32,
    pub speed: f32,
    pub timestamp_ms: i64,
    /// Position in capture order, assigned by the collector
    pub index: usize,
}

impl GpsSample {
    pub fn from_fix(fix: LocationFix, index: usize) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude,
            bearing: fix.bearing,
            speed: fix.speed,
            timestamp_ms: fix.timestamp_ms,
            index,
        }
    }
}

/// Final per-recording track point: corrected position when the roads
/// service matched the originating sample, with sensor fields carried over
/// from that sample. Points the service interpolated (no originating index)
/// carry position only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub bearing: Option<f32>,
    pub speed: Option<f32>,
    pub timestamp_ms: Option<i64>,
    pub original_index: Option<usize>,
}

impl ReconciledPoint {
    /// Carry every field of a raw sample unchanged (the no-correction path).
    pub fn from_sample(sample: &GpsSample) -> Self {
        Self {
            latitude: sample.latitude,
            longitude: sample.longitude,
            altitude: Some(sample.altitude),
            bearing: Some(sample.bearing),
            speed: Some(sample.speed),
            timestamp_ms: Some(sample.timestamp_ms),
            original_index: Some(sample.index),
        }
    }

    /// A point with only a position, nothing carried from any sample.
    pub fn positional(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            bearing: None,
            speed: None,
            timestamp_ms: None,
            original_index: None,
        }
    }
}
