use super::point::{GpsSample, ReconciledPoint};
use crate::roads::SnappedPoint;
use tracing::warn;

/// Produce the final track to persist with a recording.
///
/// When `corrected` is `None` (no connectivity, or the roads call failed)
/// the raw samples are carried over 1:1, order and indices unchanged.
///
/// When the roads service returned points, the output follows the service's
/// order exactly: a point whose `original_index` is in bounds copies
/// altitude/bearing/speed/timestamp from the sample at that index; a point
/// with no index carries position only. An out-of-range index is treated
/// the same as an absent one rather than inventing a pairing.
///
/// Never mutates its inputs and never fails; the output length equals the
/// length of whichever source sequence was chosen.
pub fn reconcile(
    samples: &[GpsSample],
    corrected: Option<&[SnappedPoint]>,
) -> Vec<ReconciledPoint> {
    let Some(corrected) = corrected else {
        return samples.iter().map(ReconciledPoint::from_sample).collect();
    };

    corrected
        .iter()
        .map(|point| {
            let lat = point.location.latitude;
            let lng = point.location.longitude;

            match point.original_index {
                Some(index) if index < samples.len() => {
                    let original = &samples[index];
                    ReconciledPoint {
                        latitude: lat,
                        longitude: lng,
                        altitude: Some(original.altitude),
                        bearing: Some(original.bearing),
                        speed: Some(original.speed),
                        timestamp_ms: Some(original.timestamp_ms),
                        original_index: Some(index),
                    }
                }
                Some(index) => {
                    warn!(
                        index,
                        samples = samples.len(),
                        "snapped point references an out-of-range sample, keeping position only"
                    );
                    ReconciledPoint::positional(lat, lng)
                }
                None => ReconciledPoint::positional(lat, lng),
            }
        })
        .collect()
}
