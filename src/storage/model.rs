use crate::gps::ReconciledPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed recording: audio file reference, reconciled GPS track and
/// metadata. Written once at stop time, immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,
    pub title: String,
    pub audio_path: String,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
    pub track: Vec<ReconciledPoint>,
    /// Seeded demo data; deleting it leaves the shared audio asset alone
    pub is_sample: bool,
}
