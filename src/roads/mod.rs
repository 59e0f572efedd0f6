//! Roads correction service client
//!
//! One snap-to-roads call is made per recording stop, at most once, with no
//! retries. Every failure is classified into [`RoadsError`] and degrades to
//! the uncorrected track; nothing here can fail a recording save.

mod client;
mod fixture;

pub use client::{path_query, RoadsClient, RoadsError, SnapService, SnappedLocation, SnappedPoint, SnappedPointsResponse};
pub use fixture::{load_sample_track, SAMPLE_TRACK_JSON};
