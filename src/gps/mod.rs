//! GPS track capture and reconciliation
//!
//! This module provides:
//! - Point types: raw fixes, indexed samples, reconciled output points
//! - `GpsCollector`: buffers fixes from a `LocationSource` while recording
//! - `reconcile`: merges the raw track with road-snapped points

mod collector;
mod point;
mod reconcile;
mod source;

pub use collector::GpsCollector;
pub use point::{GpsSample, LocationFix, ReconciledPoint};
pub use reconcile::reconcile;
pub use source::{LocationRequest, LocationSource, LocationSourceFactory, ReplaySource, TrackPoint};
