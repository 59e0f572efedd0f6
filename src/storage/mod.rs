//! Durable recording storage
//!
//! SQLite behind a dedicated worker thread; callers submit closures and
//! await the reply, so no connection ever crosses an await point.

mod model;
mod store;

pub use model::Recording;
pub use store::RecordingStore;
