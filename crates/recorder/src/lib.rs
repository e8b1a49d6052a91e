//! # Recorder
//!
//! Episode recording and persistence.
//!
//! - [`Recorder`] appends every sensor event to a [`contracts::SensorSnapshot`]
//!   while active, rebased to relative time
//! - [`SnapshotStore`] persists snapshots as one JSON document per episode
//! - [`FlushTask`] periodically writes the in-progress snapshot to disk so
//!   a crash loses at most one flush interval of data
//!
//! ## Usage
//!
//! ```ignore
//! use recorder::{Recorder, SnapshotStore};
//!
//! let mut recorder = Recorder::new(origin.clone(), &config);
//! recorder.start();
//! recorder.record(&event);
//!
//! let snapshot = recorder.finish(takeoff_rel, completion_rel);
//! let path = store.save(&snapshot)?;
//! ```

mod episode;
mod flush;
mod store;

pub use episode::Recorder;
pub use flush::{FlushHandle, FlushTask};
pub use store::SnapshotStore;

// Re-export contracts types
pub use contracts::{RecordingConfig, SensorSnapshot};
