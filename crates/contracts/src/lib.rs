//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - A single process-wide [`ClockOrigin`] anchors all relative time
//! - [`Timestamp`] values are either absolute (epoch seconds, f64) or
//!   relative to the origin; comparisons always happen on resolved values

mod channel;
mod error;
mod phase;
mod sample;
mod settings;
mod snapshot;
mod timestamp;

pub use channel::*;
pub use error::*;
pub use phase::*;
pub use sample::*;
pub use settings::*;
pub use snapshot::*;
pub use timestamp::*;
