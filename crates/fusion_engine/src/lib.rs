//! # Fusion Engine
//!
//! Single-axis sensor fusion for the launch pipeline.
//!
//! Responsible for:
//! - EKF-style speed/acceleration estimation from sparse GPS speed and
//!   high-rate accelerometer input
//! - Barometric pressure to altitude conversion
//! - Emitting fused [`contracts::Sample`]s for the state machine
//!
//! ## Usage
//!
//! ```ignore
//! use fusion_engine::{FusionEngine, FusionUpdate};
//!
//! let mut engine = FusionEngine::new(&tuning);
//!
//! // Push events as they arrive
//! if let Some(FusionUpdate::Fused { speed, .. }) = engine.push(&event)? {
//!     // Feed the state machine
//! }
//! ```

mod altitude;
mod ekf;
mod engine;

pub use altitude::pressure_to_altitude;
pub use ekf::SpeedKalmanFilter;
pub use engine::{FusionEngine, FusionUpdate};

// Re-export contracts types
pub use contracts::FilterTuning;
