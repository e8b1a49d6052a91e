//! # Sensor Hub
//!
//! Sensor data sources for the launch pipeline.
//!
//! Responsibilities:
//! - Provide the unified [`contracts::SensorHub`] abstraction
//! - Replay persisted episodes deterministically ([`ReplayHub`])
//! - Generate a synthetic launch for development and tests
//!   ([`MockLaunchHub`])
//!
//! Live acquisition backends (real GPS/IMU/barometer) implement the same
//! trait outside this workspace.

mod mock;
mod replay;
mod stack;

pub use mock::{MockLaunchConfig, MockLaunchHub};
pub use replay::ReplayHub;
pub use stack::{ReplayCursor, ReplayStack};

// Re-export contracts types
pub use contracts::{PlaybackConfig, SensorEvent, SensorEventCallback, SensorHub};
