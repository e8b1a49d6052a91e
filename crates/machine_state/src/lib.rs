//! # Machine State
//!
//! Flight-phase classification for a winch launch.
//!
//! The [`LaunchStateMachine`] is a synchronous reducer: it is fed fused
//! speed, fused acceleration, and altitude samples one at a time, combines
//! the latest value of each channel on every tick, and emits a new
//! [`contracts::PhaseInfo`] whenever the classification changes.
//!
//! ## Usage
//!
//! ```ignore
//! use machine_state::{LaunchStateMachine, MachineInput};
//!
//! let mut machine = LaunchStateMachine::new(origin.clone());
//!
//! if let Some(info) = machine.update(MachineInput::Speed(speed), &settings) {
//!     // Phase changed
//! }
//! ```

mod machine;
mod smoothing;

pub use machine::{LaunchStateMachine, MachineInput};
pub use smoothing::SmoothingWindow;

// Re-export contracts types
pub use contracts::{LaunchPhase, LaunchSettings, PhaseInfo};
