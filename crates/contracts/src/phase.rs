//! Launch phase classification types.

use serde::{Deserialize, Serialize};

use crate::{Sample, Timestamp};

/// Discrete stage of a winch launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchPhase {
    /// On the ground, below the takeoff speed threshold
    Waiting,
    /// Rolling, above the takeoff speed threshold
    TakingOff,
    /// Inside the configured speed band
    MinSpeedReached,
    /// Dropped below the band after having reached it
    MinSpeedLost,
    /// Exceeded the top of the band
    MaxSpeedReached,
    /// Launch broke off near the ground (terminal)
    Aborted,
    /// Launch ran to completion (terminal)
    Completed,
}

impl LaunchPhase {
    /// An episode is in progress (not waiting, not terminal).
    pub fn is_launching(self) -> bool {
        !matches!(
            self,
            LaunchPhase::Waiting | LaunchPhase::Aborted | LaunchPhase::Completed
        )
    }

    /// Terminal phases never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, LaunchPhase::Aborted | LaunchPhase::Completed)
    }
}

/// The state machine's single output value, replaced wholesale on every
/// update so transitions stay atomic and replayable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseInfo {
    /// Current phase
    pub state: LaunchPhase,

    /// When the current phase was entered
    pub state_timestamp: Timestamp,

    /// Altitude at the moment of takeoff detection
    pub take_off_altitude: Option<Sample<f64>>,

    /// Highest altitude observed so far (updated every tick)
    pub max_altitude: Option<Sample<f64>>,

    /// Altitude recorded when the episode ended
    pub final_altitude: Option<Sample<f64>>,
}

impl PhaseInfo {
    /// Fresh record in the waiting phase.
    pub fn waiting(timestamp: Timestamp) -> Self {
        Self {
            state: LaunchPhase::Waiting,
            state_timestamp: timestamp,
            take_off_altitude: None,
            max_altitude: None,
            final_altitude: None,
        }
    }

    /// Whether an episode is in progress.
    pub fn is_launching(&self) -> bool {
        self.state.is_launching()
    }
}
