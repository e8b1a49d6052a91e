//! Launch profile configuration shared across crates.
//!
//! Thresholds are runtime configuration, not constants: the state machine
//! reads them at every tick, so a change takes effect mid-episode.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::LaunchError;

/// Speed and timing thresholds for the launch state machine.
///
/// Speeds are km/h to match how operators brief them; the pipeline's m/s
/// values are converted at the comparison site.
#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
#[validate(schema(function = "validate_speed_band"))]
pub struct LaunchSettings {
    /// Speed above which the launch is considered started (km/h)
    #[validate(range(min = 0.1))]
    pub speed_threshold_kmh: f64,

    /// Bottom of the operational speed band (km/h)
    #[validate(range(min = 0.1))]
    pub min_speed_kmh: f64,

    /// Top of the operational speed band (km/h)
    #[validate(range(min = 0.1))]
    pub max_speed_kmh: f64,

    /// Altitude gain below which a slow launch counts as broken off (m)
    #[validate(range(min = 0.0))]
    pub abort_altitude_gain_m: f64,

    /// Earliest the abort rule may fire after takeoff (s)
    #[validate(range(min = 0.0))]
    pub abort_after_s: f64,

    /// Elapsed time after takeoff at which the launch completes (s)
    #[validate(range(min = 0.1))]
    pub complete_after_s: f64,

    /// Winch cable length, exposed to the profile view (m)
    #[validate(range(min = 1.0))]
    pub reference_length_m: f64,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            speed_threshold_kmh: 10.0,
            min_speed_kmh: 90.0,
            max_speed_kmh: 110.0,
            abort_altitude_gain_m: 1.0,
            abort_after_s: 5.0,
            complete_after_s: 40.0,
            reference_length_m: 1000.0,
        }
    }
}

fn validate_speed_band(settings: &LaunchSettings) -> Result<(), validator::ValidationError> {
    if settings.max_speed_kmh <= settings.min_speed_kmh {
        return Err(validator::ValidationError::new("speed_band")
            .with_message("max_speed_kmh must be greater than min_speed_kmh".into()));
    }
    if settings.min_speed_kmh <= settings.speed_threshold_kmh {
        return Err(validator::ValidationError::new("speed_band")
            .with_message("min_speed_kmh must be greater than speed_threshold_kmh".into()));
    }
    Ok(())
}

impl LaunchSettings {
    /// Replace the speed band, rejecting an invalid pair.
    ///
    /// On error the previous values are kept.
    pub fn set_speed_band(&mut self, min_kmh: f64, max_kmh: f64) -> Result<(), LaunchError> {
        let candidate = LaunchSettings {
            min_speed_kmh: min_kmh,
            max_speed_kmh: max_kmh,
            ..self.clone()
        };
        candidate.validate().map_err(|e| {
            LaunchError::config_validation("speed_band", e.to_string())
        })?;
        *self = candidate;
        Ok(())
    }

    /// Replace the takeoff detection threshold, rejecting an invalid value.
    pub fn set_speed_threshold(&mut self, threshold_kmh: f64) -> Result<(), LaunchError> {
        let candidate = LaunchSettings {
            speed_threshold_kmh: threshold_kmh,
            ..self.clone()
        };
        candidate.validate().map_err(|e| {
            LaunchError::config_validation("speed_threshold_kmh", e.to_string())
        })?;
        *self = candidate;
        Ok(())
    }
}

/// Sensor fusion filter tuning.
///
/// The noise entries are empirically tuned; velocity process noise is kept
/// well below acceleration process noise so velocity estimates are trusted
/// more between GPS corrections.
#[derive(Debug, Clone, Copy, PartialEq, Validate, Serialize, Deserialize)]
pub struct FilterTuning {
    /// Fixed process model time step (s)
    #[validate(range(min = 0.001))]
    pub time_step_s: f64,

    /// Process noise, velocity component (Q[0,0])
    #[validate(range(min = 0.0))]
    pub process_noise_velocity: f64,

    /// Process noise, acceleration component (Q[1,1])
    #[validate(range(min = 0.0))]
    pub process_noise_acceleration: f64,

    /// Measurement noise, velocity component (R[0,0])
    #[validate(range(min = 0.000000000001))]
    pub measurement_noise_velocity: f64,

    /// Measurement noise, acceleration component (R[1,1])
    #[validate(range(min = 0.000000000001))]
    pub measurement_noise_acceleration: f64,
}

impl Default for FilterTuning {
    fn default() -> Self {
        Self {
            time_step_s: 0.1,
            process_noise_velocity: 0.01,
            process_noise_acceleration: 0.1,
            measurement_noise_velocity: 1e-4,
            measurement_noise_acceleration: 1e-3,
        }
    }
}

/// Episode recording configuration.
#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Directory for persisted episode snapshots
    pub output_dir: PathBuf,

    /// Minimum interval between flushes to disk while recording (s)
    #[validate(range(min = 1.0))]
    pub flush_interval_s: f64,

    /// Margin kept before takeoff and after completion when trimming (s)
    #[validate(range(min = 0.0))]
    pub window_margin_s: f64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./recordings"),
            flush_interval_s: 10.0,
            window_margin_s: 20.0,
        }
    }
}

/// Replay playback configuration.
#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Replay timer period, matching the original capture rate (s)
    #[validate(range(min = 0.001))]
    pub tick_interval_s: f64,

    /// Playback rate multiplier (1.0 = original speed)
    #[validate(range(min = 0.01))]
    pub speed_multiplier: f64,

    /// Fast-forward this far into the recording without emitting (s)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_to_s: Option<f64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_s: 0.1,
            speed_multiplier: 1.0,
            skip_to_s: None,
        }
    }
}

/// Full launch profile as loaded from a profile file.
#[derive(Debug, Clone, Default, PartialEq, Validate, Serialize, Deserialize)]
pub struct LaunchProfile {
    /// State machine thresholds
    #[serde(default)]
    #[validate(nested)]
    pub launch: LaunchSettings,

    /// Fusion filter tuning
    #[serde(default)]
    #[validate(nested)]
    pub filter: FilterTuning,

    /// Recording behaviour
    #[serde(default)]
    #[validate(nested)]
    pub recording: RecordingConfig,

    /// Replay behaviour
    #[serde(default)]
    #[validate(nested)]
    pub playback: PlaybackConfig,
}
