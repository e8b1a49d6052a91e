//! Fusion engine - synchronous reducer over the sensor event stream.

use tracing::{instrument, trace};

use contracts::{FilterTuning, LaunchError, Sample, SensorEvent, Vector3};

use crate::altitude::pressure_to_altitude;
use crate::ekf::SpeedKalmanFilter;

/// Output of one engine step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionUpdate {
    /// Fused speed/acceleration pair, carrying the velocity measurement's
    /// timestamp.
    Fused {
        speed: Sample<f64>,
        acceleration: Sample<f64>,
    },

    /// Altitude derived from a pressure sample.
    Altitude(Sample<f64>),
}

/// Sensor fusion engine
///
/// Consumes the raw event stream one event at a time and emits fused
/// estimates. Each velocity measurement triggers, in order, one control
/// update with the most recent acceleration, one covariance prediction,
/// then one velocity correction. The ordering changes numerical results
/// and is not reorderable.
#[derive(Debug)]
pub struct FusionEngine {
    filter: SpeedKalmanFilter,
    /// Most recent longitudinal acceleration (m/s²)
    latest_acceleration: Option<Sample<f64>>,
    samples_fused: u64,
}

impl FusionEngine {
    /// Create a new engine with the given filter tuning.
    pub fn new(tuning: &FilterTuning) -> Self {
        Self {
            filter: SpeedKalmanFilter::new(tuning),
            latest_acceleration: None,
            samples_fused: 0,
        }
    }

    /// Push one event into the engine.
    ///
    /// Returns `Some(FusionUpdate)` when the event produced a derived
    /// sample (fused pair for speed, altitude for pressure).
    ///
    /// # Errors
    /// [`LaunchError::SingularCovariance`] terminates the episode.
    #[instrument(level = "trace", name = "fusion_engine_push", skip(self, event))]
    pub fn push(&mut self, event: &SensorEvent) -> Result<Option<FusionUpdate>, LaunchError> {
        match event {
            SensorEvent::Acceleration(sample) => {
                self.latest_acceleration =
                    Some(Sample::new(sample.timestamp, longitudinal(&sample.value)));
                Ok(None)
            }
            SensorEvent::Speed(sample) => self.fuse_velocity(sample).map(Some),
            SensorEvent::Pressure(sample) => Ok(Some(FusionUpdate::Altitude(Sample::new(
                sample.timestamp,
                pressure_to_altitude(sample.value),
            )))),
            _ => Ok(None),
        }
    }

    /// Fused sample count for diagnostics.
    pub fn samples_fused(&self) -> u64 {
        self.samples_fused
    }

    /// Start a fresh episode: zero filter state, drop the held
    /// acceleration sample.
    pub fn reset(&mut self) {
        self.filter.reset();
        self.latest_acceleration = None;
        self.samples_fused = 0;
    }

    fn fuse_velocity(&mut self, measurement: &Sample<f64>) -> Result<FusionUpdate, LaunchError> {
        let control = self
            .latest_acceleration
            .as_ref()
            .map(|s| s.value)
            .unwrap_or(0.0);

        // Control update, then prediction, then correction. Fixed order.
        self.filter.update_with_acceleration(control);
        self.filter.predict();
        self.filter.update_with_velocity(measurement.value)?;

        self.samples_fused += 1;
        metrics::counter!("fusion_samples_total").increment(1);
        metrics::histogram!("fusion_speed_mps").record(self.filter.velocity());

        trace!(
            measured = measurement.value,
            fused = self.filter.velocity(),
            control,
            "velocity sample fused"
        );

        Ok(FusionUpdate::Fused {
            speed: Sample::new(measurement.timestamp, self.filter.velocity()),
            acceleration: Sample::new(measurement.timestamp, self.filter.acceleration()),
        })
    }
}

/// Longitudinal component of a device-frame acceleration.
///
/// Convention: device +z points toward the nose, so positive values mean
/// forward acceleration. The source history flip-flopped on this sign;
/// this crate fixes it here and nowhere else.
#[inline]
fn longitudinal(acceleration: &Vector3) -> f64 {
    acceleration.z
}
