//! Extended-Kalman-style speed estimator.
//!
//! 2-state constant-acceleration model driven by two measurement streams:
//! a low-rate, noisy direct velocity measurement (GPS speed) and a
//! high-rate acceleration reading used as a control input rather than a
//! direct observation.

use nalgebra::{Matrix2, Vector2};

use contracts::{FilterTuning, LaunchError};

/// Speed/acceleration Kalman filter
///
/// State vector x = [velocity, acceleration]^T.
/// Transition matrix F = [[1, Δt], [0, 1]]
/// Observation matrix H = [[1, 0], [0, 0]] (only velocity is observed)
///
/// Acceleration uncertainty is folded into the process noise, not the
/// measurement noise, so the control update never touches the covariance.
#[derive(Debug, Clone)]
pub struct SpeedKalmanFilter {
    /// Current state estimate [velocity, acceleration]
    state: Vector2<f64>,
    /// Error covariance P
    covariance: Matrix2<f64>,
    /// State transition F
    transition: Matrix2<f64>,
    /// Observation H
    observation: Matrix2<f64>,
    /// Process noise Q
    process_noise: Matrix2<f64>,
    /// Measurement noise R
    measurement_noise: Matrix2<f64>,
    /// Fixed model time step Δt (seconds)
    time_step: f64,
}

impl SpeedKalmanFilter {
    /// Create a new filter from tuning values.
    pub fn new(tuning: &FilterTuning) -> Self {
        let dt = tuning.time_step_s;
        Self {
            state: Vector2::zeros(),
            covariance: Matrix2::identity(),
            transition: Matrix2::new(1.0, dt, 0.0, 1.0),
            observation: Matrix2::new(1.0, 0.0, 0.0, 0.0),
            process_noise: Matrix2::new(tuning.process_noise_velocity, 0.0, 0.0, tuning.process_noise_acceleration),
            measurement_noise: Matrix2::new(
                tuning.measurement_noise_velocity,
                0.0,
                0.0,
                tuning.measurement_noise_acceleration,
            ),
            time_step: dt,
        }
    }

    /// Current velocity estimate (m/s).
    #[inline]
    pub fn velocity(&self) -> f64 {
        self.state[0]
    }

    /// Current acceleration estimate (m/s²).
    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.state[1]
    }

    /// Current velocity error variance P[0,0].
    #[inline]
    pub fn velocity_variance(&self) -> f64 {
        self.covariance[(0, 0)]
    }

    /// Apply one acceleration reading as a control input.
    ///
    /// `velocity += a·Δt`, the stored acceleration becomes `a`. The error
    /// covariance is untouched. Must be called once per acceleration
    /// sample, before [`SpeedKalmanFilter::predict`].
    pub fn update_with_acceleration(&mut self, acceleration: f64) {
        self.state[0] += acceleration * self.time_step;
        self.state[1] = acceleration;
    }

    /// Advance the error covariance one step: P = F·P·Fᵗ + Q.
    pub fn predict(&mut self) {
        self.covariance =
            self.transition * self.covariance * self.transition.transpose() + self.process_noise;
    }

    /// Correct the state against one velocity measurement (m/s).
    ///
    /// # Errors
    /// [`LaunchError::SingularCovariance`] if the residual covariance is
    /// not invertible. Not expected given positive-definite R; callers
    /// must treat it as fatal for the episode.
    pub fn update_with_velocity(&mut self, measurement: f64) -> Result<(), LaunchError> {
        let residual = measurement - (self.observation * self.state)[0];
        let residual_covariance =
            self.observation * self.covariance * self.observation.transpose()
                + self.measurement_noise;
        let inverse = residual_covariance
            .try_inverse()
            .ok_or(LaunchError::SingularCovariance)?;
        let gain = self.covariance * self.observation.transpose() * inverse;

        self.state += gain * Vector2::new(residual, 0.0);
        self.covariance -= gain * self.observation * self.covariance;
        Ok(())
    }

    /// Return to the zero state with identity covariance.
    pub fn reset(&mut self) {
        self.state = Vector2::zeros();
        self.covariance = Matrix2::identity();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> SpeedKalmanFilter {
        SpeedKalmanFilter::new(&FilterTuning::default())
    }

    /// One full correction cycle in the mandated order.
    fn step(kf: &mut SpeedKalmanFilter, acceleration: f64, velocity: f64) {
        kf.update_with_acceleration(acceleration);
        kf.predict();
        kf.update_with_velocity(velocity).unwrap();
    }

    #[test]
    fn test_null_input_is_fixed_point() {
        let mut kf = filter();
        for _ in 0..100 {
            step(&mut kf, 0.0, 0.0);
        }
        assert_eq!(kf.velocity(), 0.0);
        assert_eq!(kf.acceleration(), 0.0);
    }

    #[test]
    fn test_converges_to_constant_velocity() {
        let mut kf = filter();
        let true_velocity = 25.0;

        // Noise-free measurements, no acceleration
        for _ in 0..50 {
            step(&mut kf, 0.0, true_velocity);
        }

        assert!(
            (kf.velocity() - true_velocity).abs() < 0.1,
            "expected ~{}, got {}",
            true_velocity,
            kf.velocity()
        );
    }

    #[test]
    fn test_tracks_constant_acceleration_profile() {
        let mut kf = filter();
        let dt = 0.1;
        let a = 3.0;

        // v(t) = a·t measured exactly
        for i in 1..=100 {
            let v = a * dt * i as f64;
            step(&mut kf, a, v);
        }

        let expected = a * dt * 100.0;
        assert!(
            (kf.velocity() - expected).abs() < 0.5,
            "expected ~{}, got {}",
            expected,
            kf.velocity()
        );
        assert!((kf.acceleration() - a).abs() < 1e-9);
    }

    #[test]
    fn test_acceleration_update_leaves_covariance() {
        let mut kf = filter();
        let before = kf.velocity_variance();
        kf.update_with_acceleration(5.0);
        assert_eq!(kf.velocity_variance(), before);
        assert!((kf.velocity() - 0.5).abs() < 1e-12); // 5.0 * 0.1
        assert_eq!(kf.acceleration(), 5.0);
    }

    #[test]
    fn test_predict_grows_covariance() {
        let mut kf = filter();
        let before = kf.velocity_variance();
        kf.predict();
        assert!(kf.velocity_variance() > before);
    }

    #[test]
    fn test_correction_shrinks_covariance() {
        let mut kf = filter();
        kf.predict();
        let before = kf.velocity_variance();
        kf.update_with_velocity(0.0).unwrap();
        assert!(kf.velocity_variance() < before);
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut kf = filter();
        step(&mut kf, 2.0, 10.0);
        kf.reset();
        assert_eq!(kf.velocity(), 0.0);
        assert_eq!(kf.acceleration(), 0.0);
        assert_eq!(kf.velocity_variance(), 1.0);
    }
}
