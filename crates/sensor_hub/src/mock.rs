//! Synthetic launch generator.
//!
//! Produces a deterministic winch launch across all eight channels so the
//! whole pipeline can run without hardware: idle, hard acceleration past
//! the top of the speed band, a long climb, release, rollout. GPS-rate
//! channels emit at 1 Hz while the accelerometer-rate channels emit at the
//! full sample rate, so the fusion filter sees realistic input spacing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::debug;

use contracts::{
    GeoCoordinate, Sample, SensorEvent, SensorEventCallback, SensorHub, Timestamp, Vector3,
};

const SEA_LEVEL_KPA: f64 = 101.325;

const IDLE_END_S: f64 = 5.0;
const ACCEL_END_S: f64 = 13.0;
const RELEASE_S: f64 = 45.0;
const FIELD_ALTITUDE_M: f64 = 280.0;

/// Mock hub configuration.
#[derive(Debug, Clone)]
pub struct MockLaunchConfig {
    /// Scripted episode length (s)
    pub duration_s: f64,
    /// Base sample rate for the accelerometer-class channels (Hz)
    pub sample_rate_hz: f64,
    /// Emission speed factor (script time is unaffected)
    pub time_scale: f64,
}

impl Default for MockLaunchConfig {
    fn default() -> Self {
        Self {
            duration_s: 60.0,
            sample_rate_hz: 10.0,
            time_scale: 1.0,
        }
    }
}

/// One instant of the scripted launch.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProfilePoint {
    speed_mps: f64,
    acceleration_mps2: f64,
    altitude_m: f64,
}

fn profile(t: f64) -> ProfilePoint {
    if t < IDLE_END_S {
        ProfilePoint {
            speed_mps: 0.0,
            acceleration_mps2: 0.0,
            altitude_m: FIELD_ALTITUDE_M,
        }
    } else if t < ACCEL_END_S {
        let dt = t - IDLE_END_S;
        ProfilePoint {
            speed_mps: 4.0 * dt,
            acceleration_mps2: 4.0,
            altitude_m: FIELD_ALTITUDE_M + 2.0 * dt,
        }
    } else if t < RELEASE_S {
        let dt = t - ACCEL_END_S;
        ProfilePoint {
            // Bleeds from 32 m/s toward 27 m/s over the climb
            speed_mps: 32.0 - 5.0 * dt / (RELEASE_S - ACCEL_END_S),
            acceleration_mps2: -5.0 / (RELEASE_S - ACCEL_END_S),
            altitude_m: FIELD_ALTITUDE_M + 16.0 + 9.0 * dt,
        }
    } else {
        let dt = t - RELEASE_S;
        let speed = (27.0 - 3.0 * dt).max(0.0);
        ProfilePoint {
            speed_mps: speed,
            acceleration_mps2: if speed > 0.0 { -3.0 } else { 0.0 },
            altitude_m: FIELD_ALTITUDE_M + 16.0 + 9.0 * (RELEASE_S - ACCEL_END_S),
        }
    }
}

/// Inverse of the barometric altitude formula.
fn pressure_at(altitude_m: f64) -> f64 {
    SEA_LEVEL_KPA * (1.0 - altitude_m / 44330.0).powf(5.257)
}

/// Deterministic synthetic launch hub.
pub struct MockLaunchHub {
    config: MockLaunchConfig,
    listening: Arc<AtomicBool>,
}

impl MockLaunchHub {
    pub fn new(config: MockLaunchConfig) -> Self {
        Self {
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(MockLaunchConfig::default())
    }

    /// The full scripted event sequence, in emission order.
    ///
    /// Pure function of the config: two calls produce identical output.
    /// Tests can drive the pipeline from this directly, without threads.
    pub fn script(config: &MockLaunchConfig) -> Vec<SensorEvent> {
        let steps = (config.duration_s * config.sample_rate_hz) as usize;
        let gps_divisor = config.sample_rate_hz.round().max(1.0) as usize;

        let mut events = Vec::with_capacity(steps * 3);
        for step in 0..steps {
            let t = step as f64 / config.sample_rate_hz;
            let ts = Timestamp::Relative { relative: t };
            let point = profile(t);

            // Full-rate channels: orientation, acceleration, pressure
            events.push(SensorEvent::Roll(Sample::new(ts, 0.02 * (t * 0.9).sin())));
            events.push(SensorEvent::Pitch(Sample::new(
                ts,
                if point.speed_mps > 20.0 { 0.6 } else { 0.05 },
            )));
            events.push(SensorEvent::Heading(Sample::new(
                ts,
                270.0 + 2.0 * (t * 0.3).sin(),
            )));
            events.push(SensorEvent::Acceleration(Sample::new(
                ts,
                Vector3 {
                    x: 0.03 * (t * 2.1).sin(),
                    y: 0.03 * (t * 1.7).cos(),
                    z: point.acceleration_mps2,
                },
            )));
            events.push(SensorEvent::Pressure(Sample::new(
                ts,
                pressure_at(point.altitude_m),
            )));

            // GPS-rate channels at 1 Hz
            if step % gps_divisor == 0 {
                events.push(SensorEvent::Speed(Sample::new(ts, point.speed_mps)));
                events.push(SensorEvent::Altitude(Sample::new(ts, point.altitude_m)));
                events.push(SensorEvent::Location(Sample::new(
                    ts,
                    GeoCoordinate {
                        latitude: 51.0 + t * 1e-5,
                        longitude: 9.0 + t * 2e-5,
                    },
                )));
            }
        }
        events
    }
}

impl SensorHub for MockLaunchHub {
    fn name(&self) -> &str {
        "mock_launch"
    }

    fn start(&self, callback: SensorEventCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let listening = self.listening.clone();
        let config = self.config.clone();
        let step_period =
            Duration::from_secs_f64(1.0 / (config.sample_rate_hz * config.time_scale));

        thread::spawn(move || {
            debug!(duration_s = config.duration_s, "mock launch started");

            let events = MockLaunchHub::script(&config);
            let mut last_step = None;
            for event in events {
                if !listening.load(Ordering::Relaxed) {
                    break;
                }

                // Pace per script step, not per event
                let step = event.timestamp();
                if last_step.is_some_and(|prev| prev != step) {
                    thread::sleep(step_period);
                }
                last_step = Some(step);

                callback(event);
            }

            listening.store(false, Ordering::SeqCst);
            debug!("mock launch finished");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ChannelKind;
    use std::collections::HashSet;
    use std::sync::mpsc;

    #[test]
    fn test_script_is_deterministic() {
        let config = MockLaunchConfig::default();
        assert_eq!(MockLaunchHub::script(&config), MockLaunchHub::script(&config));
    }

    #[test]
    fn test_script_covers_all_channels() {
        let kinds: HashSet<ChannelKind> = MockLaunchHub::script(&MockLaunchConfig::default())
            .iter()
            .map(|e| e.kind())
            .collect();
        assert_eq!(kinds.len(), ChannelKind::ALL.len());
    }

    #[test]
    fn test_script_exceeds_speed_band() {
        let top = MockLaunchHub::script(&MockLaunchConfig::default())
            .iter()
            .filter_map(|e| match e {
                SensorEvent::Speed(s) => Some(s.value),
                _ => None,
            })
            .fold(0.0f64, f64::max);
        // Peak speed clears 110 km/h
        assert!(top * 3.6 > 110.0, "peak was {} km/h", top * 3.6);
    }

    #[test]
    fn test_gps_channels_are_downsampled() {
        let events = MockLaunchHub::script(&MockLaunchConfig::default());
        let speed = events.iter().filter(|e| e.kind() == ChannelKind::Speed).count();
        let accel = events
            .iter()
            .filter(|e| e.kind() == ChannelKind::Acceleration)
            .count();
        assert_eq!(accel, 10 * speed);
    }

    #[test]
    fn test_pressure_inverts_to_altitude() {
        // Round trip through the barometric formula
        let p = pressure_at(FIELD_ALTITUDE_M);
        let h = 44330.0 * (1.0 - (p / SEA_LEVEL_KPA).powf(1.0 / 5.257));
        assert!((h - FIELD_ALTITUDE_M).abs() < 1e-6);
    }

    #[test]
    fn test_hub_emits_through_callback() {
        let hub = MockLaunchHub::new(MockLaunchConfig {
            duration_s: 1.0,
            sample_rate_hz: 10.0,
            time_scale: 100.0,
        });

        let (tx, rx) = mpsc::channel();
        hub.start(Arc::new(move |event| {
            let _ = tx.send(event);
        }));

        let mut received = 0;
        while rx.recv_timeout(Duration::from_secs(2)).is_ok() {
            received += 1;
        }
        // 10 steps of 5 full-rate events plus one GPS burst per second
        assert!(received >= 50);
        hub.stop();
    }
}
