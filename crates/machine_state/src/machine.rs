//! The launch phase state machine.

use std::sync::Arc;

use tracing::{debug, info};

use contracts::{ClockOrigin, LaunchPhase, LaunchSettings, PhaseInfo, Sample, Timestamp};

use crate::smoothing::SmoothingWindow;

/// Moving-average width for the acceleration channel.
const ACCELERATION_WINDOW: usize = 10;

const MPS_TO_KMH: f64 = 3.6;

/// One input sample for the state machine.
///
/// Speed and acceleration come fused from the filter (m/s, m/s²),
/// altitude comes from the barometric conversion (m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MachineInput {
    Speed(Sample<f64>),
    Acceleration(Sample<f64>),
    Altitude(Sample<f64>),
}

impl MachineInput {
    fn timestamp(&self) -> Timestamp {
        match self {
            MachineInput::Speed(s) | MachineInput::Acceleration(s) | MachineInput::Altitude(s) => {
                s.timestamp
            }
        }
    }
}

/// Winch launch phase classifier.
///
/// A synchronous reducer over the fused sample stream. Each accepted
/// input updates its channel's latest value; once all three channels have
/// been seen, every accepted input evaluates one tick against the latest
/// combined values. All timing is data-driven: elapsed time comes from
/// sample timestamps, never from the wall clock, so replayed episodes
/// classify identically to live ones.
#[derive(Debug)]
pub struct LaunchStateMachine {
    origin: Arc<ClockOrigin>,
    info: PhaseInfo,

    latest_speed: Option<Sample<f64>>,
    latest_acceleration: Option<Sample<f64>>,
    latest_altitude: Option<Sample<f64>>,

    smoothing: SmoothingWindow,

    /// Relative time of the takeoff transition, for the timeout rules
    takeoff_time: Option<f64>,
    /// Relative time of the last evaluated tick
    last_tick: Option<f64>,

    dropped_samples: u64,
}

impl LaunchStateMachine {
    pub fn new(origin: Arc<ClockOrigin>) -> Self {
        let start = origin.timestamp_now();
        Self {
            origin,
            info: PhaseInfo::waiting(start),
            latest_speed: None,
            latest_acceleration: None,
            latest_altitude: None,
            smoothing: SmoothingWindow::new(ACCELERATION_WINDOW),
            takeoff_time: None,
            last_tick: None,
            dropped_samples: 0,
        }
    }

    /// Current phase record.
    pub fn phase_info(&self) -> &PhaseInfo {
        &self.info
    }

    /// Latest smoothed acceleration (m/s²), if any has been seen.
    pub fn smoothed_acceleration(&self) -> Option<Sample<f64>> {
        self.latest_acceleration
    }

    /// Samples dropped for violating timestamp order.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped_samples
    }

    /// Feed one sample and evaluate a tick.
    ///
    /// Returns the new [`PhaseInfo`] when the classification changed.
    /// Out-of-order samples are dropped silently; thresholds are read from
    /// `settings` at every tick, so changes take effect mid-episode.
    pub fn update(
        &mut self,
        input: MachineInput,
        settings: &LaunchSettings,
    ) -> Option<Sample<PhaseInfo>> {
        let at = input.timestamp().resolve(&self.origin);

        if !self.accept(&input, at) {
            self.dropped_samples += 1;
            metrics::counter!("machine_dropped_samples_total").increment(1);
            debug!(at, "out-of-order sample dropped");
            return None;
        }

        match input {
            MachineInput::Speed(sample) => self.latest_speed = Some(sample),
            MachineInput::Acceleration(sample) => {
                let smoothed = self.smoothing.push(sample.value);
                self.latest_acceleration = Some(Sample::new(sample.timestamp, smoothed));
            }
            MachineInput::Altitude(sample) => self.latest_altitude = Some(sample),
        }

        // No tick without a combined sample of all three inputs
        let (speed, altitude) = match (&self.latest_speed, &self.latest_altitude) {
            (Some(speed), Some(altitude)) if self.latest_acceleration.is_some() => {
                (*speed, *altitude)
            }
            _ => return None,
        };

        self.last_tick = Some(at);
        self.tick(input.timestamp(), at, speed, altitude, settings)
    }

    /// Start a new episode: back to waiting, per-episode accumulators
    /// cleared.
    pub fn reset(&mut self) {
        self.info = PhaseInfo::waiting(self.origin.timestamp_now());
        self.latest_speed = None;
        self.latest_acceleration = None;
        self.latest_altitude = None;
        self.smoothing.clear();
        self.takeoff_time = None;
        self.last_tick = None;
        info!("state machine reset to waiting");
    }

    /// Order check. A sample older than its own channel's latest value or
    /// older than the last evaluated tick is rejected. Equal timestamps
    /// across channels are fine (fused speed and acceleration share one).
    fn accept(&self, input: &MachineInput, at: f64) -> bool {
        if self.last_tick.is_some_and(|last| at < last) {
            return false;
        }
        let channel_latest = match input {
            MachineInput::Speed(_) => &self.latest_speed,
            MachineInput::Acceleration(_) => &self.latest_acceleration,
            MachineInput::Altitude(_) => &self.latest_altitude,
        };
        !channel_latest
            .as_ref()
            .is_some_and(|latest| at <= latest.timestamp.resolve(&self.origin))
    }

    fn tick(
        &mut self,
        timestamp: Timestamp,
        at: f64,
        speed: Sample<f64>,
        altitude: Sample<f64>,
        settings: &LaunchSettings,
    ) -> Option<Sample<PhaseInfo>> {
        let before = self.info.clone();

        // Highest altitude so far, tracked on every tick
        match &self.info.max_altitude {
            Some(max) if max.value >= altitude.value => {}
            _ => self.info.max_altitude = Some(altitude),
        }

        if !self.info.state.is_terminal() {
            let speed_kmh = speed.value * MPS_TO_KMH;

            // Timeout rules take precedence over speed-band re-entry
            if let Some(takeoff) = self.takeoff_time {
                let elapsed = at - takeoff;
                let altitude_gain = self
                    .info
                    .take_off_altitude
                    .as_ref()
                    .map(|t| altitude.value - t.value)
                    .unwrap_or(0.0);

                if elapsed >= settings.complete_after_s {
                    self.enter(LaunchPhase::Completed, timestamp);
                    self.info.final_altitude = Some(altitude);
                } else if elapsed >= settings.abort_after_s
                    && altitude_gain < settings.abort_altitude_gain_m
                    && speed_kmh < settings.speed_threshold_kmh
                {
                    self.enter(LaunchPhase::Aborted, timestamp);
                    self.info.final_altitude = Some(altitude);
                }
            }

            if !self.info.state.is_terminal() {
                self.speed_band_transition(timestamp, speed_kmh, altitude, settings, at);
            }
        }

        if self.info != before {
            Some(Sample::new(timestamp, self.info.clone()))
        } else {
            None
        }
    }

    fn speed_band_transition(
        &mut self,
        timestamp: Timestamp,
        speed_kmh: f64,
        altitude: Sample<f64>,
        settings: &LaunchSettings,
        at: f64,
    ) {
        use LaunchPhase::*;

        let next = match self.info.state {
            Waiting if speed_kmh > settings.speed_threshold_kmh => Some(TakingOff),
            TakingOff if speed_kmh > settings.max_speed_kmh => Some(MaxSpeedReached),
            TakingOff if speed_kmh > settings.min_speed_kmh => Some(MinSpeedReached),
            MinSpeedReached if speed_kmh > settings.max_speed_kmh => Some(MaxSpeedReached),
            MinSpeedReached if speed_kmh < settings.min_speed_kmh => Some(MinSpeedLost),
            MinSpeedLost if speed_kmh > settings.max_speed_kmh => Some(MaxSpeedReached),
            MinSpeedLost if speed_kmh > settings.min_speed_kmh => Some(MinSpeedReached),
            MaxSpeedReached if speed_kmh < settings.min_speed_kmh => Some(MinSpeedReached),
            _ => None,
        };

        if let Some(next) = next {
            if next == TakingOff {
                self.info.take_off_altitude = Some(altitude);
                self.takeoff_time = Some(at);
            }
            self.enter(next, timestamp);
        }
    }

    fn enter(&mut self, next: LaunchPhase, timestamp: Timestamp) {
        info!(from = ?self.info.state, to = ?next, "phase transition");
        metrics::counter!("machine_phase_transitions_total").increment(1);
        self.info.state = next;
        self.info.state_timestamp = timestamp;
    }
}
