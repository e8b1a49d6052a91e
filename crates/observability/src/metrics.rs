//! Launch pipeline metric collection.
//!
//! Prometheus recorders for the hot path plus an in-memory aggregator for
//! the end-of-run summary.

use std::collections::HashMap;

use metrics::{counter, gauge, histogram};

use contracts::{ChannelKind, LaunchPhase, SensorEvent};

const MPS_TO_KMH: f64 = 3.6;

/// Record one raw event arriving from a hub.
pub fn record_event_received(kind: ChannelKind) {
    counter!(
        "launch_events_received_total",
        "channel" => format!("{kind:?}").to_lowercase()
    )
    .increment(1);
}

/// Record one fused speed/acceleration pair.
pub fn record_fused_sample(speed_mps: f64, acceleration_mps2: f64) {
    counter!("launch_fused_samples_total").increment(1);
    gauge!("launch_fused_speed_kmh").set(speed_mps * MPS_TO_KMH);
    gauge!("launch_fused_acceleration_mps2").set(acceleration_mps2);
    histogram!("launch_fused_speed_kmh_hist").record(speed_mps * MPS_TO_KMH);
}

/// Record a phase transition.
pub fn record_phase_transition(from: LaunchPhase, to: LaunchPhase) {
    counter!(
        "launch_phase_transitions_total",
        "from" => format!("{from:?}"),
        "to" => format!("{to:?}")
    )
    .increment(1);
}

/// In-memory aggregation of one run, for the console summary.
#[derive(Debug, Clone, Default)]
pub struct LaunchMetricsAggregator {
    /// Raw events per channel
    pub events_per_channel: HashMap<ChannelKind, u64>,

    /// Fused sample count
    pub samples_fused: u64,

    /// Samples dropped for timestamp-order violations
    pub samples_dropped: u64,

    /// Phase transition history, in order
    pub transitions: Vec<LaunchPhase>,

    /// Fused speed statistics (km/h)
    pub speed_kmh: RunningStats,

    /// Fused acceleration statistics (m/s²)
    pub acceleration: RunningStats,

    /// Altitude statistics (m)
    pub altitude: RunningStats,
}

impl LaunchMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&mut self, event: &SensorEvent) {
        *self.events_per_channel.entry(event.kind()).or_insert(0) += 1;
    }

    pub fn record_fused(&mut self, speed_mps: f64, acceleration_mps2: f64) {
        self.samples_fused += 1;
        self.speed_kmh.push(speed_mps * MPS_TO_KMH);
        self.acceleration.push(acceleration_mps2);
    }

    pub fn record_altitude(&mut self, altitude_m: f64) {
        self.altitude.push(altitude_m);
    }

    pub fn record_transition(&mut self, to: LaunchPhase) {
        self.transitions.push(to);
    }

    /// Build the end-of-run summary.
    pub fn summary(&self) -> LaunchSummary {
        LaunchSummary {
            total_events: self.events_per_channel.values().sum(),
            samples_fused: self.samples_fused,
            samples_dropped: self.samples_dropped,
            transitions: self.transitions.clone(),
            final_phase: self.transitions.last().copied(),
            speed_kmh: StatsSummary::from(&self.speed_kmh),
            acceleration: StatsSummary::from(&self.acceleration),
            altitude_m: StatsSummary::from(&self.altitude),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Run summary.
#[derive(Debug, Clone, Default)]
pub struct LaunchSummary {
    pub total_events: u64,
    pub samples_fused: u64,
    pub samples_dropped: u64,
    pub transitions: Vec<LaunchPhase>,
    pub final_phase: Option<LaunchPhase>,
    pub speed_kmh: StatsSummary,
    pub acceleration: StatsSummary,
    pub altitude_m: StatsSummary,
}

impl std::fmt::Display for LaunchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Launch Summary ===")?;
        writeln!(f, "Raw events: {}", self.total_events)?;
        writeln!(f, "Fused samples: {}", self.samples_fused)?;
        writeln!(f, "Dropped samples: {}", self.samples_dropped)?;
        writeln!(f, "Speed (km/h): {}", self.speed_kmh)?;
        writeln!(f, "Acceleration (m/s²): {}", self.acceleration)?;
        writeln!(f, "Altitude (m): {}", self.altitude_m)?;

        if self.transitions.is_empty() {
            writeln!(f, "Phases: (none)")?;
        } else {
            let phases: Vec<String> = self.transitions.iter().map(|p| format!("{p:?}")).collect();
            writeln!(f, "Phases: {}", phases.join(" -> "))?;
        }

        Ok(())
    }
}

/// Statistics summary.
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm).
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Sample, Timestamp};

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_summary() {
        let mut aggregator = LaunchMetricsAggregator::new();

        aggregator.record_event(&SensorEvent::Speed(Sample::new(
            Timestamp::Relative { relative: 0.0 },
            10.0,
        )));
        aggregator.record_fused(10.0, 1.5);
        aggregator.record_fused(20.0, 2.0);
        aggregator.record_altitude(300.0);
        aggregator.record_transition(LaunchPhase::TakingOff);
        aggregator.record_transition(LaunchPhase::Completed);

        let summary = aggregator.summary();
        assert_eq!(summary.total_events, 1);
        assert_eq!(summary.samples_fused, 2);
        assert_eq!(summary.final_phase, Some(LaunchPhase::Completed));
        assert!((summary.speed_kmh.max - 72.0).abs() < 1e-9);

        let text = summary.to_string();
        assert!(text.contains("TakingOff -> Completed"));
    }

    #[test]
    fn test_empty_stats_display() {
        assert_eq!(StatsSummary::default().to_string(), "N/A");
    }
}
