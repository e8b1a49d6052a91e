//! In-memory episode recording.

use std::sync::Arc;

use tracing::{debug, info};

use contracts::{ClockOrigin, RecordingConfig, SensorEvent, SensorSnapshot};

/// Single-writer recorder for one episode.
///
/// Appends incoming events to a snapshot while active, each rebased to the
/// relative encoding so the persisted document is independent of the
/// absolute clock. [`Recorder::finish`] trims the snapshot to a window
/// around the detected launch and normalizes it.
#[derive(Debug)]
pub struct Recorder {
    origin: Arc<ClockOrigin>,
    snapshot: SensorSnapshot,
    active: bool,
    window_margin_s: f64,
}

impl Recorder {
    pub fn new(origin: Arc<ClockOrigin>, config: &RecordingConfig) -> Self {
        Self {
            origin,
            snapshot: SensorSnapshot::new(),
            active: false,
            window_margin_s: config.window_margin_s,
        }
    }

    /// Begin a fresh episode, discarding any previous samples.
    pub fn start(&mut self) {
        self.snapshot = SensorSnapshot::new();
        self.active = true;
        info!("recording started");
    }

    /// Stop appending without trimming (an episode that never launched).
    pub fn stop(&mut self) {
        self.active = false;
        debug!(samples = self.snapshot.total_samples(), "recording stopped");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append one event. Ignored while inactive.
    pub fn record(&mut self, event: &SensorEvent) {
        if !self.active {
            return;
        }
        self.snapshot.push_event(&event.to_relative(&self.origin));
        metrics::counter!("recorder_events_total").increment(1);
    }

    /// Read-only view of the in-progress snapshot.
    pub fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    /// Copy of the in-progress snapshot, for the periodic flush.
    pub fn snapshot_copy(&self) -> SensorSnapshot {
        self.snapshot.clone()
    }

    /// End the episode: trim to the window
    /// `[takeoff − margin, completion + margin]`, normalize, and hand the
    /// result out. The recorder is left inactive and empty.
    pub fn finish(&mut self, takeoff_rel: f64, completion_rel: f64) -> SensorSnapshot {
        self.active = false;

        let mut snapshot = std::mem::take(&mut self.snapshot);
        let before = snapshot.total_samples();

        snapshot.prefix(&self.origin, takeoff_rel - self.window_margin_s);
        snapshot.suffix(&self.origin, completion_rel + self.window_margin_s);
        snapshot.normalize(&self.origin);

        info!(
            samples = snapshot.total_samples(),
            trimmed = before - snapshot.total_samples(),
            "episode finished"
        );
        snapshot
    }

    /// Discard everything and go inactive.
    pub fn reset(&mut self) {
        self.snapshot = SensorSnapshot::new();
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Sample, Timestamp};

    fn rel(t: f64) -> Timestamp {
        Timestamp::Relative { relative: t }
    }

    fn recorder() -> Recorder {
        Recorder::new(
            Arc::new(ClockOrigin::at_epoch(1000.0)),
            &RecordingConfig::default(),
        )
    }

    #[test]
    fn test_record_only_while_active() {
        let mut recorder = recorder();

        recorder.record(&SensorEvent::Speed(Sample::new(rel(1.0), 10.0)));
        assert!(recorder.snapshot().is_empty());

        recorder.start();
        recorder.record(&SensorEvent::Speed(Sample::new(rel(2.0), 20.0)));
        assert_eq!(recorder.snapshot().total_samples(), 1);

        recorder.stop();
        recorder.record(&SensorEvent::Speed(Sample::new(rel(3.0), 30.0)));
        assert_eq!(recorder.snapshot().total_samples(), 1);
    }

    #[test]
    fn test_events_are_rebased_to_relative() {
        let mut recorder = recorder();
        recorder.start();

        // Absolute epoch 1003.5 against origin 1000.0
        recorder.record(&SensorEvent::Altitude(Sample::new(
            Timestamp::Absolute(1003.5),
            120.0,
        )));
        assert_eq!(recorder.snapshot().altitude[0].timestamp, rel(3.5));
    }

    #[test]
    fn test_finish_trims_and_normalizes() {
        let mut recorder = Recorder::new(
            Arc::new(ClockOrigin::at_epoch(0.0)),
            &RecordingConfig {
                window_margin_s: 5.0,
                ..RecordingConfig::default()
            },
        );
        recorder.start();

        for t in [0.0, 10.0, 20.0, 50.0, 80.0, 120.0] {
            recorder.record(&SensorEvent::Speed(Sample::new(rel(t), t)));
        }

        // Takeoff at 20, completion at 60: window is (15, 65)
        let snapshot = recorder.finish(20.0, 60.0);

        assert!(!recorder.is_active());
        assert!(recorder.snapshot().is_empty());

        // 20 and 50 survive, shifted so the earliest is at zero
        assert_eq!(snapshot.speed.len(), 2);
        assert_eq!(snapshot.speed[0].timestamp, rel(0.0));
        assert_eq!(snapshot.speed[0].value, 20.0);
        assert_eq!(snapshot.speed[1].timestamp, rel(30.0));
    }

    #[test]
    fn test_start_discards_previous_episode() {
        let mut recorder = recorder();
        recorder.start();
        recorder.record(&SensorEvent::Speed(Sample::new(rel(1.0), 10.0)));

        recorder.start();
        assert!(recorder.snapshot().is_empty());
    }
}
