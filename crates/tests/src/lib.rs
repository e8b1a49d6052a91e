//! # Integration Tests
//!
//! End-to-end tests for the launch pipeline.
//!
//! Covers:
//! - Mock launch through fusion and classification
//! - Record, persist, reload, replay equivalence
//! - Abort detection on a broken-off launch

#[cfg(test)]
mod support {
    use std::sync::Arc;

    use contracts::{ClockOrigin, FilterTuning, LaunchPhase, LaunchSettings, PhaseInfo, SensorEvent};
    use fusion_engine::{FusionEngine, FusionUpdate};
    use machine_state::{LaunchStateMachine, MachineInput};

    /// Drive events through fusion and classification the way the
    /// pipeline consumer does, stopping at the first terminal phase.
    ///
    /// Returns the phase transition sequence and the final phase record.
    pub fn classify(events: &[SensorEvent]) -> (Vec<LaunchPhase>, PhaseInfo) {
        classify_with(events, &LaunchSettings::default())
    }

    pub fn classify_with(
        events: &[SensorEvent],
        settings: &LaunchSettings,
    ) -> (Vec<LaunchPhase>, PhaseInfo) {
        let origin = Arc::new(ClockOrigin::at_epoch(0.0));
        let mut fusion = FusionEngine::new(&FilterTuning::default());
        let mut machine = LaunchStateMachine::new(origin);

        let mut phases = Vec::new();
        let mut current = LaunchPhase::Waiting;

        for event in events {
            let update = fusion.push(event).expect("fusion must not fail");

            let mut updates = Vec::new();
            match update {
                Some(FusionUpdate::Fused {
                    speed,
                    acceleration,
                }) => {
                    if let Some(info) =
                        machine.update(MachineInput::Acceleration(acceleration), settings)
                    {
                        updates.push(info);
                    }
                    if let Some(info) = machine.update(MachineInput::Speed(speed), settings) {
                        updates.push(info);
                    }
                }
                Some(FusionUpdate::Altitude(altitude)) => {
                    if let Some(info) = machine.update(MachineInput::Altitude(altitude), settings)
                    {
                        updates.push(info);
                    }
                }
                None => {}
            }

            for info in updates {
                if info.value.state != current {
                    current = info.value.state;
                    phases.push(current);
                }
            }

            if current.is_terminal() {
                break;
            }
        }

        (phases, machine.phase_info().clone())
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use contracts::{ClockOrigin, LaunchPhase, Sample, SensorEvent, Timestamp, Vector3};
    use sensor_hub::{MockLaunchConfig, MockLaunchHub, SensorHub};

    use crate::support::classify;

    #[test]
    fn test_mock_launch_runs_to_completion() {
        let script = MockLaunchHub::script(&MockLaunchConfig::default());
        let (phases, info) = classify(&script);

        assert_eq!(
            phases,
            vec![
                LaunchPhase::TakingOff,
                LaunchPhase::MinSpeedReached,
                LaunchPhase::MaxSpeedReached,
                LaunchPhase::Completed,
            ]
        );

        let takeoff = info.take_off_altitude.expect("takeoff altitude recorded");
        assert!((takeoff.value - 280.0).abs() < 10.0);

        let max = info.max_altitude.expect("max altitude tracked");
        assert!(max.value > 500.0, "climb should gain altitude, got {}", max.value);

        assert!(info.final_altitude.is_some());
    }

    #[test]
    fn test_broken_off_launch_is_aborted() {
        // Rolls past the takeoff threshold once, then stops on the ground:
        // constant pressure, speed back near zero.
        let mut events = Vec::new();
        for t in 0..=8 {
            let t = t as f64;
            let ts = Timestamp::Relative { relative: t };
            let speed = if t < 1.0 {
                0.0
            } else if t < 2.0 {
                5.0
            } else {
                0.5
            };

            events.push(SensorEvent::Acceleration(Sample::new(
                ts,
                Vector3 {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                },
            )));
            events.push(SensorEvent::Pressure(Sample::new(ts, 98.0)));
            events.push(SensorEvent::Speed(Sample::new(ts, speed)));
        }

        let (phases, info) = classify(&events);

        assert_eq!(phases, vec![LaunchPhase::TakingOff, LaunchPhase::Aborted]);
        assert!(info.final_altitude.is_some());
    }

    #[tokio::test]
    async fn test_hub_to_channel_pipeline_completes() {
        let hub = MockLaunchHub::new(MockLaunchConfig {
            time_scale: 200.0,
            ..MockLaunchConfig::default()
        });

        let (tx, mut rx) = tokio::sync::mpsc::channel::<SensorEvent>(100);
        hub.start(Arc::new(move |event| {
            let _ = tx.blocking_send(event);
        }));

        let collect = async {
            let mut events = Vec::new();
            while let Some(event) = rx.recv().await {
                events.push(event);
            }
            events
        };
        let events = tokio::time::timeout(std::time::Duration::from_secs(10), collect)
            .await
            .expect("hub should finish its script");
        hub.stop();

        let origin = Arc::new(ClockOrigin::at_epoch(0.0));
        assert_eq!(events.len(), MockLaunchHub::script(&MockLaunchConfig::default()).len());
        assert!(events
            .windows(2)
            .all(|w| w[0].relative_time(&origin) <= w[1].relative_time(&origin)));

        let (_, info) = classify(&events);
        assert_eq!(info.state, LaunchPhase::Completed);
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::LaunchPhase;
    use sensor_hub::{MockLaunchConfig, MockLaunchHub};

    use crate::support::classify_with;

    #[test]
    fn test_profile_band_changes_classification() {
        // A band the mock launch never tops out of: no MaxSpeedReached.
        let toml = r#"
            [launch]
            speed_threshold_kmh = 10.0
            min_speed_kmh = 50.0
            max_speed_kmh = 200.0
            abort_altitude_gain_m = 1.0
            abort_after_s = 5.0
            complete_after_s = 40.0
            reference_length_m = 1000.0
        "#;
        let profile = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();

        let script = MockLaunchHub::script(&MockLaunchConfig::default());
        let (phases, _) = classify_with(&script, &profile.launch);

        assert_eq!(
            phases,
            vec![
                LaunchPhase::TakingOff,
                LaunchPhase::MinSpeedReached,
                LaunchPhase::Completed,
            ]
        );
    }
}

#[cfg(test)]
mod replay_tests {
    use std::sync::Arc;

    use tempfile::tempdir;

    use contracts::{ClockOrigin, LaunchPhase, PlaybackConfig, RecordingConfig, SensorEvent};
    use recorder::{Recorder, SnapshotStore};
    use sensor_hub::{MockLaunchConfig, MockLaunchHub, ReplayHub, SensorHub};

    use crate::support::classify;

    #[test]
    fn test_persisted_episode_replays_identically() {
        let script = MockLaunchHub::script(&MockLaunchConfig::default());
        let (live_phases, _) = classify(&script);

        let origin = Arc::new(ClockOrigin::at_epoch(0.0));
        let mut recorder = Recorder::new(origin, &RecordingConfig::default());
        recorder.start();
        for event in &script {
            recorder.record(event);
        }
        // Takeoff near 6 s, completion near 46 s; the default margin keeps
        // the whole 60 s episode.
        let snapshot = recorder.finish(6.0, 46.0);

        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let path = store.save(&snapshot).unwrap();
        let loaded = store.load(&path).unwrap();

        let replay_origin = Arc::new(ClockOrigin::now());
        let hub = ReplayHub::new(
            loaded,
            replay_origin,
            PlaybackConfig {
                tick_interval_s: 0.1,
                speed_multiplier: 200.0,
                skip_to_s: None,
            },
        )
        .unwrap();

        let (tx, rx) = std::sync::mpsc::channel::<SensorEvent>();
        hub.start(Arc::new(move |event| {
            let _ = tx.send(event);
        }));
        let replayed: Vec<SensorEvent> = rx.iter().collect();
        hub.stop();

        assert_eq!(replayed.len(), script.len());

        let (replay_phases, info) = classify(&replayed);
        assert_eq!(replay_phases, live_phases);
        assert_eq!(info.state, LaunchPhase::Completed);
    }

    #[test]
    fn test_replay_skips_into_the_launch() {
        let script = MockLaunchHub::script(&MockLaunchConfig::default());

        let origin = Arc::new(ClockOrigin::at_epoch(0.0));
        let mut recorder = Recorder::new(origin, &RecordingConfig::default());
        recorder.start();
        for event in &script {
            recorder.record(event);
        }
        let snapshot = recorder.finish(6.0, 46.0);

        let replay_origin = Arc::new(ClockOrigin::now());
        let hub = ReplayHub::new(
            snapshot,
            replay_origin.clone(),
            PlaybackConfig {
                tick_interval_s: 0.1,
                speed_multiplier: 200.0,
                skip_to_s: Some(30.0),
            },
        )
        .unwrap();

        let (tx, rx) = std::sync::mpsc::channel::<SensorEvent>();
        hub.start(Arc::new(move |event| {
            let _ = tx.send(event);
        }));
        let replayed: Vec<SensorEvent> = rx.iter().collect();
        hub.stop();

        assert!(!replayed.is_empty());
        assert!(replayed
            .iter()
            .all(|e| e.relative_time(&replay_origin) >= 30.0));
    }
}
