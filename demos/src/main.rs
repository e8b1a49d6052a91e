//! End-to-end walkthrough of the launch pipeline, without threads.
//!
//! Runs the scripted mock launch through fusion and classification,
//! records the episode, persists the trimmed snapshot, reloads it, and
//! replays it to show that classification is deterministic.

use std::sync::Arc;

use anyhow::Result;

use contracts::{
    ClockOrigin, FilterTuning, LaunchPhase, LaunchSettings, PhaseInfo, PlaybackConfig,
    RecordingConfig, SensorEvent,
};
use fusion_engine::{FusionEngine, FusionUpdate};
use machine_state::{LaunchStateMachine, MachineInput};
use recorder::{Recorder, SnapshotStore};
use sensor_hub::{MockLaunchConfig, MockLaunchHub, ReplayCursor};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let origin = Arc::new(ClockOrigin::at_epoch(0.0));
    let script = MockLaunchHub::script(&MockLaunchConfig::default());
    println!("Scripted launch: {} events", script.len());

    // Live pass: classify while recording
    let mut recorder = Recorder::new(origin.clone(), &RecordingConfig::default());
    recorder.start();
    for event in &script {
        recorder.record(event);
    }

    let (live_phases, live_info) = classify(&script, &origin);
    println!("Live phases: {}", phase_list(&live_phases));
    print_info(&live_info, &origin);

    let takeoff_rel = live_info
        .take_off_altitude
        .as_ref()
        .map(|s| s.timestamp.resolve(&origin))
        .unwrap_or(0.0);
    let snapshot = recorder.finish(takeoff_rel, takeoff_rel + 40.0);

    // Persist and reload
    let store = SnapshotStore::new("./demo_recordings");
    let path = store.save(&snapshot)?;
    println!("Episode saved to {}", path.display());
    let loaded = store.load(&path)?;

    // Replay pass over the persisted document
    let playback = PlaybackConfig::default();
    let mut cursor = ReplayCursor::new(loaded, origin.clone(), playback.tick_interval_s)?;
    let mut replayed = Vec::new();
    let mut buffer = Vec::new();
    let mut tick = 0i64;
    loop {
        let more = cursor.drain_tick(tick, &mut buffer);
        replayed.append(&mut buffer);
        tick += 1;
        if !more {
            break;
        }
    }
    println!("Replayed {} events", replayed.len());

    let (replay_phases, replay_info) = classify(&replayed, &origin);
    println!("Replay phases: {}", phase_list(&replay_phases));

    assert_eq!(live_phases, replay_phases);
    assert_eq!(live_info.state, replay_info.state);
    println!("Live and replayed classification agree.");

    Ok(())
}

/// The pipeline consumer loop, condensed: fusion feeding the state machine.
fn classify(events: &[SensorEvent], origin: &Arc<ClockOrigin>) -> (Vec<LaunchPhase>, PhaseInfo) {
    let mut fusion = FusionEngine::new(&FilterTuning::default());
    let mut machine = LaunchStateMachine::new(origin.clone());
    let settings = LaunchSettings::default();

    let mut phases = Vec::new();
    let mut current = LaunchPhase::Waiting;

    for event in events {
        let update = match fusion.push(event) {
            Ok(update) => update,
            Err(e) => {
                eprintln!("fusion failed: {e}");
                break;
            }
        };

        let mut updates = Vec::new();
        match update {
            Some(FusionUpdate::Fused {
                speed,
                acceleration,
            }) => {
                if let Some(info) =
                    machine.update(MachineInput::Acceleration(acceleration), &settings)
                {
                    updates.push(info);
                }
                if let Some(info) = machine.update(MachineInput::Speed(speed), &settings) {
                    updates.push(info);
                }
            }
            Some(FusionUpdate::Altitude(altitude)) => {
                if let Some(info) = machine.update(MachineInput::Altitude(altitude), &settings) {
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

fn phase_list(phases: &[LaunchPhase]) -> String {
    if phases.is_empty() {
        return "(none)".to_string();
    }
    phases
        .iter()
        .map(|p| format!("{p:?}"))
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn print_info(info: &PhaseInfo, origin: &ClockOrigin) {
    if let Some(takeoff) = &info.take_off_altitude {
        println!(
            "  takeoff altitude: {:.1} m at t={:.1}s",
            takeoff.value,
            takeoff.timestamp.resolve(origin)
        );
    }
    if let Some(max) = &info.max_altitude {
        println!("  max altitude: {:.1} m", max.value);
    }
    if let Some(fin) = &info.final_altitude {
        println!("  final altitude: {:.1} m", fin.value);
    }
}
