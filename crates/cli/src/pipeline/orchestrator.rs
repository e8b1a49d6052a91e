//! Pipeline orchestrator.
//!
//! Wires a sensor hub into the fusion engine, the phase state machine and
//! the episode recorder, and persists the trimmed episode once the launch
//! reaches a terminal phase.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use contracts::{
    ClockOrigin, LaunchPhase, LaunchProfile, SensorEvent, SensorEventCallback, SensorHub,
};
use fusion_engine::{FusionEngine, FusionUpdate};
use machine_state::{LaunchStateMachine, MachineInput};
use observability::{
    record_event_received, record_fused_sample, record_phase_transition, LaunchMetricsAggregator,
};
use recorder::{FlushHandle, FlushTask, Recorder, SnapshotStore};

use super::PipelineStats;

/// Pipeline wiring configuration.
pub struct PipelineConfig {
    /// Launch profile driving every stage
    pub profile: LaunchProfile,

    /// Hub-to-consumer channel capacity
    pub buffer_size: usize,

    /// Abort the run after this long (None = run to completion)
    pub timeout: Option<Duration>,

    /// Record the episode and persist it on completion
    pub record: bool,
}

/// One end-to-end episode run.
///
/// Hub threads push events into a bounded channel; a single consumer task
/// feeds them through fusion and classification in arrival order, so the
/// stages themselves stay free of locking.
pub struct Pipeline {
    config: PipelineConfig,
    origin: Arc<ClockOrigin>,
}

/// Per-episode bookkeeping accumulated by the consumer loop.
struct EpisodeProgress {
    events_received: u64,
    current_phase: LaunchPhase,
    takeoff_rel: Option<f64>,
    completion_rel: Option<f64>,
}

impl EpisodeProgress {
    fn new() -> Self {
        Self {
            events_received: 0,
            current_phase: LaunchPhase::Waiting,
            takeoff_rel: None,
            completion_rel: None,
        }
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig, origin: Arc<ClockOrigin>) -> Self {
        Self { config, origin }
    }

    /// Run the pipeline against the given hub until the launch reaches a
    /// terminal phase, the hub runs out of data, or the timeout fires.
    pub async fn run(self, hub: Arc<dyn SensorHub>) -> Result<PipelineStats> {
        let started = Instant::now();
        let profile = &self.config.profile;

        let store = SnapshotStore::new(&profile.recording.output_dir);
        // Periodic flushes and the final trimmed save share one filename,
        // so a flushed partial is either overwritten by the final snapshot
        // or removed when the episode never completes.
        let episode_filename = SnapshotStore::episode_filename();
        let mut flush: Option<FlushHandle> = None;
        let recorder = if self.config.record {
            let recorder = Arc::new(Mutex::new(Recorder::new(
                self.origin.clone(),
                &profile.recording,
            )));
            match recorder.lock() {
                Ok(mut rec) => rec.start(),
                Err(_) => anyhow::bail!("recorder lock poisoned before start"),
            }
            flush = Some(FlushTask::spawn(
                recorder.clone(),
                store.clone(),
                episode_filename.clone(),
                Duration::from_secs_f64(profile.recording.flush_interval_s),
            ));
            Some(recorder)
        } else {
            None
        };

        let (tx, rx) = mpsc::channel::<SensorEvent>(self.config.buffer_size);
        let callback: SensorEventCallback = Arc::new(move |event| {
            // Hub threads block when the consumer falls behind; once the
            // consumer is gone the send fails and the event is discarded.
            let _ = tx.blocking_send(event);
        });

        let mut fusion = FusionEngine::new(&profile.filter);
        let mut machine = LaunchStateMachine::new(self.origin.clone());
        let mut aggregator = LaunchMetricsAggregator::new();
        let mut progress = EpisodeProgress::new();

        info!(hub = hub.name(), record = self.config.record, "pipeline starting");
        hub.start(callback);

        let consume = consume_events(
            rx,
            &self.origin,
            profile,
            recorder.as_ref(),
            &mut fusion,
            &mut machine,
            &mut aggregator,
            &mut progress,
        );
        match self.config.timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, consume).await.is_err() {
                    warn!(timeout_s = limit.as_secs_f64(), "pipeline timed out");
                }
            }
            None => consume.await,
        }

        hub.stop();
        if let Some(flush) = flush {
            flush.shutdown().await;
        }

        aggregator.samples_dropped = machine.dropped_samples();

        let mut snapshot_path = None;
        if let Some(recorder) = &recorder {
            match (progress.takeoff_rel, progress.completion_rel) {
                (Some(takeoff), Some(completion)) => {
                    let snapshot = match recorder.lock() {
                        Ok(mut rec) => Some(rec.finish(takeoff, completion)),
                        Err(_) => {
                            warn!("recorder lock poisoned, episode not persisted");
                            None
                        }
                    };
                    if let Some(snapshot) = snapshot {
                        if snapshot.is_empty() {
                            warn!("trimmed episode is empty, nothing persisted");
                            if let Err(e) = store.remove(&episode_filename) {
                                warn!(error = %e, "stale flush file not removed");
                            }
                        } else {
                            snapshot_path = Some(store.save_as(&snapshot, &episode_filename)?);
                        }
                    }
                }
                _ => {
                    if let Ok(mut rec) = recorder.lock() {
                        rec.stop();
                    }
                    if let Err(e) = store.remove(&episode_filename) {
                        warn!(error = %e, "stale flush file not removed");
                    }
                    info!("no completed launch detected, episode not persisted");
                }
            }
        }

        let stats = PipelineStats {
            events_received: progress.events_received,
            final_phase: progress.current_phase,
            duration: started.elapsed(),
            snapshot_path,
            summary: aggregator.summary(),
        };
        info!(
            events = stats.events_received,
            phase = ?stats.final_phase,
            duration_s = stats.duration.as_secs_f64(),
            "pipeline finished"
        );
        Ok(stats)
    }
}

/// Consume events until the channel closes or a terminal phase is reached.
#[allow(clippy::too_many_arguments)]
async fn consume_events(
    mut rx: mpsc::Receiver<SensorEvent>,
    origin: &ClockOrigin,
    profile: &LaunchProfile,
    recorder: Option<&Arc<Mutex<Recorder>>>,
    fusion: &mut FusionEngine,
    machine: &mut LaunchStateMachine,
    aggregator: &mut LaunchMetricsAggregator,
    progress: &mut EpisodeProgress,
) {
    while let Some(event) = rx.recv().await {
        progress.events_received += 1;
        aggregator.record_event(&event);
        record_event_received(event.kind());

        if let Some(recorder) = recorder {
            if let Ok(mut rec) = recorder.lock() {
                rec.record(&event);
            }
        }

        let update = match fusion.push(&event) {
            Ok(update) => update,
            Err(e) => {
                error!(error = %e, "fusion failed, ending episode");
                break;
            }
        };

        let mut updates = Vec::new();
        match update {
            Some(FusionUpdate::Fused {
                speed,
                acceleration,
            }) => {
                record_fused_sample(speed.value, acceleration.value);
                aggregator.record_fused(speed.value, acceleration.value);
                // Acceleration first so the paired speed tick sees it
                if let Some(info) =
                    machine.update(MachineInput::Acceleration(acceleration), &profile.launch)
                {
                    updates.push(info);
                }
                if let Some(info) = machine.update(MachineInput::Speed(speed), &profile.launch) {
                    updates.push(info);
                }
            }
            Some(FusionUpdate::Altitude(altitude)) => {
                aggregator.record_altitude(altitude.value);
                if let Some(info) =
                    machine.update(MachineInput::Altitude(altitude), &profile.launch)
                {
                    updates.push(info);
                }
            }
            None => {}
        }

        let mut terminal = false;
        for update in updates {
            let next = update.value.state;
            if next == progress.current_phase {
                continue;
            }
            record_phase_transition(progress.current_phase, next);
            aggregator.record_transition(next);
            info!(from = ?progress.current_phase, to = ?next, "phase transition");

            if next == LaunchPhase::TakingOff {
                progress.takeoff_rel = Some(update.value.state_timestamp.resolve(origin));
            }
            if next.is_terminal() {
                progress.completion_rel = Some(update.value.state_timestamp.resolve(origin));
                terminal = true;
            }
            progress.current_phase = next;
        }

        if terminal {
            info!(phase = ?progress.current_phase, "terminal phase reached");
            break;
        }
    }
}
