//! Deterministic playback of a persisted episode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use contracts::{
    ClockOrigin, LaunchError, PlaybackConfig, SensorEventCallback, SensorHub, SensorSnapshot,
};

use crate::stack::ReplayCursor;

/// Hub that replays a recorded snapshot through the live callback
/// interface.
///
/// A fixed-rate timer advances an integer tick counter; each tick drains
/// every eligible sample from the cursor. Values and their relative order
/// depend only on the snapshot and the tick interval, never on the wall
/// clock, so repeated replays are identical.
pub struct ReplayHub {
    origin: Arc<ClockOrigin>,
    snapshot: SensorSnapshot,
    config: PlaybackConfig,
    listening: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl ReplayHub {
    /// # Errors
    /// [`LaunchError::NothingToReplay`] when the snapshot has no sample
    /// on any channel; no timer is started in that case.
    pub fn new(
        snapshot: SensorSnapshot,
        origin: Arc<ClockOrigin>,
        config: PlaybackConfig,
    ) -> Result<Self, LaunchError> {
        if snapshot.is_empty() {
            return Err(LaunchError::NothingToReplay);
        }
        Ok(Self {
            origin,
            snapshot,
            config,
            listening: Arc::new(AtomicBool::new(false)),
            thread: Mutex::new(None),
        })
    }
}

impl SensorHub for ReplayHub {
    fn name(&self) -> &str {
        "replay"
    }

    fn start(&self, callback: SensorEventCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        // Session epoch: replayed relative times now count from here
        self.origin.reset_to_now();

        let cursor = match ReplayCursor::new(
            self.snapshot.clone(),
            self.origin.clone(),
            self.config.tick_interval_s,
        ) {
            Ok(cursor) => cursor,
            Err(e) => {
                warn!(error = %e, "replay could not start");
                self.listening.store(false, Ordering::SeqCst);
                return;
            }
        };

        let listening = self.listening.clone();
        let config = self.config.clone();

        let handle = thread::spawn(move || {
            let mut cursor = cursor;
            let period = Duration::from_secs_f64(config.tick_interval_s / config.speed_multiplier);

            let mut tick = match config.skip_to_s {
                Some(seconds) => cursor.skip_to(seconds),
                None => 0,
            };

            info!(
                samples = cursor.remaining(),
                tick_interval_s = config.tick_interval_s,
                speed = config.speed_multiplier,
                "replay started"
            );

            let mut out = Vec::new();
            while listening.load(Ordering::Relaxed) {
                out.clear();
                let more = cursor.drain_tick(tick, &mut out);

                for event in out.drain(..) {
                    metrics::counter!("replay_events_total").increment(1);
                    callback(event);
                }

                if !more {
                    debug!(tick, "replay exhausted");
                    break;
                }

                tick += 1;
                thread::sleep(period);
            }

            listening.store(false, Ordering::SeqCst);
            info!("replay finished");
        });

        if let Ok(mut slot) = self.thread.lock() {
            *slot = Some(handle);
        }
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
        let handle = match self.thread.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    fn is_running(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
