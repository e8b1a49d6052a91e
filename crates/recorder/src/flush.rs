//! Periodic flush of the in-progress snapshot.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::episode::Recorder;
use crate::store::SnapshotStore;

/// Background task rewriting the episode file at a fixed cadence.
///
/// The recorder stays single-writer: the task only takes a copy of the
/// snapshot under the lock and does the I/O outside it. A crash loses at
/// most one flush interval of data.
pub struct FlushTask;

/// Handle for stopping a running flush task.
pub struct FlushHandle {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl FlushTask {
    pub fn spawn(
        recorder: Arc<Mutex<Recorder>>,
        store: SnapshotStore,
        filename: String,
        interval: Duration,
    ) -> FlushHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; skip it so the cadence is
            // "at most once per interval" from episode start.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if !Self::flush_once(&recorder, &store, &filename) {
                            break;
                        }
                    }
                    _ = stop_rx.changed() => {
                        debug!("flush task stopping");
                        break;
                    }
                }
            }
        });

        info!(interval_s = interval.as_secs_f64(), "flush task started");
        FlushHandle { stop_tx, handle }
    }

    /// Returns false when the recorder lock is poisoned and the task
    /// should give up.
    fn flush_once(recorder: &Arc<Mutex<Recorder>>, store: &SnapshotStore, filename: &str) -> bool {
        let snapshot = match recorder.lock() {
            Ok(recorder) if recorder.is_active() && !recorder.snapshot().is_empty() => {
                Some(recorder.snapshot_copy())
            }
            Ok(_) => None,
            Err(_) => return false,
        };

        if let Some(snapshot) = snapshot {
            if let Err(e) = store.save_as(&snapshot, filename) {
                // Recoverable: the next tick retries
                warn!(error = %e, "periodic flush failed");
            }
        }
        true
    }
}

impl FlushHandle {
    /// Stop the task and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ClockOrigin, RecordingConfig, Sample, SensorEvent, Timestamp};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_flush_writes_while_recording() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let origin = Arc::new(ClockOrigin::at_epoch(0.0));
        let recorder = Arc::new(Mutex::new(Recorder::new(
            origin,
            &RecordingConfig::default(),
        )));
        {
            let mut rec = recorder.lock().unwrap();
            rec.start();
            rec.record(&SensorEvent::Speed(Sample::new(
                Timestamp::Relative { relative: 0.0 },
                5.0,
            )));
        }

        let handle = FlushTask::spawn(
            recorder.clone(),
            store.clone(),
            "episode.json".to_string(),
            Duration::from_millis(20),
        );

        tokio::time::sleep(Duration::from_millis(80)).await;
        handle.shutdown().await;

        let loaded = store.load(dir.path().join("episode.json")).unwrap();
        assert_eq!(loaded.speed.len(), 1);
    }

    #[tokio::test]
    async fn test_no_flush_while_inactive() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let origin = Arc::new(ClockOrigin::at_epoch(0.0));
        let recorder = Arc::new(Mutex::new(Recorder::new(
            origin,
            &RecordingConfig::default(),
        )));

        let handle = FlushTask::spawn(
            recorder,
            store,
            "episode.json".to_string(),
            Duration::from_millis(20),
        );

        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.shutdown().await;

        assert!(!dir.path().join("episode.json").exists());
    }

    #[tokio::test]
    async fn test_partial_flush_is_removed_when_episode_never_launches() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let origin = Arc::new(ClockOrigin::at_epoch(0.0));
        let recorder = Arc::new(Mutex::new(Recorder::new(
            origin,
            &RecordingConfig::default(),
        )));
        {
            let mut rec = recorder.lock().unwrap();
            rec.start();
            rec.record(&SensorEvent::Speed(Sample::new(
                Timestamp::Relative { relative: 0.0 },
                0.5,
            )));
        }

        let handle = FlushTask::spawn(
            recorder.clone(),
            store.clone(),
            "episode.json".to_string(),
            Duration::from_millis(20),
        );
        tokio::time::sleep(Duration::from_millis(80)).await;
        handle.shutdown().await;

        // The partial made it to disk while recording was in progress
        assert!(dir.path().join("episode.json").exists());

        // No takeoff happened, so the episode ends without a trimmed save
        // and the partial must not outlive it
        recorder.lock().unwrap().stop();
        store.remove("episode.json").unwrap();

        assert!(!dir.path().join("episode.json").exists());
        assert!(store.list().unwrap().is_empty());
    }
}
