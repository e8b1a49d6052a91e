//! `replay` command: feed a persisted episode back through the pipeline.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use contracts::ClockOrigin;
use recorder::SnapshotStore;
use sensor_hub::{ReplayHub, SensorHub};

use crate::cli::ReplayArgs;
use crate::error::{CliError, Result};
use crate::pipeline::{Pipeline, PipelineConfig};

use super::{load_profile, shutdown_signal};

pub async fn execute(args: ReplayArgs) -> Result<()> {
    let mut profile = load_profile(&args.config)?;

    if let Some(speed) = args.speed {
        profile.playback.speed_multiplier = speed;
    }
    if let Some(skip) = args.skip_to {
        profile.playback.skip_to_s = Some(skip);
    }

    if args.metrics_port > 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let store = SnapshotStore::new(&profile.recording.output_dir);
    let path = match &args.snapshot {
        Some(path) => path.clone(),
        None => store
            .list()
            .map_err(|e| CliError::pipeline_execution(e.to_string()))?
            .pop()
            .ok_or_else(|| {
                CliError::no_episode_found(profile.recording.output_dir.display().to_string())
            })?,
    };

    info!(path = %path.display(), "replaying episode");
    let snapshot = store
        .load(&path)
        .map_err(|e| CliError::pipeline_execution(e.to_string()))?;

    let origin = Arc::new(ClockOrigin::now());
    let playback = profile.playback.clone();
    let hub = ReplayHub::new(snapshot, origin.clone(), playback)
        .map_err(|e| CliError::pipeline_execution(e.to_string()))?;
    let hub: Arc<dyn SensorHub> = Arc::new(hub);

    // A replay classifies only; it never records over the source episode.
    let pipeline = Pipeline::new(
        PipelineConfig {
            profile,
            buffer_size: args.buffer_size,
            timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
            record: false,
        },
        origin,
    );

    tokio::select! {
        result = pipeline.run(hub.clone()) => {
            let stats = result.map_err(|e| CliError::pipeline_execution(e.to_string()))?;
            stats.print_summary();
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
            hub.stop();
        }
    }

    Ok(())
}
