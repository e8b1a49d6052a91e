//! `run` command: drive a synthetic launch through the full pipeline.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use contracts::ClockOrigin;
use sensor_hub::{MockLaunchConfig, MockLaunchHub, SensorHub};

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::pipeline::{Pipeline, PipelineConfig};

use super::{load_profile, shutdown_signal};

pub async fn execute(args: RunArgs) -> Result<()> {
    let mut profile = load_profile(&args.config)?;

    if let Some(dir) = &args.output_dir {
        profile.recording.output_dir = dir.clone();
    }

    if args.dry_run {
        println!("Profile OK: {}", args.config.display());
        println!(
            "  speed band: {:.0}-{:.0} km/h (takeoff threshold {:.0} km/h)",
            profile.launch.min_speed_kmh,
            profile.launch.max_speed_kmh,
            profile.launch.speed_threshold_kmh
        );
        println!(
            "  abort: <{:.0} m gain after {:.0} s, complete: {:.0} s",
            profile.launch.abort_altitude_gain_m,
            profile.launch.abort_after_s,
            profile.launch.complete_after_s
        );
        println!(
            "  recording dir: {}",
            profile.recording.output_dir.display()
        );
        return Ok(());
    }

    if args.metrics_port > 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let origin = Arc::new(ClockOrigin::now());
    let hub: Arc<dyn SensorHub> = Arc::new(MockLaunchHub::new(MockLaunchConfig {
        duration_s: args.duration,
        time_scale: args.time_scale,
        ..MockLaunchConfig::default()
    }));

    let pipeline = Pipeline::new(
        PipelineConfig {
            profile,
            buffer_size: args.buffer_size,
            timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
            record: !args.no_record,
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
