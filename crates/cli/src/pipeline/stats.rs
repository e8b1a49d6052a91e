//! Pipeline execution statistics.

use std::path::PathBuf;
use std::time::Duration;

use contracts::LaunchPhase;
use observability::LaunchSummary;

/// Statistics collected during one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Raw events consumed from the hub
    pub events_received: u64,

    /// Phase the state machine ended in
    pub final_phase: LaunchPhase,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Where the finished episode was persisted, if it was
    pub snapshot_path: Option<PathBuf>,

    /// Aggregated launch metrics
    pub summary: LaunchSummary,
}

impl PipelineStats {
    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Summary ===");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Events received: {}", self.events_received);

        if self.duration.as_secs_f64() > 0.0 {
            println!(
                "Throughput: {:.1} events/s",
                self.events_received as f64 / self.duration.as_secs_f64()
            );
        }

        println!("Final phase: {:?}", self.final_phase);

        match &self.snapshot_path {
            Some(path) => println!("Episode saved: {}", path.display()),
            None => println!("Episode saved: (none)"),
        }

        println!();
        print!("{}", self.summary);
    }
}
