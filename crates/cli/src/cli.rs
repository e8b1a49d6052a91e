//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Winch Launch - glider launch instrumentation pipeline
#[derive(Parser, Debug)]
#[command(
    name = "winch-launch",
    author,
    version,
    about = "Winch launch instrumentation pipeline",
    long_about = "Fuses GPS speed with accelerometer data into a smooth velocity\n\
                  estimate, classifies the launch into flight phases, records the\n\
                  episode, and replays persisted episodes deterministically."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "WINCH_LAUNCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "WINCH_LAUNCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a synthetic launch through the full pipeline
    Run(RunArgs),

    /// Replay a recorded episode through the pipeline
    Replay(ReplayArgs),

    /// Validate a profile file without running
    Validate(ValidateArgs),

    /// Display profile information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to profile file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "profile.toml",
        env = "WINCH_LAUNCH_PROFILE"
    )]
    pub config: PathBuf,

    /// Scripted launch duration in seconds
    #[arg(long, default_value = "60.0")]
    pub duration: f64,

    /// Emission speed factor for the synthetic launch (2.0 = twice as fast)
    #[arg(long, default_value = "1.0")]
    pub time_scale: f64,

    /// Override the recording output directory from the profile
    #[arg(long, env = "WINCH_LAUNCH_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Disable episode recording
    #[arg(long)]
    pub no_record: bool,

    /// Validate profile and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "WINCH_LAUNCH_TIMEOUT")]
    pub timeout: u64,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "100", env = "WINCH_LAUNCH_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "WINCH_LAUNCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `replay` command
#[derive(Parser, Debug, Clone)]
pub struct ReplayArgs {
    /// Path to profile file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "profile.toml",
        env = "WINCH_LAUNCH_PROFILE"
    )]
    pub config: PathBuf,

    /// Episode file to replay (default: newest in the recording directory)
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Override the playback speed multiplier from the profile
    #[arg(long)]
    pub speed: Option<f64>,

    /// Fast-forward this far into the recording (seconds)
    #[arg(long)]
    pub skip_to: Option<f64>,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "WINCH_LAUNCH_TIMEOUT")]
    pub timeout: u64,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "100", env = "WINCH_LAUNCH_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "WINCH_LAUNCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to profile file to validate
    #[arg(short, long, default_value = "profile.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to profile file
    #[arg(short, long, default_value = "profile.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// List recorded episodes in the output directory
    #[arg(long)]
    pub recordings: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args_defaults() {
        let cli = Cli::parse_from(["winch-launch", "run"]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("profile.toml"));
                assert_eq!(args.duration, 60.0);
                assert_eq!(args.buffer_size, 100);
                assert!(!args.no_record);
            }
            other => panic!("expected run command, got {other:?}"),
        }
    }

    #[test]
    fn test_replay_overrides_parse() {
        let cli = Cli::parse_from([
            "winch-launch",
            "replay",
            "--speed",
            "4.0",
            "--skip-to",
            "12.5",
        ]);
        match cli.command {
            Commands::Replay(args) => {
                assert_eq!(args.speed, Some(4.0));
                assert_eq!(args.skip_to, Some(12.5));
                assert!(args.snapshot.is_none());
            }
            other => panic!("expected replay command, got {other:?}"),
        }
    }
}
