//! `info` command: show the effective profile and recorded episodes.

use config_loader::ConfigLoader;
use recorder::SnapshotStore;

use crate::cli::InfoArgs;
use crate::error::{CliError, Result};

use super::load_profile;

pub fn execute(args: InfoArgs) -> Result<()> {
    let profile = load_profile(&args.config)?;

    if args.json {
        println!(
            "{}",
            ConfigLoader::to_json(&profile).map_err(|e| CliError::config_parse(e.to_string()))?
        );
    } else {
        println!("Profile: {}", args.config.display());
        println!(
            "{}",
            ConfigLoader::to_toml(&profile).map_err(|e| CliError::config_parse(e.to_string()))?
        );
    }

    if args.recordings {
        let store = SnapshotStore::new(&profile.recording.output_dir);
        let files = store
            .list()
            .map_err(|e| CliError::pipeline_execution(e.to_string()))?;

        if files.is_empty() {
            println!(
                "No recorded episodes in {}",
                profile.recording.output_dir.display()
            );
        } else {
            println!("Recorded episodes ({}):", files.len());
            for file in &files {
                println!("  {}", file.display());
            }
        }
    }

    Ok(())
}
