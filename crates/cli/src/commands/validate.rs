//! `validate` command: check a profile file without running anything.

use crate::cli::ValidateArgs;
use crate::error::Result;

use super::load_profile;

pub fn execute(args: ValidateArgs) -> Result<()> {
    let profile = load_profile(&args.config)?;

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "valid": true,
                "path": args.config.display().to_string(),
                "profile": profile,
            })
        );
    } else {
        println!("Profile OK: {}", args.config.display());
    }

    Ok(())
}
