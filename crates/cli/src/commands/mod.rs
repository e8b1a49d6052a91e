//! Command implementations.

mod info;
mod replay;
mod run;
mod validate;

pub use info::execute as info;
pub use replay::execute as replay;
pub use run::execute as run;
pub use validate::execute as validate;

use std::path::Path;

use config_loader::ConfigLoader;
use contracts::{LaunchError, LaunchProfile};

use crate::error::{CliError, Result};

/// Load and validate a profile file, mapping failures to CLI errors.
pub(crate) fn load_profile(path: &Path) -> Result<LaunchProfile> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()));
    }

    ConfigLoader::load_from_path(path).map_err(|e| match e {
        LaunchError::ConfigValidation { .. } => CliError::config_validation(e.to_string()),
        other => CliError::config_parse(other.to_string()),
    })
}

/// Resolve on Ctrl-C or SIGTERM.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
