//! # Config Loader
//!
//! Launch profile loading and validation.
//!
//! Responsibilities:
//! - Parse TOML/JSON profile files
//! - Validate thresholds and tuning values
//! - Hand a [`LaunchProfile`] to the rest of the pipeline
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let profile = ConfigLoader::load_from_path(Path::new("profile.toml")).unwrap();
//! println!("Speed band: {}–{} km/h", profile.launch.min_speed_kmh, profile.launch.max_speed_kmh);
//! ```

mod parser;
mod validator;

pub use contracts::LaunchProfile;
pub use parser::ConfigFormat;

use contracts::LaunchError;
use std::path::Path;

/// Profile loader.
///
/// Provides static methods to load a profile from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a profile from a file path.
    ///
    /// Detects the format from the file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<LaunchProfile, LaunchError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load a profile from a string.
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<LaunchProfile, LaunchError> {
        let profile = parser::parse(content, format)?;
        validator::validate(&profile)?;
        Ok(profile)
    }

    /// Serialize a profile to TOML.
    pub fn to_toml(profile: &LaunchProfile) -> Result<String, LaunchError> {
        toml::to_string_pretty(profile)
            .map_err(|e| LaunchError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize a profile to JSON.
    pub fn to_json(profile: &LaunchProfile) -> Result<String, LaunchError> {
        serde_json::to_string_pretty(profile)
            .map_err(|e| LaunchError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn detect_format(path: &Path) -> Result<ConfigFormat, LaunchError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            LaunchError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| LaunchError::config_parse(format!("unsupported config format: .{ext}")))
    }

    fn read_file(path: &Path) -> Result<String, LaunchError> {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_TOML: &str = r#"
[launch]
speed_threshold_kmh = 10.0
min_speed_kmh = 90.0
max_speed_kmh = 110.0
abort_altitude_gain_m = 1.0
abort_after_s = 5.0
complete_after_s = 40.0
reference_length_m = 1000.0

[filter]
time_step_s = 0.1
process_noise_velocity = 0.01
process_noise_acceleration = 0.1
measurement_noise_velocity = 0.0001
measurement_noise_acceleration = 0.001

[recording]
output_dir = "./recordings"
flush_interval_s = 10.0
window_margin_s = 20.0

[playback]
tick_interval_s = 0.1
speed_multiplier = 1.0
"#;

    #[test]
    fn test_load_from_str_toml() {
        let profile = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(profile.launch.max_speed_kmh, 110.0);
        assert_eq!(profile.filter.process_noise_acceleration, 0.1);
        assert!(profile.playback.skip_to_s.is_none());
    }

    #[test]
    fn test_empty_profile_uses_defaults() {
        let profile = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(profile, LaunchProfile::default());
    }

    #[test]
    fn test_round_trip_toml() {
        let profile = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&profile).unwrap();
        let profile2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(profile, profile2);
    }

    #[test]
    fn test_round_trip_json() {
        let profile = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&profile).unwrap();
        let profile2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(profile, profile2);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[launch]
speed_threshold_kmh = 10.0
min_speed_kmh = 120.0
max_speed_kmh = 100.0
abort_altitude_gain_m = 1.0
abort_after_s = 5.0
complete_after_s = 40.0
reference_length_m = 1000.0
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(matches!(result, Err(LaunchError::ConfigValidation { .. })));
    }
}
