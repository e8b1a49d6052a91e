//! Profile validation.
//!
//! Rules:
//! - speed band ordering: threshold < min < max
//! - positive filter time step and non-negative noise terms
//! - positive replay tick interval and speed multiplier
//! - flush cadence at least one second

use contracts::{LaunchError, LaunchProfile};
use validator::Validate;

/// Validate a parsed profile.
///
/// Returns the first violation as [`LaunchError::ConfigValidation`] with
/// the offending field path.
pub fn validate(profile: &LaunchProfile) -> Result<(), LaunchError> {
    profile.validate().map_err(into_launch_error)
}

fn into_launch_error(errors: validator::ValidationErrors) -> LaunchError {
    // Flatten the nested error tree to one field path + message
    fn first(prefix: &str, errors: &validator::ValidationErrors) -> Option<(String, String)> {
        for (field, kind) in errors.errors() {
            let path = if prefix.is_empty() {
                field.to_string()
            } else {
                format!("{prefix}.{field}")
            };
            match kind {
                validator::ValidationErrorsKind::Field(list) => {
                    if let Some(e) = list.first() {
                        let message = e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string());
                        return Some((path, message));
                    }
                }
                validator::ValidationErrorsKind::Struct(nested) => {
                    if let Some(found) = first(&path, nested) {
                        return Some(found);
                    }
                }
                validator::ValidationErrorsKind::List(map) => {
                    for (index, nested) in map {
                        if let Some(found) = first(&format!("{path}[{index}]"), nested) {
                            return Some(found);
                        }
                    }
                }
            }
        }
        None
    }

    let (field, message) = first("", &errors)
        .unwrap_or_else(|| ("profile".to_string(), errors.to_string()));
    LaunchError::config_validation(field, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        assert!(validate(&LaunchProfile::default()).is_ok());
    }

    #[test]
    fn test_inverted_speed_band_rejected() {
        let mut profile = LaunchProfile::default();
        profile.launch.min_speed_kmh = 120.0;
        profile.launch.max_speed_kmh = 100.0;

        let err = validate(&profile).unwrap_err();
        match err {
            LaunchError::ConfigValidation { field, message } => {
                assert!(field.contains("launch"), "field was {field}");
                assert!(message.contains("min_speed_kmh"), "message was {message}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_time_step_rejected() {
        let mut profile = LaunchProfile::default();
        profile.filter.time_step_s = 0.0;
        assert!(validate(&profile).is_err());
    }

    #[test]
    fn test_zero_tick_interval_rejected() {
        let mut profile = LaunchProfile::default();
        profile.playback.tick_interval_s = 0.0;
        assert!(validate(&profile).is_err());
    }
}
