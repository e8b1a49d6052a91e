//! Barometric altitude conversion.

/// Standard sea-level pressure (kPa).
const SEA_LEVEL_KPA: f64 = 101.325;

/// Convert barometric pressure (kPa) to altitude (m) with the
/// international barometric formula: h = 44330·(1 − (P/P0)^(1/5.257)).
pub fn pressure_to_altitude(pressure_kpa: f64) -> f64 {
    44330.0 * (1.0 - (pressure_kpa / SEA_LEVEL_KPA).powf(1.0 / 5.257))
}
