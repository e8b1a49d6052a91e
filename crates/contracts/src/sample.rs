//! Timestamped sample container and channel value types.

use serde::{Deserialize, Serialize};

use crate::{ClockOrigin, Timestamp};

/// A measured value paired with its timestamp.
///
/// Immutable once constructed; the rebasing operations return new copies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample<V> {
    /// When the value was measured
    pub timestamp: Timestamp,

    /// The measured value
    pub value: V,
}

impl<V> Sample<V> {
    /// Create a new sample.
    pub fn new(timestamp: Timestamp, value: V) -> Self {
        Self { timestamp, value }
    }

    /// Seconds since the origin instant.
    #[inline]
    pub fn relative_time(&self, origin: &ClockOrigin) -> f64 {
        self.timestamp.resolve(origin)
    }
}

impl<V: Clone> Sample<V> {
    /// Copy with the timestamp converted to the relative encoding.
    pub fn to_relative(&self, origin: &ClockOrigin) -> Sample<V> {
        Sample {
            timestamp: self.timestamp.to_relative(origin),
            value: self.value.clone(),
        }
    }

    /// Copy with the timestamp shifted earlier by `offset` seconds.
    pub fn rebase(&self, offset: f64) -> Sample<V> {
        Sample {
            timestamp: self.timestamp.rebase(offset),
            value: self.value.clone(),
        }
    }
}

/// 3-axis acceleration in device coordinates (m/s²).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// 2D geographic coordinate (degrees).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Device orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}
