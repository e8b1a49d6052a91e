//! Timestamp model - absolute instants and origin-relative offsets
//!
//! Persisted episodes may carry either encoding, so both deserialize
//! transparently: an absolute instant is a bare number (epoch seconds),
//! a relative offset is a `{"relative": s}` object.

use std::cmp::Ordering;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A point in time, either on the absolute clock or relative to the
/// process-wide [`ClockOrigin`].
///
/// Equality is structural: an `Absolute` and a `Relative` value never
/// compare equal even when they resolve to the same instant. Use
/// [`ClockOrigin::compare`] to order timestamps across encodings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Seconds since the UNIX epoch
    Absolute(f64),

    /// Seconds since the shared origin instant
    Relative { relative: f64 },
}

impl Timestamp {
    /// Seconds since the origin instant.
    #[inline]
    pub fn resolve(&self, origin: &ClockOrigin) -> f64 {
        match *self {
            Timestamp::Absolute(epoch) => epoch - origin.epoch(),
            Timestamp::Relative { relative } => relative,
        }
    }

    /// Convert to the relative encoding under the given origin.
    #[inline]
    pub fn to_relative(&self, origin: &ClockOrigin) -> Timestamp {
        Timestamp::Relative {
            relative: self.resolve(origin),
        }
    }

    /// Shift this timestamp earlier by `offset` seconds.
    ///
    /// Resolves consistently for both encodings:
    /// `rebase(t, d).resolve(o) == t.resolve(o) - d`.
    #[inline]
    pub fn rebase(&self, offset: f64) -> Timestamp {
        match *self {
            Timestamp::Absolute(epoch) => Timestamp::Absolute(epoch - offset),
            Timestamp::Relative { relative } => Timestamp::Relative {
                relative: relative - offset,
            },
        }
    }
}

/// The single process-wide origin instant for relative time.
///
/// Explicitly constructed and passed into the components that need it,
/// never a mutable static. Set once at process start; a replay session may
/// call [`ClockOrigin::reset_to_now`] before playback begins, never during.
#[derive(Debug)]
pub struct ClockOrigin {
    epoch: RwLock<f64>,
}

impl ClockOrigin {
    /// Origin anchored at the current instant.
    pub fn now() -> Self {
        Self {
            epoch: RwLock::new(Self::epoch_now()),
        }
    }

    /// Origin anchored at an explicit epoch instant (tests, replay).
    pub fn at_epoch(epoch: f64) -> Self {
        Self {
            epoch: RwLock::new(epoch),
        }
    }

    /// The origin instant as epoch seconds.
    pub fn epoch(&self) -> f64 {
        *self.epoch.read().expect("clock origin lock poisoned")
    }

    /// Re-anchor the origin at the current instant.
    ///
    /// Only valid between episodes / before a replay session starts.
    pub fn reset_to_now(&self) {
        *self.epoch.write().expect("clock origin lock poisoned") = Self::epoch_now();
    }

    /// Current instant as an absolute timestamp.
    pub fn timestamp_now(&self) -> Timestamp {
        Timestamp::Absolute(Self::epoch_now())
    }

    /// Seconds elapsed since the origin instant.
    pub fn relative_now(&self) -> f64 {
        Self::epoch_now() - self.epoch()
    }

    /// Compare two timestamps on their resolved relative values.
    pub fn compare(&self, a: &Timestamp, b: &Timestamp) -> Ordering {
        a.resolve(self)
            .partial_cmp(&b.resolve(self))
            .unwrap_or(Ordering::Equal)
    }

    fn epoch_now() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}
