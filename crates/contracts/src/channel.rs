//! SensorEvent - the unit of data flowing through the pipeline
//!
//! One tagged event per channel, replacing the source's implicit
//! reactive-operator graph with an explicit, auditable event stream.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{ClockOrigin, GeoCoordinate, Sample, Timestamp, Vector3};

/// The eight recorded channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Roll,
    Pitch,
    Heading,
    Speed,
    Altitude,
    Acceleration,
    Location,
    Pressure,
}

impl ChannelKind {
    /// All channels, in snapshot order.
    pub const ALL: [ChannelKind; 8] = [
        ChannelKind::Roll,
        ChannelKind::Pitch,
        ChannelKind::Heading,
        ChannelKind::Speed,
        ChannelKind::Altitude,
        ChannelKind::Acceleration,
        ChannelKind::Location,
        ChannelKind::Pressure,
    ];
}

/// One timestamped measurement on one channel.
///
/// Angles are radians (heading: degrees, unwound past the 0/360 wrap by
/// the acquisition layer), speed m/s, altitude m, pressure kPa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SensorEvent {
    Roll(Sample<f64>),
    Pitch(Sample<f64>),
    Heading(Sample<f64>),
    Speed(Sample<f64>),
    Altitude(Sample<f64>),
    Acceleration(Sample<Vector3>),
    Location(Sample<GeoCoordinate>),
    Pressure(Sample<f64>),
}

impl SensorEvent {
    /// Which channel this event belongs to.
    pub fn kind(&self) -> ChannelKind {
        match self {
            SensorEvent::Roll(_) => ChannelKind::Roll,
            SensorEvent::Pitch(_) => ChannelKind::Pitch,
            SensorEvent::Heading(_) => ChannelKind::Heading,
            SensorEvent::Speed(_) => ChannelKind::Speed,
            SensorEvent::Altitude(_) => ChannelKind::Altitude,
            SensorEvent::Acceleration(_) => ChannelKind::Acceleration,
            SensorEvent::Location(_) => ChannelKind::Location,
            SensorEvent::Pressure(_) => ChannelKind::Pressure,
        }
    }

    /// The event's timestamp.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            SensorEvent::Roll(s)
            | SensorEvent::Pitch(s)
            | SensorEvent::Heading(s)
            | SensorEvent::Speed(s)
            | SensorEvent::Altitude(s)
            | SensorEvent::Pressure(s) => s.timestamp,
            SensorEvent::Acceleration(s) => s.timestamp,
            SensorEvent::Location(s) => s.timestamp,
        }
    }

    /// Seconds since the origin instant.
    pub fn relative_time(&self, origin: &ClockOrigin) -> f64 {
        self.timestamp().resolve(origin)
    }

    /// Copy with the timestamp converted to the relative encoding.
    pub fn to_relative(&self, origin: &ClockOrigin) -> SensorEvent {
        match self {
            SensorEvent::Roll(s) => SensorEvent::Roll(s.to_relative(origin)),
            SensorEvent::Pitch(s) => SensorEvent::Pitch(s.to_relative(origin)),
            SensorEvent::Heading(s) => SensorEvent::Heading(s.to_relative(origin)),
            SensorEvent::Speed(s) => SensorEvent::Speed(s.to_relative(origin)),
            SensorEvent::Altitude(s) => SensorEvent::Altitude(s.to_relative(origin)),
            SensorEvent::Acceleration(s) => SensorEvent::Acceleration(s.to_relative(origin)),
            SensorEvent::Location(s) => SensorEvent::Location(s.to_relative(origin)),
            SensorEvent::Pressure(s) => SensorEvent::Pressure(s.to_relative(origin)),
        }
    }
}

/// Event callback type.
///
/// When a hub produces data, it sends [`SensorEvent`]s through this
/// callback. Uses `Arc` to allow callback sharing across contexts.
pub type SensorEventCallback = Arc<dyn Fn(SensorEvent) + Send + Sync>;

/// Sensor data source abstraction.
///
/// A hub is one device delivering all channels, live or replayed. Mock,
/// replay, and real acquisition backends implement the same interface so
/// the pipeline does not care which one is driving it.
pub trait SensorHub: Send + Sync {
    /// Hub name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Register the event callback and start delivering data.
    ///
    /// Repeated calls while running are idempotent.
    fn start(&self, callback: SensorEventCallback);

    /// Stop delivering data.
    fn stop(&self);

    /// Whether the hub is currently delivering data.
    fn is_running(&self) -> bool;

    /// Re-zero the orientation reference. No-op for hubs without one.
    fn reset(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_and_timestamp() {
        let event = SensorEvent::Speed(Sample::new(Timestamp::Relative { relative: 2.0 }, 30.0));
        assert_eq!(event.kind(), ChannelKind::Speed);
        assert_eq!(event.timestamp(), Timestamp::Relative { relative: 2.0 });
    }

    #[test]
    fn test_event_to_relative() {
        let origin = ClockOrigin::at_epoch(10.0);
        let event = SensorEvent::Pressure(Sample::new(Timestamp::Absolute(11.0), 101.325));
        let rel = event.to_relative(&origin);
        assert_eq!(rel.timestamp(), Timestamp::Relative { relative: 1.0 });
    }
}
