//! SensorSnapshot - the serializable record of one episode
//!
//! Eight parallel channel sequences in append order (newest last). The
//! append-mode snapshot is never consumed directly during replay; replay
//! builds its own pop-from-end stacks from a reversed copy.

use serde::{Deserialize, Serialize};

use crate::{ChannelKind, ClockOrigin, GeoCoordinate, Sample, SensorEvent, Vector3};

/// Run a block against every channel vector of a snapshot.
macro_rules! each_channel {
    ($snapshot:expr, $chan:ident => $body:expr) => {{
        {
            let $chan = &mut $snapshot.roll;
            $body;
        }
        {
            let $chan = &mut $snapshot.pitch;
            $body;
        }
        {
            let $chan = &mut $snapshot.heading;
            $body;
        }
        {
            let $chan = &mut $snapshot.speed;
            $body;
        }
        {
            let $chan = &mut $snapshot.altitude;
            $body;
        }
        {
            let $chan = &mut $snapshot.acceleration;
            $body;
        }
        {
            let $chan = &mut $snapshot.location;
            $body;
        }
        {
            let $chan = &mut $snapshot.pressure;
            $body;
        }
    }};
}

/// Record of all channel streams for one episode.
///
/// Invariants: within one channel, timestamps are monotonic in append
/// order; after [`SensorSnapshot::normalize`], the earliest sample of any
/// channel has relative time 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    #[serde(default)]
    pub roll: Vec<Sample<f64>>,
    #[serde(default)]
    pub pitch: Vec<Sample<f64>>,
    #[serde(default)]
    pub heading: Vec<Sample<f64>>,
    #[serde(default)]
    pub speed: Vec<Sample<f64>>,
    #[serde(default)]
    pub altitude: Vec<Sample<f64>>,
    #[serde(default)]
    pub acceleration: Vec<Sample<Vector3>>,
    #[serde(default)]
    pub location: Vec<Sample<GeoCoordinate>>,
    #[serde(default)]
    pub pressure: Vec<Sample<f64>>,
}

impl SensorSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event to its channel. O(1) amortized.
    pub fn push_event(&mut self, event: &SensorEvent) {
        match event {
            SensorEvent::Roll(s) => self.roll.push(*s),
            SensorEvent::Pitch(s) => self.pitch.push(*s),
            SensorEvent::Heading(s) => self.heading.push(*s),
            SensorEvent::Speed(s) => self.speed.push(*s),
            SensorEvent::Altitude(s) => self.altitude.push(*s),
            SensorEvent::Acceleration(s) => self.acceleration.push(*s),
            SensorEvent::Location(s) => self.location.push(*s),
            SensorEvent::Pressure(s) => self.pressure.push(*s),
        }
    }

    /// No channel has any sample.
    pub fn is_empty(&self) -> bool {
        self.total_samples() == 0
    }

    /// Total sample count across all channels.
    pub fn total_samples(&self) -> usize {
        self.roll.len()
            + self.pitch.len()
            + self.heading.len()
            + self.speed.len()
            + self.altitude.len()
            + self.acceleration.len()
            + self.location.len()
            + self.pressure.len()
    }

    /// Sample count for one channel.
    pub fn channel_len(&self, kind: ChannelKind) -> usize {
        match kind {
            ChannelKind::Roll => self.roll.len(),
            ChannelKind::Pitch => self.pitch.len(),
            ChannelKind::Heading => self.heading.len(),
            ChannelKind::Speed => self.speed.len(),
            ChannelKind::Altitude => self.altitude.len(),
            ChannelKind::Acceleration => self.acceleration.len(),
            ChannelKind::Location => self.location.len(),
            ChannelKind::Pressure => self.pressure.len(),
        }
    }

    /// Minimum first-sample relative time across all non-empty channels.
    pub fn first_relative(&self, origin: &ClockOrigin) -> Option<f64> {
        let firsts = [
            self.roll.first().map(|s| s.relative_time(origin)),
            self.pitch.first().map(|s| s.relative_time(origin)),
            self.heading.first().map(|s| s.relative_time(origin)),
            self.speed.first().map(|s| s.relative_time(origin)),
            self.altitude.first().map(|s| s.relative_time(origin)),
            self.acceleration.first().map(|s| s.relative_time(origin)),
            self.location.first().map(|s| s.relative_time(origin)),
            self.pressure.first().map(|s| s.relative_time(origin)),
        ];
        firsts
            .into_iter()
            .flatten()
            .fold(None, |min: Option<f64>, t| Some(min.map_or(t, |m| m.min(t))))
    }

    /// Keep only samples with relative time strictly greater than `interval`.
    pub fn prefix(&mut self, origin: &ClockOrigin, interval: f64) {
        each_channel!(self, chan => chan.retain(|s| s.relative_time(origin) > interval));
    }

    /// Keep only samples with relative time strictly less than `interval`.
    pub fn suffix(&mut self, origin: &ClockOrigin, interval: f64) {
        each_channel!(self, chan => chan.retain(|s| s.relative_time(origin) < interval));
    }

    /// Shift every channel so the snapshot's zero point is its own
    /// earliest event. Converts all timestamps to the relative encoding.
    /// Applying it twice changes nothing.
    pub fn normalize(&mut self, origin: &ClockOrigin) {
        let Some(min) = self.first_relative(origin) else {
            return;
        };
        each_channel!(self, chan => {
            for sample in chan.iter_mut() {
                *sample = sample.to_relative(origin).rebase(min);
            }
        });
    }
}
