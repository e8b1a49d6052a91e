//! Pop-from-end replay stacks.
//!
//! An append-mode snapshot has the newest sample last. Replay wants the
//! oldest sample next, so each channel is reversed once into a distinct
//! stack type and consumed by popping from the end. Keeping the two modes
//! as separate types avoids the order bugs that come from reusing one
//! array ambiguously.

use std::sync::Arc;

use tracing::debug;

use contracts::{
    ChannelKind, ClockOrigin, LaunchError, SensorEvent, SensorSnapshot,
};

/// One channel's samples, earliest last.
#[derive(Debug, Default)]
pub struct ReplayStack {
    events: Vec<SensorEvent>,
}

impl ReplayStack {
    /// Build from events in chronological order.
    fn from_events(mut events: Vec<SensorEvent>) -> Self {
        events.reverse();
        Self { events }
    }

    /// Relative time of the next (earliest remaining) event.
    fn peek_relative(&self, origin: &ClockOrigin) -> Option<f64> {
        self.events.last().map(|e| e.relative_time(origin))
    }

    fn pop(&mut self) -> Option<SensorEvent> {
        self.events.pop()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Replay position across all eight channels.
///
/// Construction normalizes the snapshot, so every remaining timestamp is
/// relative and replay does not depend on where the origin is later
/// re-anchored.
#[derive(Debug)]
pub struct ReplayCursor {
    origin: Arc<ClockOrigin>,
    channels: [ReplayStack; 8],
    ticks_per_second: f64,
}

impl ReplayCursor {
    /// # Errors
    /// [`LaunchError::NothingToReplay`] for a snapshot with no sample on
    /// any channel.
    pub fn new(
        mut snapshot: SensorSnapshot,
        origin: Arc<ClockOrigin>,
        tick_interval_s: f64,
    ) -> Result<Self, LaunchError> {
        if snapshot.is_empty() {
            return Err(LaunchError::NothingToReplay);
        }
        snapshot.normalize(&origin);

        let channels = [
            ReplayStack::from_events(snapshot.roll.into_iter().map(SensorEvent::Roll).collect()),
            ReplayStack::from_events(snapshot.pitch.into_iter().map(SensorEvent::Pitch).collect()),
            ReplayStack::from_events(
                snapshot.heading.into_iter().map(SensorEvent::Heading).collect(),
            ),
            ReplayStack::from_events(snapshot.speed.into_iter().map(SensorEvent::Speed).collect()),
            ReplayStack::from_events(
                snapshot.altitude.into_iter().map(SensorEvent::Altitude).collect(),
            ),
            ReplayStack::from_events(
                snapshot
                    .acceleration
                    .into_iter()
                    .map(SensorEvent::Acceleration)
                    .collect(),
            ),
            ReplayStack::from_events(
                snapshot.location.into_iter().map(SensorEvent::Location).collect(),
            ),
            ReplayStack::from_events(
                snapshot.pressure.into_iter().map(SensorEvent::Pressure).collect(),
            ),
        ];

        Ok(Self {
            origin,
            channels,
            ticks_per_second: 1.0 / tick_interval_s,
        })
    }

    /// Pop every sample whose scaled relative time is ≤ `tick` into `out`,
    /// across all channels, until no channel has an eligible sample left.
    /// Within a channel the order is strictly chronological; across
    /// channels it is unspecified.
    ///
    /// Returns `false` once every channel is drained.
    pub fn drain_tick(&mut self, tick: i64, out: &mut Vec<SensorEvent>) -> bool {
        for stack in &mut self.channels {
            while stack
                .peek_relative(&self.origin)
                .is_some_and(|rel| (rel * self.ticks_per_second) as i64 <= tick)
            {
                if let Some(event) = stack.pop() {
                    out.push(event);
                }
            }
        }
        self.remaining() > 0
    }

    /// Drop every sample earlier than `seconds` without emitting, and
    /// return the tick count to resume from.
    pub fn skip_to(&mut self, seconds: f64) -> i64 {
        let mut skipped = 0usize;
        for stack in &mut self.channels {
            while stack
                .peek_relative(&self.origin)
                .is_some_and(|rel| rel < seconds)
            {
                stack.pop();
                skipped += 1;
            }
        }
        debug!(seconds, skipped, "replay fast-forwarded");
        (seconds * self.ticks_per_second) as i64
    }

    /// Samples left across all channels.
    pub fn remaining(&self) -> usize {
        self.channels.iter().map(|s| s.len()).sum()
    }

    /// Samples left on one channel.
    pub fn channel_remaining(&self, kind: ChannelKind) -> usize {
        let index = ChannelKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(0);
        self.channels[index].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Sample, Timestamp};

    fn rel(t: f64) -> Timestamp {
        Timestamp::Relative { relative: t }
    }

    fn snapshot() -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::new();
        for (t, v) in [(0.0, 1.0), (0.1, 2.0), (0.35, 3.0), (1.0, 4.0)] {
            snapshot.push_event(&SensorEvent::Speed(Sample::new(rel(t), v)));
        }
        snapshot.push_event(&SensorEvent::Altitude(Sample::new(rel(0.1), 100.0)));
        snapshot
    }

    fn cursor() -> ReplayCursor {
        ReplayCursor::new(snapshot(), Arc::new(ClockOrigin::at_epoch(0.0)), 0.1).unwrap()
    }

    #[test]
    fn test_empty_snapshot_is_nothing_to_replay() {
        let result = ReplayCursor::new(
            SensorSnapshot::new(),
            Arc::new(ClockOrigin::at_epoch(0.0)),
            0.1,
        );
        assert!(matches!(result, Err(LaunchError::NothingToReplay)));
    }

    #[test]
    fn test_drain_emits_in_chronological_order_per_channel() {
        let mut cursor = cursor();
        let mut out = Vec::new();
        for tick in 0..=10 {
            cursor.drain_tick(tick, &mut out);
        }
        assert_eq!(cursor.remaining(), 0);

        let speeds: Vec<f64> = out
            .iter()
            .filter_map(|e| match e {
                SensorEvent::Speed(s) => Some(s.value),
                _ => None,
            })
            .collect();
        assert_eq!(speeds, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_same_tick_samples_flush_together() {
        let mut cursor = cursor();
        let mut out = Vec::new();

        // Tick 0 covers rel times [0, 0.1): only the first speed sample
        cursor.drain_tick(0, &mut out);
        assert_eq!(out.len(), 1);

        // Tick 1 covers through 0.19..: speed@0.1 and altitude@0.1
        out.clear();
        cursor.drain_tick(1, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_drain_reports_exhaustion() {
        let mut cursor = cursor();
        let mut out = Vec::new();
        assert!(cursor.drain_tick(5, &mut out));
        assert!(!cursor.drain_tick(10, &mut out));
    }

    #[test]
    fn test_skip_to_drops_earlier_samples() {
        let mut cursor = cursor();
        let resume = cursor.skip_to(0.3);
        assert_eq!(resume, 3);
        // speed@0.0, 0.1 and altitude@0.1 gone
        assert_eq!(cursor.remaining(), 2);

        let mut out = Vec::new();
        cursor.drain_tick(10, &mut out);
        let speeds: Vec<f64> = out
            .iter()
            .filter_map(|e| match e {
                SensorEvent::Speed(s) => Some(s.value),
                _ => None,
            })
            .collect();
        assert_eq!(speeds, vec![3.0, 4.0]);
    }

    #[test]
    fn test_replay_is_origin_independent() {
        let drain_all = |origin_epoch: f64| -> Vec<SensorEvent> {
            let mut cursor = ReplayCursor::new(
                snapshot(),
                Arc::new(ClockOrigin::at_epoch(origin_epoch)),
                0.1,
            )
            .unwrap();
            let mut out = Vec::new();
            let mut tick = 0;
            while cursor.drain_tick(tick, &mut out) {
                tick += 1;
            }
            out
        };

        assert_eq!(drain_all(0.0), drain_all(1_700_000_000.0));
    }
}
