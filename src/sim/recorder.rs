//! Rotation input recording and replay
//!
//! A player car's steering is stored as (rotation, interval) pairs: entry i's
//! interval is the number of ticks that elapsed before entry i's rotation was
//! applied, recorded retroactively when the rotation changed. During replay the
//! countdown for the entry at the read index is loaded from the *next* entry's
//! stored interval. This off-by-one encoding is what the recorded gameplay
//! depends on; do not "fix" it.

use super::Rotation;

/// One recorded steering segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    pub rotation: Rotation,
    /// Ticks elapsed since the previous rotation change
    pub interval: u32,
}

/// Recorded rotation timeline with a shared record/replay cursor
///
/// The counter counts up each tick while recording and down each tick while
/// replaying; the index is the write position when recording and the read
/// position when replaying.
#[derive(Debug, Clone)]
pub struct RotationTimeline {
    entries: Vec<TimelineEntry>,
    counter: i64,
    index: usize,
}

impl RotationTimeline {
    pub fn new() -> Self {
        Self {
            entries: vec![TimelineEntry {
                rotation: Rotation::Straight,
                interval: 0,
            }],
            counter: 0,
            index: 0,
        }
    }

    /// Clear everything back to the single sentinel entry
    pub fn reset_records(&mut self) {
        self.entries.clear();
        self.entries.push(TimelineEntry {
            rotation: Rotation::Straight,
            interval: 0,
        });
        self.counter = 0;
        self.index = 0;
    }

    /// Zero the cursor but keep the recorded entries, ready for replay
    pub fn rewind(&mut self) {
        self.counter = 0;
        self.index = 0;
    }

    /// Append the given rotation with the ticks accumulated since the last
    /// change, then restart the interval count
    ///
    /// Debouncing is the caller's concern: the stop-of-movement flush appends
    /// the active rotation even when it repeats the previous entry.
    pub fn record(&mut self, rotation: Rotation) {
        self.entries.push(TimelineEntry {
            rotation,
            interval: self.counter.max(0) as u32,
        });
        self.index += 1;
        self.counter = 0;
    }

    /// Advance the interval count by one tick (recording side)
    pub fn count_up(&mut self) {
        self.counter += 1;
    }

    /// Advance the replay countdown by one tick
    pub fn count_down(&mut self) {
        self.counter -= 1;
    }

    /// True when the replay countdown has elapsed
    pub fn is_due(&self) -> bool {
        self.counter <= 0
    }

    /// Pull the rotation at the read index and load the countdown from the
    /// next entry's interval
    ///
    /// Past the end of the timeline this is a no-op returning `None`: the car
    /// holds its last rotation.
    pub fn replay_step(&mut self) -> Option<Rotation> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }

        let rotation = self.entries[self.index].rotation;
        self.counter = i64::from(self.entries[self.index + 1].interval);
        self.index += 1;
        Some(rotation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }
}

impl Default for RotationTimeline {
    fn default() -> Self {
        Self::new()
    }
}
