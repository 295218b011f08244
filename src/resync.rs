//! Sample-to-time resynchronization.
//!
//! Persyst recorders periodically realign the mapping between sample index
//! and wall-clock time. Each `[SampleTimes]` row marks one realignment: from
//! that sample on, elapsed time restarts from the row's time value.

use crate::error::{LayError, Result};

/// One resynchronization breakpoint: at `sample`, the recorder clock read
/// `time` seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTime {
    pub sample: f64,
    pub time: f64,
}

/// Ordered breakpoint table, in header order (ascending by sample per
/// format convention; not re-sorted).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleTimeTable {
    breakpoints: Vec<SampleTime>,
}

impl SampleTimeTable {
    pub(crate) fn push(&mut self, breakpoint: SampleTime) {
        self.breakpoints.push(breakpoint);
    }

    pub fn breakpoints(&self) -> &[SampleTime] {
        &self.breakpoints
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Selects the breakpoint governing `raw_sample`: the last one whose
    /// sample threshold has been reached. Samples before the first
    /// breakpoint map through breakpoint 0.
    ///
    /// Breakpoint counts are small (tens), so this is a linear scan;
    /// O(breakpoints) per lookup.
    ///
    /// An empty table fails with [`LayError::EmptySampleTimes`] rather than
    /// guessing an implicit origin.
    pub fn locate(&self, raw_sample: f64) -> Result<&SampleTime> {
        if self.breakpoints.is_empty() {
            return Err(LayError::EmptySampleTimes);
        }
        let mut i = 0;
        while i < self.breakpoints.len() - 1 && raw_sample >= self.breakpoints[i + 1].sample {
            i += 1;
        }
        Ok(&self.breakpoints[i])
    }

    /// Maps a raw sample index to elapsed seconds on the recorder clock.
    pub fn seconds_at(&self, raw_sample: f64, sampling_rate: f64) -> Result<f64> {
        let breakpoint = self.locate(raw_sample)?;
        Ok((raw_sample - breakpoint.sample) / sampling_rate + breakpoint.time)
    }
}
