use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{GridSimError, Result};

/// A simulation clock that walks a date range at a fixed frequency.
///
/// Both ends are inclusive: the last tick is the latest timestamp that does
/// not pass `end`.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use grid_telemetry_sim::sim::clock::Clock;
///
/// let start = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap().and_hms_opt(2, 0, 0).unwrap();
/// let mut clock = Clock::new(start, end, TimeDelta::hours(1)).unwrap();
/// let mut hours = Vec::new();
///
/// clock.run(|ts| hours.push(ts.format("%H").to_string()));
/// assert_eq!(hours, vec!["00", "01", "02"]);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    /// Next timestamp to hand out, `None` once exhausted
    current: Option<NaiveDateTime>,
    /// Last admissible timestamp
    end: NaiveDateTime,
    step: TimeDelta,
}

impl Clock {
    /// Creates a clock over `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `end` is before `start` or the step
    /// is not strictly positive.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, step: TimeDelta) -> Result<Self> {
        if end < start {
            return Err(GridSimError::Configuration(format!(
                "simulation end {end} is before start {start}"
            )));
        }
        if step <= TimeDelta::zero() {
            return Err(GridSimError::Configuration(format!(
                "tick frequency must be positive, got {step}"
            )));
        }
        Ok(Self {
            current: Some(start),
            end,
            step,
        })
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(ts)` - The timestamp of this tick
    /// * `None` - If the range is exhausted
    pub fn tick(&mut self) -> Option<NaiveDateTime> {
        let ts = self.current.filter(|ts| *ts <= self.end)?;
        // Overflow past chrono's range ends the sequence.
        self.current = ts.checked_add_signed(self.step);
        Some(ts)
    }

    /// Number of ticks left, including the next one.
    pub fn remaining(&self) -> usize {
        let Some(current) = self.current.filter(|ts| *ts <= self.end) else {
            return 0;
        };
        let span = self.end - current;
        match (span.num_nanoseconds(), self.step.num_nanoseconds()) {
            (Some(span), Some(step)) => (span / step) as usize + 1,
            _ => (span.num_seconds() / self.step.num_seconds().max(1)) as usize + 1,
        }
    }

    /// Runs a function for each remaining tick in ascending order.
    pub fn run(&mut self, mut f: impl FnMut(NaiveDateTime)) {
        while let Some(ts) = self.tick() {
            f(ts);
        }
    }
}

impl Iterator for Clock {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        self.tick()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}
