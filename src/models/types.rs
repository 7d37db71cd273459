//! Common types and helpers shared by the per-domain models.

use chrono::{Datelike, NaiveDateTime, Timelike};
use rand::Rng;
use rand_distr::StandardNormal;

/// Calendar facts every model reads for one tick.
///
/// # Fields
/// * `timestamp` - Simulated instant
/// * `hour` - Hour of day (0-23), the profile lookup key
/// * `is_weekend` - Saturday or Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    pub timestamp: NaiveDateTime,
    pub hour: u32,
    pub is_weekend: bool,
}

impl TickContext {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            hour: timestamp.hour(),
            is_weekend: timestamp.weekday().number_from_monday() >= 6,
        }
    }
}

/// Draws Gaussian noise with mean 0 and the given standard deviation.
///
/// A non-positive `std_dev` yields exactly 0 without consuming randomness.
pub fn gaussian_noise<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let z: f64 = rng.sample(StandardNormal);
    z * std_dev
}

/// Uniform draw over `[low, high)`. A degenerate band returns `low`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high <= low {
        return low;
    }
    rng.random_range(low..high)
}

/// Rounds to two decimal places, the precision of every persisted reading.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
