//! Per-region temperature process with a diurnal swing and slow drift.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use rand::Rng;

use super::types::{gaussian_noise, round2};
use crate::grid::RegionId;
use crate::records::WeatherCondition;

/// Baseline temperature (°C) every region starts a run with.
pub const INITIAL_TEMPERATURE_C: f64 = 10.0;

/// Persistent baseline temperature per region.
///
/// The only mutable state that survives from one tick to the next. It is
/// owned by the engine and handed to [`WeatherModel::observe`] explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureState {
    baselines: BTreeMap<RegionId, f64>,
}

impl TemperatureState {
    /// Starts every region at `initial_c`.
    pub fn new(regions: impl IntoIterator<Item = RegionId>, initial_c: f64) -> Self {
        Self {
            baselines: regions.into_iter().map(|id| (id, initial_c)).collect(),
        }
    }

    pub fn baseline(&self, region: RegionId) -> Option<f64> {
        self.baselines.get(&region).copied()
    }
}

/// One emitted weather observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherReading {
    /// Rounded to two decimals.
    pub temperature_c: f64,
    pub condition: WeatherCondition,
}

/// Mean-reverting random walk plus a sinusoidal day cycle.
///
/// Per tick the baseline moves by `drift_per_tick + N(0, drift_std)`, and the
/// reading is `baseline + amplitude·sin((hour − 9)·π/12) + N(0, noise_std)`,
/// using the already-updated baseline.
#[derive(Debug, Clone)]
pub struct WeatherModel {
    /// Starting baseline for regions missing from the state (°C).
    pub initial_c: f64,
    /// Diurnal amplitude (°C).
    pub diurnal_amplitude_c: f64,
    /// Observation noise standard deviation (°C).
    pub noise_std: f64,
    /// Deterministic baseline change per tick (°C).
    pub drift_per_tick: f64,
    /// Baseline jitter standard deviation (°C).
    pub drift_std: f64,
    /// Probability a daytime hour is not sunny.
    pub cloud_probability: f64,
}

impl Default for WeatherModel {
    fn default() -> Self {
        Self {
            initial_c: INITIAL_TEMPERATURE_C,
            diurnal_amplitude_c: 4.0,
            noise_std: 0.5,
            drift_per_tick: -0.1 / 24.0,
            drift_std: 0.1,
            cloud_probability: 0.3,
        }
    }
}

impl WeatherModel {
    /// Diurnal offset for an hour of day, minimum near 03:00 and maximum near 15:00.
    pub fn diurnal_cycle(&self, hour: u32) -> f64 {
        self.diurnal_amplitude_c * ((f64::from(hour) - 9.0) * PI / 12.0).sin()
    }

    /// Advances the region's baseline and returns this tick's reading.
    pub fn observe<R: Rng + ?Sized>(
        &self,
        state: &mut TemperatureState,
        region: RegionId,
        hour: u32,
        rng: &mut R,
    ) -> WeatherReading {
        let cycle = self.diurnal_cycle(hour);
        let noise = gaussian_noise(rng, self.noise_std);

        let baseline = state.baselines.entry(region).or_insert(self.initial_c);
        *baseline += self.drift_per_tick + gaussian_noise(rng, self.drift_std);

        let temperature_c = round2(*baseline + cycle + noise);
        WeatherReading {
            temperature_c,
            condition: self.condition(hour, rng),
        }
    }

    /// Sunny only strictly between 06:00 and 18:00, and then with
    /// probability `1 − cloud_probability`. Night hours draw nothing.
    fn condition<R: Rng + ?Sized>(&self, hour: u32, rng: &mut R) -> WeatherCondition {
        if hour > 6 && hour < 18 && rng.random::<f64>() > self.cloud_probability {
            WeatherCondition::Sunny
        } else {
            WeatherCondition::Cloudy
        }
    }
}
