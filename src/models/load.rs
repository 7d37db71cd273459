//! Substation load with weekend, heating, and noise adjustments, plus the
//! probabilistic overload alert gate.

use rand::Rng;

use super::types::{gaussian_noise, round2};
use crate::profiles::ProfileKind;

/// Bounds applied to the load factor before it scales capacity.
pub const MIN_LOAD_FACTOR: f64 = 0.1;
pub const MAX_LOAD_FACTOR: f64 = 1.2;

/// Default fraction of capacity above which a substation counts as overloaded.
pub const DEFAULT_OVERLOAD_THRESHOLD: f64 = 0.98;
/// Default chance an overloaded tick actually raises an alert.
pub const DEFAULT_ALERT_PROBABILITY: f64 = 0.2;

/// Inputs describing one substation on one tick.
#[derive(Debug, Clone, Copy)]
pub struct LoadInput {
    pub capacity_mw: f64,
    pub profile: ProfileKind,
    pub hour: u32,
    pub is_weekend: bool,
    pub temperature_c: f64,
}

/// Result of one substation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReading {
    /// Clipped load factor.
    pub factor: f64,
    /// `capacity × factor`, rounded to two decimals.
    pub actual_load_mw: f64,
    /// Alert description when the overload gate fired.
    pub alert: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoadModel {
    /// Fraction of capacity above which the alert gate is consulted.
    pub overload_threshold: f64,
    /// Bernoulli success probability of the alert gate.
    pub alert_probability: f64,
    /// Below this temperature (°C) heating adds demand.
    pub heating_setpoint_c: f64,
    /// Factor added per °C below the setpoint.
    pub heating_per_degree: f64,
    pub noise_std: f64,
}

impl Default for LoadModel {
    fn default() -> Self {
        Self {
            overload_threshold: DEFAULT_OVERLOAD_THRESHOLD,
            alert_probability: DEFAULT_ALERT_PROBABILITY,
            heating_setpoint_c: 15.0,
            heating_per_degree: 0.02,
            noise_std: 0.05,
        }
    }
}

impl LoadModel {
    pub fn with_alert_gate(overload_threshold: f64, alert_probability: f64) -> Self {
        Self {
            overload_threshold,
            alert_probability,
            ..Self::default()
        }
    }

    /// Weekend multiplier per archetype. Residential demand rises slightly.
    pub fn weekend_multiplier(profile: ProfileKind) -> f64 {
        match profile {
            ProfileKind::Industrial => 0.6,
            ProfileKind::Commercial => 0.8,
            ProfileKind::Residential => 1.05,
        }
    }

    /// Computes the clipped load factor, drawing the Gaussian perturbation.
    pub fn load_factor<R: Rng + ?Sized>(&self, input: &LoadInput, rng: &mut R) -> f64 {
        let mut factor = input.profile.factor(input.hour);
        if input.is_weekend {
            factor *= Self::weekend_multiplier(input.profile);
        }
        if input.temperature_c < self.heating_setpoint_c {
            factor += (self.heating_setpoint_c - input.temperature_c) * self.heating_per_degree;
        }
        factor += gaussian_noise(rng, self.noise_std);
        factor.clamp(MIN_LOAD_FACTOR, MAX_LOAD_FACTOR)
    }

    /// Runs the load model and the alert gate for one substation tick.
    pub fn simulate<R: Rng + ?Sized>(&self, input: &LoadInput, rng: &mut R) -> LoadReading {
        let factor = self.load_factor(input, rng);
        let load_mw = input.capacity_mw * factor;
        let alert = self
            .alert_gate(load_mw, input.capacity_mw, rng)
            .then(|| format!("Load {:.1}%", factor * 100.0));
        LoadReading {
            factor,
            actual_load_mw: round2(load_mw),
            alert,
        }
    }

    /// True when `load_mw` exceeds the overload threshold and an independent
    /// Bernoulli draw succeeds. The draw only happens when overloaded.
    pub fn alert_gate<R: Rng + ?Sized>(&self, load_mw: f64, capacity_mw: f64, rng: &mut R) -> bool {
        load_mw > capacity_mw * self.overload_threshold
            && rng.random::<f64>() < self.alert_probability
    }
}
