//! Generator output by technology.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Distribution, Weibull};

use super::types::{round2, uniform};
use crate::error::{GridSimError, Result};
use crate::grid::GeneratorKind;
use crate::profiles::ProfileKind;

/// Wind turbine power curve parameters (m/s).
#[derive(Debug, Clone, Copy)]
pub struct WindCurve {
    pub cut_in: f64,
    pub cut_out: f64,
    /// Speed at which the cubic curve reaches rated output.
    pub rated_speed: f64,
}

impl Default for WindCurve {
    fn default() -> Self {
        Self {
            cut_in: 3.0,
            cut_out: 25.0,
            rated_speed: 12.0,
        }
    }
}

impl WindCurve {
    /// Output for a wind speed: zero outside `(cut_in, cut_out)`, otherwise
    /// `max × min(1, (speed / rated)^3)`.
    pub fn output(&self, max_output_mw: f64, speed: f64) -> f64 {
        if speed > self.cut_in && speed < self.cut_out {
            max_output_mw * (speed / self.rated_speed).powi(3).min(1.0)
        } else {
            0.0
        }
    }
}

/// Per-technology output model.
///
/// * solar: half-sine between 07:00 and 17:00 times a `U(0.2, 1.0)` cloud factor
/// * wind: Weibull wind speed through [`WindCurve`]
/// * nuclear: flat `0.98 × max`
/// * thermal: follows the residential curve times `U(0.8, 1.0)`
/// * other: flat `0.5 × max`
#[derive(Debug, Clone)]
pub struct GenerationModel {
    pub solar_first_hour: u32,
    pub solar_last_hour: u32,
    pub solar_cloud_band: (f64, f64),
    pub wind_curve: WindCurve,
    wind_speed: Weibull<f64>,
    pub nuclear_factor: f64,
    pub thermal_band: (f64, f64),
    pub default_factor: f64,
}

impl GenerationModel {
    /// Weibull scale of the wind speed distribution (m/s).
    pub const WIND_SCALE: f64 = 2.0;
    /// Weibull shape of the wind speed distribution.
    pub const WIND_SHAPE: f64 = 5.0;

    /// Builds the model with the reference parameters.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the wind distribution is invalid.
    pub fn new() -> Result<Self> {
        Self::with_wind(Self::WIND_SCALE, Self::WIND_SHAPE)
    }

    /// Builds the model with a custom Weibull wind distribution.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `scale` or `shape` is not positive.
    pub fn with_wind(scale: f64, shape: f64) -> Result<Self> {
        let wind_speed = Weibull::new(scale, shape).map_err(|e| {
            GridSimError::Configuration(format!(
                "invalid wind distribution (scale {scale}, shape {shape}): {e}"
            ))
        })?;
        Ok(Self {
            solar_first_hour: 7,
            solar_last_hour: 17,
            solar_cloud_band: (0.2, 1.0),
            wind_curve: WindCurve::default(),
            wind_speed,
            nuclear_factor: 0.98,
            thermal_band: (0.8, 1.0),
            default_factor: 0.5,
        })
    }

    /// Samples one wind speed (m/s).
    pub fn sample_wind_speed<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.wind_speed.sample(rng)
    }

    /// Deterministic part of the solar curve for an hour, in `[0, 1]`.
    pub fn solar_shape(&self, hour: u32) -> f64 {
        if hour < self.solar_first_hour || hour > self.solar_last_hour {
            return 0.0;
        }
        let span = f64::from(self.solar_last_hour - self.solar_first_hour);
        (f64::from(hour - self.solar_first_hour) * PI / span).sin().max(0.0)
    }

    /// Output (MW, two decimals, never negative) for one generator tick.
    pub fn output<R: Rng + ?Sized>(
        &self,
        kind: GeneratorKind,
        max_output_mw: f64,
        hour: u32,
        rng: &mut R,
    ) -> f64 {
        let mw = match kind {
            GeneratorKind::Solar => {
                if (self.solar_first_hour..=self.solar_last_hour).contains(&hour) {
                    let (lo, hi) = self.solar_cloud_band;
                    max_output_mw * self.solar_shape(hour) * uniform(rng, lo, hi)
                } else {
                    0.0
                }
            }
            GeneratorKind::Wind => {
                let speed = self.sample_wind_speed(rng);
                self.wind_curve.output(max_output_mw, speed)
            }
            GeneratorKind::Nuclear => max_output_mw * self.nuclear_factor,
            GeneratorKind::Thermal => {
                let (lo, hi) = self.thermal_band;
                max_output_mw * ProfileKind::Residential.factor(hour) * uniform(rng, lo, hi)
            }
            GeneratorKind::Other => max_output_mw * self.default_factor,
        };
        round2(mw).max(0.0)
    }
}
