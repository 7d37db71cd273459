//! Regional energy prices driven by the calendar.

use rand::Rng;

use super::types::{round2, uniform};
use crate::profiles::ProfileKind;

/// Clearing price per MWh from the calendar alone.
///
/// `base × residential_profile[hour] × U(1 − jitter, 1 + jitter)`. The
/// residential curve stands in for system demand, so every region gets the
/// same distribution; actual substation load does not feed back into price.
#[derive(Debug, Clone)]
pub struct PricingModel {
    pub weekday_base: f64,
    pub weekend_base: f64,
    /// Half-width of the multiplicative jitter band.
    pub jitter: f64,
}

impl Default for PricingModel {
    fn default() -> Self {
        Self {
            weekday_base: 3000.0,
            weekend_base: 2500.0,
            jitter: 0.05,
        }
    }
}

impl PricingModel {
    pub fn price<R: Rng + ?Sized>(&self, hour: u32, is_weekend: bool, rng: &mut R) -> f64 {
        let base = if is_weekend {
            self.weekend_base
        } else {
            self.weekday_base
        };
        let demand = ProfileKind::Residential.factor(hour);
        round2(base * demand * uniform(rng, 1.0 - self.jitter, 1.0 + self.jitter))
    }
}
