//! Transmission line loading.

use rand::Rng;

use super::types::{round2, uniform};
use crate::profiles::ProfileKind;

/// Transmission line flow proxy.
///
/// Flow is `max_load × residential_profile[hour] × U(low, high)`; it is not
/// derived from the substation loads of the same tick.
#[derive(Debug, Clone)]
pub struct LineFlowModel {
    pub utilization_low: f64,
    pub utilization_high: f64,
}

impl Default for LineFlowModel {
    fn default() -> Self {
        Self {
            utilization_low: 0.6,
            utilization_high: 0.9,
        }
    }
}

impl LineFlowModel {
    pub fn flow<R: Rng + ?Sized>(&self, max_load_mw: f64, hour: u32, rng: &mut R) -> f64 {
        let demand = ProfileKind::Residential.factor(hour);
        round2(max_load_mw * demand * uniform(rng, self.utilization_low, self.utilization_high))
    }
}
