//! Hour-of-day demand profiles for the three consumer archetypes.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Normalized demand factor per hour, residential consumers.
const RESIDENTIAL: [f64; 24] = [
    0.40, 0.35, 0.32, 0.32, 0.35, 0.45, 0.60, 0.80, 0.90, 0.85, 0.75, 0.70, //
    0.70, 0.70, 0.72, 0.75, 0.85, 0.95, 1.00, 0.98, 0.95, 0.90, 0.75, 0.55,
];

/// Normalized demand factor per hour, industrial consumers.
const INDUSTRIAL: [f64; 24] = [
    0.60, 0.55, 0.55, 0.55, 0.58, 0.65, 0.75, 0.85, 0.95, 0.98, 0.98, 0.98, //
    0.90, 0.95, 0.98, 0.98, 0.95, 0.85, 0.75, 0.70, 0.65, 0.60, 0.60, 0.60,
];

/// Normalized demand factor per hour, commercial consumers.
const COMMERCIAL: [f64; 24] = [
    0.20, 0.20, 0.20, 0.20, 0.25, 0.30, 0.40, 0.60, 0.80, 0.95, 1.00, 1.00, //
    1.00, 1.00, 1.00, 1.00, 0.95, 0.80, 0.60, 0.50, 0.40, 0.30, 0.25, 0.20,
];

/// Consumer archetype assigned to a substation for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Residential,
    Industrial,
    Commercial,
}

impl ProfileKind {
    pub const ALL: [Self; 3] = [Self::Residential, Self::Industrial, Self::Commercial];

    /// Full 24-entry table for this archetype.
    pub fn table(self) -> &'static [f64; 24] {
        match self {
            Self::Residential => &RESIDENTIAL,
            Self::Industrial => &INDUSTRIAL,
            Self::Commercial => &COMMERCIAL,
        }
    }

    /// Demand factor for an hour of day. Hours past 23 wrap around.
    pub fn factor(self, hour: u32) -> f64 {
        self.table()[(hour % 24) as usize]
    }

    /// Weighted draw: 50% residential, 30% industrial, 20% commercial.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let r: f64 = rng.random();
        if r < 0.5 {
            Self::Residential
        } else if r < 0.8 {
            Self::Industrial
        } else {
            Self::Commercial
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Residential => "residential",
            Self::Industrial => "industrial",
            Self::Commercial => "commercial",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
