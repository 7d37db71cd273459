//! Reference entities read from the metadata store.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::{GridSimError, Result};
use crate::profiles::ProfileKind;

pub type RegionId = i32;
pub type SubstationId = i32;
pub type GeneratorId = i32;
pub type LineId = i32;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Region {
    pub id: RegionId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Substation {
    pub id: SubstationId,
    /// Rated capacity (MW).
    pub capacity_mw: f64,
    pub region_id: RegionId,
    /// Pinned archetype. `None` means it is drawn once at engine start.
    #[serde(default)]
    pub profile: Option<ProfileKind>,
}

/// Generator technology. Unrecognized type names fall back to [`GeneratorKind::Other`].
///
/// Scenario files and the metadata store go through the same
/// case-insensitive mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum GeneratorKind {
    Solar,
    Wind,
    Nuclear,
    Thermal,
    Other,
}

impl GeneratorKind {
    /// Maps the metadata store's free-text type column.
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "solar" => Self::Solar,
            "wind" => Self::Wind,
            "nuclear" => Self::Nuclear,
            "thermal" => Self::Thermal,
            _ => Self::Other,
        }
    }
}

impl From<String> for GeneratorKind {
    fn from(name: String) -> Self {
        Self::from_type_name(&name)
    }
}

fn is_valid_rating(mw: f64) -> bool {
    mw.is_finite() && mw > 0.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Generator {
    pub id: GeneratorId,
    pub kind: GeneratorKind,
    /// Rated maximum output (MW).
    pub max_output_mw: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerLine {
    pub id: LineId,
    /// Rated maximum load (MW).
    pub max_load_mw: f64,
}

/// Full snapshot of the reference tables for one run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridMetadata {
    pub regions: Vec<Region>,
    pub substations: Vec<Substation>,
    pub generators: Vec<Generator>,
    pub lines: Vec<PowerLine>,
}

impl GridMetadata {
    /// Checks the snapshot before the tick loop starts.
    ///
    /// Empty sets and dangling region references are metadata failures,
    /// ratings that are not finite and positive are configuration errors.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        for (name, empty) in [
            ("Regions", self.regions.is_empty()),
            ("Substations", self.substations.is_empty()),
            ("Generators", self.generators.is_empty()),
            ("PowerLines", self.lines.is_empty()),
        ] {
            if empty {
                return Err(GridSimError::MetadataFetch(format!(
                    "reference table {name} is empty"
                )));
            }
        }

        let regions: BTreeSet<RegionId> = self.regions.iter().map(|r| r.id).collect();
        for s in &self.substations {
            if !regions.contains(&s.region_id) {
                return Err(GridSimError::MetadataFetch(format!(
                    "substation {} references unknown region {}",
                    s.id, s.region_id
                )));
            }
            if !is_valid_rating(s.capacity_mw) {
                return Err(GridSimError::Configuration(format!(
                    "substation {} has invalid capacity {} MW",
                    s.id, s.capacity_mw
                )));
            }
        }
        if let Some(g) = self.generators.iter().find(|g| !is_valid_rating(g.max_output_mw)) {
            return Err(GridSimError::Configuration(format!(
                "generator {} has invalid max output {} MW",
                g.id, g.max_output_mw
            )));
        }
        if let Some(l) = self.lines.iter().find(|l| !is_valid_rating(l.max_load_mw)) {
            return Err(GridSimError::Configuration(format!(
                "line {} has invalid max load {} MW",
                l.id, l.max_load_mw
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridMetadata {
        GridMetadata {
            regions: vec![Region { id: 1 }],
            substations: vec![Substation {
                id: 10,
                capacity_mw: 100.0,
                region_id: 1,
                profile: None,
            }],
            generators: vec![Generator {
                id: 20,
                kind: GeneratorKind::Nuclear,
                max_output_mw: 50.0,
            }],
            lines: vec![PowerLine {
                id: 30,
                max_load_mw: 200.0,
            }],
        }
    }

    #[test]
    fn valid_grid_passes() {
        assert!(grid().validate().is_ok());
    }

    #[test]
    fn empty_lines_is_metadata_failure() {
        let mut g = grid();
        g.lines.clear();
        assert!(matches!(g.validate(), Err(GridSimError::MetadataFetch(_))));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut g = grid();
        g.substations[0].capacity_mw = 0.0;
        assert!(matches!(g.validate(), Err(GridSimError::Configuration(_))));
    }

    #[test]
    fn nan_rating_is_rejected() {
        let mut g = grid();
        g.lines[0].max_load_mw = f64::NAN;
        assert!(matches!(g.validate(), Err(GridSimError::Configuration(_))));
    }

    #[test]
    fn infinite_ratings_are_rejected() {
        let mut g = grid();
        g.substations[0].capacity_mw = f64::INFINITY;
        assert!(matches!(g.validate(), Err(GridSimError::Configuration(_))));

        let mut g = grid();
        g.generators[0].max_output_mw = f64::INFINITY;
        assert!(matches!(g.validate(), Err(GridSimError::Configuration(_))));
    }

    #[test]
    fn dangling_region_is_metadata_failure() {
        let mut g = grid();
        g.substations[0].region_id = 99;
        assert!(matches!(g.validate(), Err(GridSimError::MetadataFetch(_))));
    }

    #[test]
    fn type_names_map_case_insensitively() {
        assert_eq!(GeneratorKind::from_type_name("Solar"), GeneratorKind::Solar);
        assert_eq!(GeneratorKind::from_type_name(" wind "), GeneratorKind::Wind);
        assert_eq!(GeneratorKind::from_type_name("hydro"), GeneratorKind::Other);
    }
}
