//! Shared fixtures for integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use grid_telemetry_sim::config::ScenarioConfig;
use grid_telemetry_sim::grid::{Generator, GeneratorKind, GridMetadata, PowerLine, Region, Substation};
use grid_telemetry_sim::profiles::ProfileKind;
use grid_telemetry_sim::records::{LoadRecord, RecordSet};

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or_default()
}

/// One region, one residential substation (100 MW), one nuclear unit
/// (50 MW), one line (200 MW).
pub fn reference_grid() -> GridMetadata {
    GridMetadata {
        regions: vec![Region { id: 1 }],
        substations: vec![Substation {
            id: 1,
            capacity_mw: 100.0,
            region_id: 1,
            profile: Some(ProfileKind::Residential),
        }],
        generators: vec![Generator {
            id: 1,
            kind: GeneratorKind::Nuclear,
            max_output_mw: 50.0,
        }],
        lines: vec![PowerLine {
            id: 1,
            max_load_mw: 200.0,
        }],
    }
}

/// Two hourly ticks from 2025-11-01T00:00 on the reference grid.
pub fn two_tick_config() -> ScenarioConfig {
    let mut cfg = ScenarioConfig::november();
    cfg.simulation.start = at(1, 0);
    cfg.simulation.end = at(1, 1);
    cfg.grid = reference_grid();
    cfg
}

/// Rows a previous run left behind.
pub fn prior_rows() -> RecordSet {
    RecordSet {
        loads: (0..3)
            .map(|h| LoadRecord {
                timestamp: at(15, h),
                actual_load_mw: 55.5,
                substation_id: 1,
            })
            .collect(),
        ..RecordSet::default()
    }
}
