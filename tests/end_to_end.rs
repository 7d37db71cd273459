//! Full runs through the runner against the in-memory and CSV stores.

mod common;

use std::fs;

use grid_telemetry_sim::profiles::ProfileKind;
use grid_telemetry_sim::records::{AlertStatus, TargetTable};
use grid_telemetry_sim::runner;
use grid_telemetry_sim::store::{CsvStore, MemoryStore};

#[test]
fn two_ticks_on_reference_grid() {
    let cfg = common::two_tick_config();
    let mut store = MemoryStore::new(cfg.grid.clone());
    let summary = runner::run(&cfg, &mut store).unwrap();

    let rows = store.rows();
    assert_eq!(summary.ticks, 2);
    assert_eq!(rows.weather.len(), 2);
    assert_eq!(rows.prices.len(), 2);
    assert_eq!(rows.loads.len(), 2);
    assert_eq!(rows.generation.len(), 2);
    assert_eq!(rows.lines.len(), 2);

    let timestamps: Vec<_> = rows.weather.iter().map(|w| w.timestamp).collect();
    assert_eq!(timestamps, vec![common::at(1, 0), common::at(1, 1)]);

    for load in &rows.loads {
        assert!(
            (10.0..=120.0).contains(&load.actual_load_mw),
            "load {} MW outside [10, 120]",
            load.actual_load_mw
        );
    }
    for generation in &rows.generation {
        assert_eq!(generation.actual_generation_mw, 49.0);
    }
    for line in &rows.lines {
        let hour = if line.timestamp == common::at(1, 0) { 0 } else { 1 };
        let demand = ProfileKind::Residential.factor(hour);
        let low = 200.0 * demand * 0.6 - 0.005;
        let high = 200.0 * demand * 0.9 + 0.005;
        assert!(
            line.actual_load_mw >= low && line.actual_load_mw <= high,
            "line flow {} outside [{low}, {high}]",
            line.actual_load_mw
        );
        assert!(line.actual_load_mw <= 200.0 * 0.9 + 0.005);
    }
    for alert in &rows.alerts {
        assert_eq!(alert.status, AlertStatus::New);
        assert!(alert.description.starts_with("Load "));
    }
}

#[test]
fn same_seed_same_rows() {
    let cfg = common::two_tick_config();
    let mut a = MemoryStore::new(cfg.grid.clone());
    let mut b = MemoryStore::new(cfg.grid.clone());
    runner::run(&cfg, &mut a).unwrap();
    runner::run(&cfg, &mut b).unwrap();
    assert_eq!(a.rows(), b.rows());
}

#[test]
fn rerun_replaces_previous_rows() {
    let cfg = common::two_tick_config();
    let mut store = MemoryStore::new(cfg.grid.clone()).with_rows(common::prior_rows());
    runner::run(&cfg, &mut store).unwrap();
    runner::run(&cfg, &mut store).unwrap();
    assert_eq!(store.rows().loads.len(), 2);
    assert!(store.rows().loads.iter().all(|l| l.timestamp < common::at(2, 0)));
    assert_eq!(store.commits(), 2);
}

#[test]
fn reference_month_tick_count() {
    let mut cfg = common::two_tick_config();
    cfg.simulation.end = common::at(30, 0);
    let mut store = MemoryStore::new(cfg.grid.clone());
    let summary = runner::run(&cfg, &mut store).unwrap();
    assert_eq!(summary.ticks, 29 * 24 + 1);
    assert_eq!(store.rows().loads.len(), 29 * 24 + 1);
    assert_eq!(summary.last_tick, Some(common::at(30, 0)));
}

#[test]
fn csv_backend_writes_all_tables() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = common::two_tick_config();
    cfg.persistence.output_dir = tmp.path().join("telemetry");
    let mut store = CsvStore::new(cfg.persistence.output_dir.clone(), cfg.grid.clone());
    let summary = runner::run(&cfg, &mut store).unwrap();

    for table in TargetTable::ALL {
        let body = fs::read_to_string(store.table_path(table)).unwrap();
        let mut lines = body.lines();
        assert_eq!(lines.next(), Some(table.columns().join(",").as_str()));
        assert_eq!(lines.count(), summary.rows_in(table), "{table}");
    }
    let generation =
        fs::read_to_string(store.table_path(TargetTable::GenerationMeasurements)).unwrap();
    assert!(generation.contains("2025-11-01T00:00:00,49.0,1"));
}
