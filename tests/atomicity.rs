//! A failed run must leave the target tables exactly as they were.

mod common;

use grid_telemetry_sim::GridSimError;
use grid_telemetry_sim::records::{RecordSet, TargetTable};
use grid_telemetry_sim::runner;
use grid_telemetry_sim::store::{CsvStore, FailurePoint, MemoryStore};

fn month_config() -> grid_telemetry_sim::config::ScenarioConfig {
    let mut cfg = common::two_tick_config();
    cfg.simulation.end = common::at(30, 0);
    cfg.persistence.batch_rows = 200;
    cfg
}

#[test]
fn insert_failure_keeps_prior_rows() {
    let cfg = month_config();
    let mut store = MemoryStore::new(cfg.grid.clone())
        .with_rows(common::prior_rows())
        .fail_at(FailurePoint::Insert(TargetTable::LineMeasurements));

    let err = runner::run(&cfg, &mut store).unwrap_err();

    assert!(matches!(err, GridSimError::Write(_)));
    assert_eq!(store.rows(), &common::prior_rows());
    assert_eq!(store.rollbacks(), 1);
    assert_eq!(store.commits(), 0);
}

#[test]
fn mid_stream_failure_on_first_run_leaves_tables_empty() {
    let cfg = month_config();
    // Several flushes succeed before the injected failure.
    let mut store = MemoryStore::new(cfg.grid.clone()).fail_at(FailurePoint::InsertAfterRows(1_000));

    let err = runner::run(&cfg, &mut store).unwrap_err();

    assert!(matches!(err, GridSimError::Write(_)));
    assert_eq!(store.rows(), &RecordSet::default());
    for table in TargetTable::ALL {
        assert_eq!(store.rows().row_count(table), 0, "{table}");
    }
}

#[test]
fn metadata_failure_rolls_back_truncate() {
    let cfg = month_config();
    let mut store = MemoryStore::new(cfg.grid.clone())
        .with_rows(common::prior_rows())
        .fail_at(FailurePoint::Metadata);

    let err = runner::run(&cfg, &mut store).unwrap_err();

    assert!(matches!(err, GridSimError::MetadataFetch(_)));
    assert_eq!(store.rows(), &common::prior_rows());
}

#[test]
fn csv_failure_keeps_previous_files() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("telemetry");

    let good = common::two_tick_config();
    let mut store = CsvStore::new(&out, good.grid.clone());
    runner::run(&good, &mut store).unwrap();
    let before = std::fs::read_to_string(store.table_path(TargetTable::LoadMeasurements)).unwrap();

    // Same directory, but the grid now carries a zero-capacity substation.
    let mut bad_grid = good.grid.clone();
    bad_grid.substations[0].capacity_mw = 0.0;
    let mut bad_store = CsvStore::new(&out, bad_grid);
    let err = runner::run(&good, &mut bad_store).unwrap_err();
    assert!(matches!(err, GridSimError::Configuration(_)));

    let after = std::fs::read_to_string(store.table_path(TargetTable::LoadMeasurements)).unwrap();
    assert_eq!(before, after);
    assert!(!tmp.path().join("telemetry.staging").exists());
}
