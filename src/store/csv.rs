//! CSV directory backend.
//!
//! Each target table is one `<Table>.csv` file inside the output directory.
//! A transaction writes into a sibling staging directory and swaps it in on
//! commit, so readers never see a half-written run.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::{GridStore, StoreTransaction};
use crate::error::{GridSimError, Result};
use crate::grid::GridMetadata;
use crate::records::{RecordSet, TargetTable};

type TableWriter = csv::Writer<BufWriter<File>>;

/// Store writing the target tables as CSV files.
///
/// Reference tables come from the scenario's inline `[grid]` section.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
    metadata: GridMetadata,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>, metadata: GridMetadata) -> Self {
        Self {
            dir: dir.into(),
            metadata,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `table`.
    pub fn table_path(&self, table: TargetTable) -> PathBuf {
        table_file(&self.dir, table)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "telemetry".to_string());
        self.dir.with_file_name(format!("{name}.{suffix}"))
    }
}

fn table_file(dir: &Path, table: TargetTable) -> PathBuf {
    dir.join(format!("{}.csv", table.name()))
}

impl GridStore for CsvStore {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn begin(&mut self) -> Result<Box<dyn StoreTransaction + '_>> {
        let staging = self.sibling("staging");
        if staging.exists() {
            warn!(path = %staging.display(), "removing leftover staging directory");
            fs::remove_dir_all(&staging)
                .map_err(|e| GridSimError::connection("clear staging directory", e))?;
        }
        fs::create_dir_all(&staging)
            .map_err(|e| GridSimError::connection("create staging directory", e))?;
        debug!(path = %staging.display(), "opened csv transaction");
        Ok(Box::new(CsvTransaction {
            store: self,
            staging,
            writers: BTreeMap::new(),
            finished: false,
        }))
    }
}

struct CsvTransaction<'a> {
    store: &'a CsvStore,
    staging: PathBuf,
    writers: BTreeMap<TargetTable, TableWriter>,
    finished: bool,
}

impl CsvTransaction<'_> {
    fn writer(&mut self, table: TargetTable) -> Result<&mut TableWriter> {
        self.writers.get_mut(&table).ok_or_else(|| {
            GridSimError::Write(format!(
                "{table} was not truncated; the csv backend only replaces whole tables"
            ))
        })
    }

    fn write_rows<T: Serialize>(&mut self, table: TargetTable, rows: &[T]) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let wtr = self.writer(table)?;
        for row in rows {
            wtr.serialize(row)
                .map_err(|e| GridSimError::write(&format!("insert into {table}"), e))?;
        }
        Ok(())
    }

    fn discard_staging(&mut self) -> Result<()> {
        self.finished = true;
        self.writers.clear();
        if self.staging.exists() {
            fs::remove_dir_all(&self.staging)
                .map_err(|e| GridSimError::write("remove staging directory", e))?;
        }
        Ok(())
    }

    fn swap_in(&mut self) -> Result<()> {
        for (table, wtr) in &mut self.writers {
            wtr.flush()
                .map_err(|e| GridSimError::write(&format!("flush {table}"), e))?;
        }
        self.writers.clear();

        let target = &self.store.dir;
        let backup = self.store.sibling("previous");
        if backup.exists() {
            fs::remove_dir_all(&backup)
                .map_err(|e| GridSimError::write("clear previous directory", e))?;
        }
        if target.exists() {
            fs::rename(target, &backup)
                .map_err(|e| GridSimError::write("move previous output aside", e))?;
        }
        if let Err(e) = fs::rename(&self.staging, target) {
            if backup.exists() {
                let _ = fs::rename(&backup, target);
            }
            return Err(GridSimError::write("move staging into place", e));
        }
        self.finished = true;
        if backup.exists() {
            fs::remove_dir_all(&backup)
                .map_err(|e| GridSimError::write("remove previous output", e))?;
        }
        Ok(())
    }
}

impl StoreTransaction for CsvTransaction<'_> {
    fn truncate_targets(&mut self) -> Result<()> {
        self.writers.clear();
        for table in TargetTable::ALL {
            let path = table_file(&self.staging, table);
            let file = File::create(&path)
                .map_err(|e| GridSimError::write(&format!("truncate {table}"), e))?;
            let mut wtr = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(BufWriter::new(file));
            wtr.write_record(table.columns())
                .map_err(|e| GridSimError::write(&format!("truncate {table}"), e))?;
            self.writers.insert(table, wtr);
        }
        Ok(())
    }

    fn load_metadata(&mut self) -> Result<GridMetadata> {
        Ok(self.store.metadata.clone())
    }

    fn insert(&mut self, rows: &RecordSet) -> Result<()> {
        self.write_rows(TargetTable::WeatherReports, &rows.weather)?;
        self.write_rows(TargetTable::EnergyPricing, &rows.prices)?;
        self.write_rows(TargetTable::LoadMeasurements, &rows.loads)?;
        self.write_rows(TargetTable::GenerationMeasurements, &rows.generation)?;
        self.write_rows(TargetTable::LineMeasurements, &rows.lines)?;
        self.write_rows(TargetTable::Alerts, &rows.alerts)
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        if self.writers.is_empty() {
            // Nothing truncated means nothing to replace.
            return self.discard_staging();
        }
        self.swap_in()?;
        debug!(path = %self.store.dir.display(), "csv output committed");
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<()> {
        self.discard_staging()
    }
}

impl Drop for CsvTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.discard_staging();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{AlertRecord, AlertStatus, AlertType, LineRecord};
    use chrono::NaiveDate;

    fn rows() -> RecordSet {
        let ts = NaiveDate::from_ymd_opt(2025, 11, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        RecordSet {
            lines: vec![LineRecord {
                timestamp: ts,
                actual_load_mw: 123.45,
                line_id: 7,
            }],
            alerts: vec![AlertRecord {
                timestamp: ts,
                alert_type: AlertType::Overload,
                description: "Load 99.1%".into(),
                substation_id: 3,
                status: AlertStatus::New,
            }],
            ..RecordSet::default()
        }
    }

    #[test]
    fn commit_writes_headers_and_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(tmp.path().join("out"), GridMetadata::default());
        let mut tx = store.begin().unwrap();
        tx.truncate_targets().unwrap();
        tx.insert(&rows()).unwrap();
        tx.commit().unwrap();

        let lines = fs::read_to_string(store.table_path(TargetTable::LineMeasurements)).unwrap();
        assert_eq!(
            lines,
            "timestamp,actual_load_mw,line_id\n2025-11-01T00:00:00,123.45,7\n"
        );
        let alerts = fs::read_to_string(store.table_path(TargetTable::Alerts)).unwrap();
        assert!(alerts.ends_with("2025-11-01T00:00:00,Overload,Load 99.1%,3,NEW\n"));

        // Empty tables still carry their header.
        let weather = fs::read_to_string(store.table_path(TargetTable::WeatherReports)).unwrap();
        assert_eq!(weather, "timestamp,region_id,temperature,conditions\n");
        assert!(!store.sibling("staging").exists());
    }

    #[test]
    fn rollback_leaves_previous_output() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(tmp.path().join("out"), GridMetadata::default());
        let mut tx = store.begin().unwrap();
        tx.truncate_targets().unwrap();
        tx.insert(&rows()).unwrap();
        tx.commit().unwrap();
        let before = fs::read_to_string(store.table_path(TargetTable::LineMeasurements)).unwrap();

        let mut tx = store.begin().unwrap();
        tx.truncate_targets().unwrap();
        tx.rollback().unwrap();

        let after = fs::read_to_string(store.table_path(TargetTable::LineMeasurements)).unwrap();
        assert_eq!(before, after);
        assert!(!store.sibling("staging").exists());
    }

    #[test]
    fn dropped_transaction_cleans_staging() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(tmp.path().join("out"), GridMetadata::default());
        {
            let mut tx = store.begin().unwrap();
            tx.truncate_targets().unwrap();
        }
        assert!(!store.sibling("staging").exists());
        assert!(!store.dir().exists());
    }

    #[test]
    fn insert_without_truncate_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(tmp.path().join("out"), GridMetadata::default());
        let mut tx = store.begin().unwrap();
        assert!(matches!(tx.insert(&rows()), Err(GridSimError::Write(_))));
    }
}
