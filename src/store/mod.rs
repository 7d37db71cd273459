//! Persistence seam between the runner and a concrete target store.
//!
//! A run opens exactly one [`StoreTransaction`]. Every mutation goes through
//! it, so either all six target tables are replaced or none are. Metadata
//! is read through the same transaction, which gives a consistent snapshot.

use crate::config::{Backend, ScenarioConfig};
use crate::error::Result;
use crate::grid::GridMetadata;
use crate::records::RecordSet;

/// CSV directory backend.
pub mod csv;
/// In-process backend with failure injection.
pub mod memory;
#[cfg(feature = "db")]
pub mod postgres;

pub use self::csv::CsvStore;
pub use self::memory::{FailurePoint, MemoryStore};
#[cfg(feature = "db")]
pub use self::postgres::PgStore;

/// A store that can hand out a transaction over the target tables.
pub trait GridStore {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Opens the single transaction of a run.
    ///
    /// # Errors
    ///
    /// Returns a connection failure if the store is unreachable. Nothing has
    /// been mutated at that point.
    fn begin(&mut self) -> Result<Box<dyn StoreTransaction + '_>>;
}

/// Unit of work over the six target tables.
///
/// Dropping a transaction without calling [`StoreTransaction::commit`] must
/// leave the store unchanged.
pub trait StoreTransaction {
    /// Empties all six target tables.
    fn truncate_targets(&mut self) -> Result<()>;

    /// Reads the reference tables as seen by this transaction.
    fn load_metadata(&mut self) -> Result<GridMetadata>;

    /// Appends rows to the target tables. Empty row sets are skipped.
    fn insert(&mut self, rows: &RecordSet) -> Result<()>;

    /// Makes every change of this transaction durable.
    fn commit(self: Box<Self>) -> Result<()>;

    /// Discards every change of this transaction.
    fn rollback(self: Box<Self>) -> Result<()>;
}

/// Opens the backend selected by `persistence.backend`.
///
/// # Errors
///
/// Returns a connection failure if the database is unreachable, or a
/// configuration error if the backend is unavailable in this build.
pub fn open(config: &ScenarioConfig) -> Result<Box<dyn GridStore>> {
    match config.persistence.backend {
        Backend::Csv => Ok(Box::new(CsvStore::new(
            config.persistence.output_dir.clone(),
            config.grid.clone(),
        ))),
        #[cfg(feature = "db")]
        Backend::Postgres => {
            let db = crate::config::DatabaseConfig::from_env()?;
            Ok(Box::new(PgStore::connect(&db)?))
        }
        #[cfg(not(feature = "db"))]
        Backend::Postgres => Err(crate::error::GridSimError::Configuration(
            "postgres backend requires building with the `db` feature".into(),
        )),
    }
}
