use tracing::debug;

use super::{GridStore, StoreTransaction};
use crate::error::{GridSimError, Result};
use crate::grid::GridMetadata;
use crate::records::{RecordSet, TargetTable};

/// Where an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// `begin` fails with a connection error.
    Connect,
    /// `load_metadata` fails.
    Metadata,
    /// The first insert that carries rows for this table fails.
    Insert(TargetTable),
    /// The insert that would push the staged row total past this count fails.
    InsertAfterRows(usize),
    /// `commit` fails.
    Commit,
}

/// Store that keeps every table in memory.
///
/// Staged rows are only moved into the committed tables on commit. Used by
/// tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    metadata: GridMetadata,
    committed: RecordSet,
    failure: Option<FailurePoint>,
    commits: usize,
    rollbacks: usize,
}

impl MemoryStore {
    pub fn new(metadata: GridMetadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Seeds the target tables with rows from an earlier run.
    pub fn with_rows(mut self, rows: RecordSet) -> Self {
        self.committed = rows;
        self
    }

    /// Arms a failure that fires in the next transaction.
    pub fn fail_at(mut self, point: FailurePoint) -> Self {
        self.failure = Some(point);
        self
    }

    /// Committed contents of the target tables.
    pub fn rows(&self) -> &RecordSet {
        &self.committed
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks
    }

    fn injected(&self, point: FailurePoint) -> bool {
        self.failure == Some(point)
    }
}

impl GridStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn begin(&mut self) -> Result<Box<dyn StoreTransaction + '_>> {
        if self.injected(FailurePoint::Connect) {
            return Err(GridSimError::Connection(
                "memory store refused the connection".into(),
            ));
        }
        Ok(Box::new(MemoryTransaction {
            store: self,
            staged: RecordSet::default(),
            truncated: false,
        }))
    }
}

struct MemoryTransaction<'a> {
    store: &'a mut MemoryStore,
    staged: RecordSet,
    truncated: bool,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn truncate_targets(&mut self) -> Result<()> {
        self.staged.clear();
        self.truncated = true;
        Ok(())
    }

    fn load_metadata(&mut self) -> Result<GridMetadata> {
        if self.store.injected(FailurePoint::Metadata) {
            return Err(GridSimError::MetadataFetch(
                "memory store metadata unavailable".into(),
            ));
        }
        Ok(self.store.metadata.clone())
    }

    fn insert(&mut self, rows: &RecordSet) -> Result<()> {
        match self.store.failure {
            Some(FailurePoint::Insert(table)) if rows.row_count(table) > 0 => {
                return Err(GridSimError::write(
                    &format!("insert into {table}"),
                    "injected failure",
                ));
            }
            Some(FailurePoint::InsertAfterRows(limit)) if self.staged.len() + rows.len() > limit => {
                return Err(GridSimError::write(
                    "bulk insert",
                    format!("injected failure after {limit} rows"),
                ));
            }
            _ => {}
        }
        let mut copy = rows.clone();
        self.staged.append(&mut copy);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction {
            store,
            mut staged,
            truncated,
        } = *self;
        if store.injected(FailurePoint::Commit) {
            return Err(GridSimError::write("commit", "injected failure"));
        }
        if truncated {
            store.committed = staged;
        } else {
            store.committed.append(&mut staged);
        }
        store.commits += 1;
        debug!(rows = store.committed.len(), "memory store committed");
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        self.store.rollbacks += 1;
        Ok(())
    }
}
