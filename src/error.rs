//! Failure classes of a generation run.
//!
//! Every class is fatal: the run is a batch job, so nothing here is retried.
//! Any error raised after the store transaction opened is followed by a
//! rollback in [`crate::runner`].

use std::fmt::Display;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, GridSimError>;

#[derive(Debug, Error)]
pub enum GridSimError {
    /// The target store could not be reached before any mutation.
    #[error("connection failure: {0}")]
    Connection(String),

    /// Reference tables are unreadable, empty, or inconsistent.
    #[error("metadata fetch failure: {0}")]
    MetadataFetch(String),

    /// Truncate, bulk insert, or commit failed inside the transaction.
    #[error("write failure: {0}")]
    Write(String),

    /// Invalid date range, parameters, or non-finite or non-positive ratings.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GridSimError {
    pub fn connection(context: &str, err: impl Display) -> Self {
        Self::Connection(format!("{context}: {err}"))
    }

    pub fn metadata(context: &str, err: impl Display) -> Self {
        Self::MetadataFetch(format!("{context}: {err}"))
    }

    pub fn write(context: &str, err: impl Display) -> Self {
        Self::Write(format!("{context}: {err}"))
    }
}
