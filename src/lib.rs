//! Synthetic power-grid telemetry generator.
//!
//! Reads the grid's reference tables, steps through a date range, simulates
//! weather, prices, substation load, generation, and line flow for every
//! tick, and replaces six telemetry tables with the result in one atomic
//! transaction.

pub mod cli;
pub mod config;
pub mod error;
pub mod grid;
pub mod logging;
/// Stochastic per-domain models.
pub mod models;
/// Hour-of-day demand archetypes.
pub mod profiles;
pub mod records;
pub mod runner;
/// Time stepper and per-tick engine.
pub mod sim;
/// Transactional persistence backends.
pub mod store;
pub mod summary;

pub use error::{GridSimError, Result};
