//! Drives one generation run through the store transaction.
//!
//! `Init → TruncateTargets → LoadMetadata → tick loop (with flushes) → Commit`,
//! with a rollback from any state after the transaction opened.

use tracing::{debug, error, info};

use crate::config::ScenarioConfig;
use crate::error::{GridSimError, Result};
use crate::records::{RecordSet, TargetTable};
use crate::sim::{Clock, Engine};
use crate::store::{GridStore, StoreTransaction};
use crate::summary::RunSummary;

/// Runs the scenario against `store` and commits every generated row at once.
///
/// Configuration is checked before the store is touched. Once the
/// transaction is open, any failure rolls it back and the store keeps its
/// pre-run contents.
///
/// # Errors
///
/// Returns the first failure, classified per [`GridSimError`].
pub fn run(config: &ScenarioConfig, store: &mut dyn GridStore) -> Result<RunSummary> {
    let errors = config.validate();
    if !errors.is_empty() {
        let joined = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(GridSimError::Configuration(joined));
    }
    let clock = config.clock()?;

    let backend = store.name();
    let mut summary = RunSummary::new(
        backend,
        f64::from(config.simulation.frequency_minutes) / 60.0,
    );
    info!(
        backend,
        start = %config.simulation.start,
        end = %config.simulation.end,
        ticks = clock.remaining(),
        seed = config.simulation.seed,
        "starting generation run"
    );

    let mut tx = store.begin()?;
    info!("transaction open");

    match generate(tx.as_mut(), config, clock, &mut summary) {
        Ok(()) => {
            if let Err(e) = tx.commit() {
                error!(error = %e, "commit failed");
                return Err(e);
            }
            info!(
                ticks = summary.ticks,
                rows = summary.total_rows(),
                alerts = summary.alerts(),
                "committed"
            );
            Ok(summary)
        }
        Err(e) => {
            error!(error = %e, "run failed, rolling back");
            match tx.rollback() {
                Ok(()) => info!("rolled back"),
                Err(rb) => error!(error = %rb, "rollback failed"),
            }
            Err(e)
        }
    }
}

fn generate(
    tx: &mut dyn StoreTransaction,
    config: &ScenarioConfig,
    clock: Clock,
    summary: &mut RunSummary,
) -> Result<()> {
    tx.truncate_targets()?;
    info!("truncated target tables");

    let metadata = tx.load_metadata()?;
    metadata.validate()?;
    info!(
        regions = metadata.regions.len(),
        substations = metadata.substations.len(),
        generators = metadata.generators.len(),
        lines = metadata.lines.len(),
        "loaded grid metadata"
    );

    let mut engine = Engine::new(metadata, config.engine_params())?;
    let batch_rows = config.persistence.batch_rows;
    let mut buffer = RecordSet::default();

    for ts in clock {
        let mut rows = engine.step(ts);
        summary.record_tick(ts);
        buffer.append(&mut rows);
        if buffer.len() >= batch_rows {
            flush(tx, &mut buffer, summary)?;
        }
    }
    if !buffer.is_empty() {
        flush(tx, &mut buffer, summary)?;
    }
    Ok(())
}

fn flush(
    tx: &mut dyn StoreTransaction,
    buffer: &mut RecordSet,
    summary: &mut RunSummary,
) -> Result<()> {
    tx.insert(buffer)?;
    summary.record_flush(buffer);
    debug!(
        weather = buffer.row_count(TargetTable::WeatherReports),
        prices = buffer.row_count(TargetTable::EnergyPricing),
        loads = buffer.row_count(TargetTable::LoadMeasurements),
        generation = buffer.row_count(TargetTable::GenerationMeasurements),
        lines = buffer.row_count(TargetTable::LineMeasurements),
        alerts = buffer.row_count(TargetTable::Alerts),
        flush = summary.flushes,
        "flushed rows"
    );
    buffer.clear();
    Ok(())
}
