//! Per-run tallies reported after a successful commit.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;

use crate::records::{RecordSet, TargetTable};

/// What a completed run wrote, plus a few sanity statistics over the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Backend the rows went to.
    pub backend: &'static str,
    /// Hours represented by one tick, used for energy totals.
    pub tick_hours: f64,
    pub ticks: usize,
    pub first_tick: Option<NaiveDateTime>,
    pub last_tick: Option<NaiveDateTime>,
    /// Inserts issued through the transaction.
    pub flushes: usize,
    /// Rows written per target table.
    pub rows: BTreeMap<TargetTable, usize>,
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,
    temperature_sum_c: f64,
    pub peak_load_mw: f64,
    price_sum: f64,
    /// Sum of generation over all generators and ticks (MWh).
    pub generation_mwh: f64,
}

impl RunSummary {
    pub fn new(backend: &'static str, tick_hours: f64) -> Self {
        Self {
            backend,
            tick_hours,
            ticks: 0,
            first_tick: None,
            last_tick: None,
            flushes: 0,
            rows: TargetTable::ALL.iter().map(|t| (*t, 0)).collect(),
            temperature_min_c: f64::INFINITY,
            temperature_max_c: f64::NEG_INFINITY,
            temperature_sum_c: 0.0,
            peak_load_mw: 0.0,
            price_sum: 0.0,
            generation_mwh: 0.0,
        }
    }

    pub fn record_tick(&mut self, ts: NaiveDateTime) {
        self.ticks += 1;
        self.first_tick.get_or_insert(ts);
        self.last_tick = Some(ts);
    }

    /// Counts a buffer that was just written.
    pub fn record_flush(&mut self, rows: &RecordSet) {
        self.flushes += 1;
        for table in TargetTable::ALL {
            *self.rows.entry(table).or_insert(0) += rows.row_count(table);
        }
        for w in &rows.weather {
            self.temperature_min_c = self.temperature_min_c.min(w.temperature);
            self.temperature_max_c = self.temperature_max_c.max(w.temperature);
            self.temperature_sum_c += w.temperature;
        }
        self.peak_load_mw = rows
            .loads
            .iter()
            .map(|l| l.actual_load_mw)
            .fold(self.peak_load_mw, f64::max);
        self.price_sum += rows.prices.iter().map(|p| p.price_per_mwh).sum::<f64>();
        self.generation_mwh += rows
            .generation
            .iter()
            .map(|g| g.actual_generation_mw * self.tick_hours)
            .sum::<f64>();
    }

    pub fn rows_in(&self, table: TargetTable) -> usize {
        self.rows.get(&table).copied().unwrap_or(0)
    }

    pub fn total_rows(&self) -> usize {
        self.rows.values().sum()
    }

    pub fn alerts(&self) -> usize {
        self.rows_in(TargetTable::Alerts)
    }

    pub fn mean_temperature_c(&self) -> Option<f64> {
        let n = self.rows_in(TargetTable::WeatherReports);
        (n > 0).then(|| self.temperature_sum_c / n as f64)
    }

    pub fn mean_price(&self) -> Option<f64> {
        let n = self.rows_in(TargetTable::EnergyPricing);
        (n > 0).then(|| self.price_sum / n as f64)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Backend:               {}", self.backend)?;
        match (self.first_tick, self.last_tick) {
            (Some(first), Some(last)) => {
                writeln!(f, "Ticks:                 {} ({first} .. {last})", self.ticks)?
            }
            _ => writeln!(f, "Ticks:                 {}", self.ticks)?,
        }
        writeln!(f, "Flushes:               {}", self.flushes)?;
        for (table, n) in &self.rows {
            writeln!(f, "{:<23}{n}", format!("{table}:"))?;
        }
        if let Some(mean) = self.mean_temperature_c() {
            writeln!(
                f,
                "Temperature:           {:.2} / {mean:.2} / {:.2} °C (min/mean/max)",
                self.temperature_min_c, self.temperature_max_c
            )?;
        }
        writeln!(f, "Peak substation load:  {:.2} MW", self.peak_load_mw)?;
        if let Some(price) = self.mean_price() {
            writeln!(f, "Mean price:            {price:.2} per MWh")?;
        }
        writeln!(f, "Generation:            {:.2} MWh", self.generation_mwh)?;
        write!(f, "Total rows:            {}", self.total_rows())
    }
}
