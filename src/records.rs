//! Rows produced by the simulation, one struct per target table.
//!
//! Field names match the column names of the target tables so the CSV
//! backend can derive its headers from them.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::grid::{GeneratorId, LineId, RegionId, SubstationId};

/// The six tables replaced by every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetTable {
    WeatherReports,
    EnergyPricing,
    LoadMeasurements,
    GenerationMeasurements,
    LineMeasurements,
    Alerts,
}

impl TargetTable {
    pub const ALL: [Self; 6] = [
        Self::WeatherReports,
        Self::EnergyPricing,
        Self::LoadMeasurements,
        Self::GenerationMeasurements,
        Self::LineMeasurements,
        Self::Alerts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::WeatherReports => "WeatherReports",
            Self::EnergyPricing => "EnergyPricing",
            Self::LoadMeasurements => "LoadMeasurements",
            Self::GenerationMeasurements => "GenerationMeasurements",
            Self::LineMeasurements => "LineMeasurements",
            Self::Alerts => "Alerts",
        }
    }

    /// Column list in insert order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::WeatherReports => &["timestamp", "region_id", "temperature", "conditions"],
            Self::EnergyPricing => &["timestamp", "region_id", "price_per_mwh"],
            Self::LoadMeasurements => &["timestamp", "actual_load_mw", "substation_id"],
            Self::GenerationMeasurements => {
                &["timestamp", "actual_generation_mw", "generator_id"]
            }
            Self::LineMeasurements => &["timestamp", "actual_load_mw", "line_id"],
            Self::Alerts => &[
                "timestamp",
                "alert_type",
                "description",
                "substation_id",
                "status",
            ],
        }
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
}

impl WeatherCondition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::Cloudy => "Cloudy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertType {
    Overload,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overload => "Overload",
        }
    }
}

/// Lifecycle of an alert. The generator only ever emits `New`; the other
/// states are written back by operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    New,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Acknowledged => "ACKNOWLEDGED",
            Self::Resolved => "RESOLVED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub timestamp: NaiveDateTime,
    pub region_id: RegionId,
    pub temperature: f64,
    pub conditions: WeatherCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub timestamp: NaiveDateTime,
    pub region_id: RegionId,
    pub price_per_mwh: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadRecord {
    pub timestamp: NaiveDateTime,
    pub actual_load_mw: f64,
    pub substation_id: SubstationId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRecord {
    pub timestamp: NaiveDateTime,
    pub actual_generation_mw: f64,
    pub generator_id: GeneratorId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRecord {
    pub timestamp: NaiveDateTime,
    pub actual_load_mw: f64,
    pub line_id: LineId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub timestamp: NaiveDateTime,
    pub alert_type: AlertType,
    pub description: String,
    pub substation_id: SubstationId,
    pub status: AlertStatus,
}

/// Buffered rows for all six tables.
///
/// Used both as the output of a single tick and as the flush buffer that
/// accumulates ticks until it is written through the store transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub weather: Vec<WeatherRecord>,
    pub prices: Vec<PriceRecord>,
    pub loads: Vec<LoadRecord>,
    pub generation: Vec<GenerationRecord>,
    pub lines: Vec<LineRecord>,
    pub alerts: Vec<AlertRecord>,
}

impl RecordSet {
    pub fn row_count(&self, table: TargetTable) -> usize {
        match table {
            TargetTable::WeatherReports => self.weather.len(),
            TargetTable::EnergyPricing => self.prices.len(),
            TargetTable::LoadMeasurements => self.loads.len(),
            TargetTable::GenerationMeasurements => self.generation.len(),
            TargetTable::LineMeasurements => self.lines.len(),
            TargetTable::Alerts => self.alerts.len(),
        }
    }

    /// Total rows across every table.
    pub fn len(&self) -> usize {
        TargetTable::ALL.iter().map(|t| self.row_count(*t)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves every row of `other` into `self`, leaving `other` empty.
    pub fn append(&mut self, other: &mut Self) {
        self.weather.append(&mut other.weather);
        self.prices.append(&mut other.prices);
        self.loads.append(&mut other.loads);
        self.generation.append(&mut other.generation);
        self.lines.append(&mut other.lines);
        self.alerts.append(&mut other.alerts);
    }

    pub fn clear(&mut self) {
        self.weather.clear();
        self.prices.clear();
        self.loads.clear();
        self.generation.clear();
        self.lines.clear();
        self.alerts.clear();
    }
}
