//! TOML-based scenario configuration, presets, and environment-supplied
//! database settings.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Deserialize;

use crate::error::GridSimError;
use crate::grid::{Generator, GeneratorKind, GridMetadata, PowerLine, Region, Substation};
use crate::models::load::{DEFAULT_ALERT_PROBABILITY, DEFAULT_OVERLOAD_THRESHOLD, MAX_LOAD_FACTOR};
use crate::profiles::ProfileKind;
use crate::sim::{Clock, EngineParams};

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults matching the reference month. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or pick a built-in preset
/// with [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Date range, frequency, and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Overload alert gate parameters.
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Target store selection and flush size.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Inline reference tables, the metadata source of the CSV backend.
    #[serde(default)]
    pub grid: GridMetadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// First tick (inclusive).
    pub start: NaiveDateTime,
    /// Last admissible tick (inclusive).
    pub end: NaiveDateTime,
    /// Minutes between ticks (must be > 0).
    pub frequency_minutes: u32,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start: midnight(2025, 11, 1),
            end: midnight(2025, 11, 30),
            frequency_minutes: 60,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    pub fn frequency(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.frequency_minutes))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertConfig {
    /// Fraction of capacity above which the alert gate is consulted.
    pub overload_threshold: f64,
    /// Probability an overloaded tick raises an alert.
    pub alert_probability: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            overload_threshold: DEFAULT_OVERLOAD_THRESHOLD,
            alert_probability: DEFAULT_ALERT_PROBABILITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// CSV files in `persistence.output_dir`, metadata from `[grid]`.
    Csv,
    /// PostgreSQL, connection from `DB_*` environment variables.
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersistenceConfig {
    pub backend: Backend,
    /// Target directory of the CSV backend.
    pub output_dir: PathBuf,
    /// Buffered rows that trigger a flush through the open transaction.
    pub batch_rows: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Csv,
            output_dir: PathBuf::from("telemetry"),
            batch_rows: 50_000,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.end"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl From<ConfigError> for GridSimError {
    fn from(e: ConfigError) -> Self {
        GridSimError::Configuration(format!("{}: {}", e.field, e.message))
    }
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl ScenarioConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["november", "demo"];

    /// The reference run: November 2025, hourly, with a small demo grid for
    /// the CSV backend.
    pub fn november() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            alerts: AlertConfig::default(),
            persistence: PersistenceConfig::default(),
            grid: Self::demo_grid(),
        }
    }

    /// Two days on the demo grid, handy for smoke runs.
    pub fn demo() -> Self {
        Self {
            simulation: SimulationConfig {
                end: midnight(2025, 11, 2) + TimeDelta::hours(23),
                ..SimulationConfig::default()
            },
            ..Self::november()
        }
    }

    /// Three regions, a mix of archetypes and technologies.
    pub fn demo_grid() -> GridMetadata {
        let substation = |id, capacity_mw, region_id| Substation {
            id,
            capacity_mw,
            region_id,
            profile: None,
        };
        let generator = |id, kind, max_output_mw| Generator {
            id,
            kind,
            max_output_mw,
        };
        GridMetadata {
            regions: (1..=3).map(|id| Region { id }).collect(),
            substations: vec![
                substation(1, 120.0, 1),
                substation(2, 80.0, 1),
                Substation {
                    profile: Some(ProfileKind::Industrial),
                    ..substation(3, 250.0, 2)
                },
                substation(4, 60.0, 2),
                substation(5, 150.0, 3),
            ],
            generators: vec![
                generator(1, GeneratorKind::Solar, 90.0),
                generator(2, GeneratorKind::Wind, 120.0),
                generator(3, GeneratorKind::Nuclear, 1000.0),
                generator(4, GeneratorKind::Thermal, 400.0),
                generator(5, GeneratorKind::Other, 50.0),
            ],
            lines: vec![
                PowerLine {
                    id: 1,
                    max_load_mw: 500.0,
                },
                PowerLine {
                    id: 2,
                    max_load_mw: 300.0,
                },
            ],
        }
    }

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "november" => Ok(Self::november()),
            "demo" => Ok(Self::demo()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Engine parameters derived from this scenario.
    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            seed: self.simulation.seed,
            overload_threshold: self.alerts.overload_threshold,
            alert_probability: self.alerts.alert_probability,
        }
    }

    /// Time stepper over the configured date range.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a reversed range or zero frequency.
    pub fn clock(&self) -> crate::error::Result<Clock> {
        Clock::new(
            self.simulation.start,
            self.simulation.end,
            self.simulation.frequency(),
        )
    }

    /// Validates run parameters and returns a list of errors.
    ///
    /// Grid ratings are checked separately against whatever metadata the
    /// backend returns, see [`GridMetadata::validate`].
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.end < s.start {
            errors.push(ConfigError {
                field: "simulation.end".into(),
                message: format!("must not be before simulation.start ({})", s.start),
            });
        }
        if s.frequency_minutes == 0 {
            errors.push(ConfigError {
                field: "simulation.frequency_minutes".into(),
                message: "must be > 0".into(),
            });
        }

        let a = &self.alerts;
        if !(a.overload_threshold > 0.0 && a.overload_threshold <= MAX_LOAD_FACTOR) {
            errors.push(ConfigError {
                field: "alerts.overload_threshold".into(),
                message: format!("must be in (0.0, {MAX_LOAD_FACTOR}]"),
            });
        }
        if !(0.0..=1.0).contains(&a.alert_probability) {
            errors.push(ConfigError {
                field: "alerts.alert_probability".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        let p = &self.persistence;
        if p.backend == Backend::Csv && p.output_dir.file_name().is_none() {
            errors.push(ConfigError {
                field: "persistence.output_dir".into(),
                message: format!(
                    "{} must name a directory that can be replaced",
                    p.output_dir.display()
                ),
            });
        }
        if p.batch_rows == 0 {
            errors.push(ConfigError {
                field: "persistence.batch_rows".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }
}

/// PostgreSQL connection settings taken from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "password".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Reads `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`,
    /// loading a `.env` file first when one exists.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `DB_PORT` is not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let port = match lookup("DB_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError {
                field: "DB_PORT".into(),
                message: format!("\"{raw}\" is not a valid port"),
            })?,
            None => defaults.port,
        };
        Ok(Self {
            host: lookup("DB_HOST").unwrap_or(defaults.host),
            port,
            name: lookup("DB_NAME").unwrap_or(defaults.name),
            user: lookup("DB_USER").unwrap_or(defaults.user),
            password: lookup("DB_PASSWORD").unwrap_or(defaults.password),
        })
    }
}
