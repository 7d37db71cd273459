use std::path::PathBuf;

use clap::Parser;

use crate::config::{Backend, ConfigError, ScenarioConfig};

/// Default preset when neither `--scenario` nor `--preset` is given.
pub const DEFAULT_PRESET: &str = "november";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "grid-telemetry-sim",
    version,
    about = "Generate a month of synthetic power-grid telemetry and replace the target tables atomically"
)]
pub struct CliOptions {
    /// Load the scenario from a TOML file.
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (november, demo).
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Override the random seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the storage backend.
    #[arg(long, value_enum, env = "GRID_SIM_BACKEND")]
    pub backend: Option<Backend>,

    /// Override the CSV output directory.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

impl CliOptions {
    /// Resolves the scenario source and applies command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file or preset cannot be loaded.
    pub fn load_scenario(&self) -> Result<ScenarioConfig, ConfigError> {
        let mut config = match (&self.scenario, &self.preset) {
            (Some(path), _) => ScenarioConfig::from_toml_file(path)?,
            (None, Some(name)) => ScenarioConfig::from_preset(name)?,
            (None, None) => ScenarioConfig::from_preset(DEFAULT_PRESET)?,
        };
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(backend) = self.backend {
            config.persistence.backend = backend;
        }
        if let Some(dir) = &self.output_dir {
            config.persistence.output_dir = dir.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions, clap::Error> {
        CliOptions::try_parse_from(std::iter::once("grid-telemetry-sim").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_november() {
        let cli = parse(&[]).unwrap();
        let cfg = cli.load_scenario().unwrap();
        assert_eq!(cfg.simulation.seed, 42);
        assert_eq!(cfg.simulation.frequency_minutes, 60);
    }

    #[test]
    fn scenario_and_preset_conflict() {
        assert!(parse(&["--scenario", "a.toml", "--preset", "demo"]).is_err());
    }

    #[test]
    fn overrides_apply() {
        let cli = parse(&[
            "--preset",
            "demo",
            "--seed",
            "9",
            "--backend",
            "postgres",
            "--output-dir",
            "elsewhere",
        ])
        .unwrap();
        let cfg = cli.load_scenario().unwrap();
        assert_eq!(cfg.simulation.seed, 9);
        assert_eq!(cfg.persistence.backend, Backend::Postgres);
        assert_eq!(cfg.persistence.output_dir, PathBuf::from("elsewhere"));
    }

    #[test]
    fn unknown_preset_is_a_config_error() {
        let cli = parse(&["--preset", "nope"]).unwrap();
        assert!(cli.load_scenario().is_err());
    }

    #[test]
    fn missing_scenario_file_is_a_config_error() {
        let cli = parse(&["--scenario", "/definitely/not/here.toml"]).unwrap();
        let err = cli.load_scenario().unwrap_err();
        assert_eq!(err.field, "scenario");
    }
}
