//! Grid telemetry generator entry point: CLI wiring, store selection, and exit status.

use std::process;

use clap::Parser;
use tracing::error;

use grid_telemetry_sim::cli::CliOptions;
use grid_telemetry_sim::logging::init_tracing;
use grid_telemetry_sim::{runner, store};

fn main() {
    let cli = CliOptions::parse();
    init_tracing(cli.log_json);

    let scenario = match cli.load_scenario() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "cannot load scenario");
            process::exit(1);
        }
    };

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!(error = %e, "invalid scenario");
        }
        process::exit(1);
    }

    let mut target = match store::open(&scenario) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "cannot open store");
            process::exit(1);
        }
    };

    match runner::run(&scenario, target.as_mut()) {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            error!(error = %e, "generation run aborted");
            process::exit(1);
        }
    }
}
