//! Hierarchical State Machine Visualizer

use clap::Parser;
use hsm_viz::{Config, Result, VERSION, cli, init_logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if e.is_topology_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(args: cli::Cli) -> Result<()> {
    let mut config = if let Some(config_path) = &args.config {
        Config::from_file(config_path)?
    } else {
        Config::load()?
    };
    args.apply_overrides(&mut config);

    init_logging(&config.logging.level);

    tracing::info!("Hierarchical State Machine Visualizer v{}", VERSION);
    tracing::debug!("Parsed arguments: {:?}", args);
    tracing::debug!("Loaded configuration: {:?}", config);

    cli::execute(args, config)
}
