//! Research Planner: command-line entry point.
//!
//! Parses arguments, loads configuration, sets up logging and dispatches to
//! the selected command.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use planner_cli::Cli;
use planner_cli::commands::load_config;
use planner_cli::output;
use planner_core::config::AppConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {}", e));
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::debug!(config_path = %cli.config, "Configuration loaded");

    if let Err(e) = cli.execute(&config).await {
        tracing::debug!(error = %e, "Command failed");
        output::print_error(&e.message);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. Logs go to stderr so command output stays
/// pipeable.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
