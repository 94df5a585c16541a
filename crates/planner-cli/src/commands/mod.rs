//! CLI command definitions and dispatch.

pub mod data;
pub mod order;
pub mod protocol;
pub mod schedule;
pub mod share;
pub mod stock;
pub mod vendor;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use planner_core::config::AppConfig;
use planner_core::error::AppError;
use planner_core::traits::clock::SystemClock;
use planner_service::{PlannerStore, ShareService};

/// Research Planner: vendors, orders, dosing protocols and share links
#[derive(Debug, Parser)]
#[command(name = "planner", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Vendor management
    Vendor(vendor::VendorArgs),
    /// Order tracking
    Order(order::OrderArgs),
    /// Dosing protocols
    Protocol(protocol::ProtocolArgs),
    /// Dosing calendar
    Schedule(schedule::ScheduleArgs),
    /// Stock on hand per peptide
    Stock,
    /// Share links
    Share(share::ShareArgs),
    /// Backup, restore and reset
    Data(data::DataArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Vendor(args) => vendor::execute(args, config, self.format).await,
            Commands::Order(args) => order::execute(args, config, self.format).await,
            Commands::Protocol(args) => protocol::execute(args, config, self.format).await,
            Commands::Schedule(args) => schedule::execute(args, config, self.format).await,
            Commands::Stock => stock::execute(config, self.format).await,
            Commands::Share(args) => share::execute(args, config, self.format).await,
            Commands::Data(args) => data::execute(args, config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}

/// Helper: open the record store on the configured backend
pub async fn open_store(config: &AppConfig) -> Result<PlannerStore, AppError> {
    let backend = planner_storage::create_store(&config.storage).await?;
    PlannerStore::open(backend).await
}

/// Helper: share service on the system clock
pub fn share_service(config: &AppConfig) -> ShareService {
    ShareService::new(&config.share, Arc::new(SystemClock))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["planner", "--format", "json", "-c", "custom.toml", "stock"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Stock));
    }

    #[test]
    fn test_parse_protocol_add() {
        let cli = Cli::try_parse_from([
            "planner",
            "protocol",
            "add",
            "--name",
            "Recovery",
            "--peptide",
            "BPC-157",
            "--dose-mcg",
            "250",
            "--frequency",
            "days:mon,thu",
            "--start",
            "2026-03-02",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Protocol(_)));
    }

    #[test]
    fn test_rejects_bad_ids() {
        assert!(Cli::try_parse_from(["planner", "vendor", "show", "not-a-uuid"]).is_err());
        assert!(Cli::try_parse_from(["planner", "order", "status", "x", "lost"]).is_err());
    }

    #[tokio::test]
    async fn test_open_store_on_memory_backend() {
        let mut config = AppConfig::default();
        config.storage.provider = "memory".into();
        let store = open_store(&config).await.unwrap();
        assert!(store.vendors().is_empty());
    }
}
