//! Backup, restore and reset commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::output;
use planner_core::config::AppConfig;
use planner_core::error::AppError;

/// Arguments for data commands
#[derive(Debug, Args)]
pub struct DataArgs {
    /// Data subcommand
    #[command(subcommand)]
    pub command: DataCommand,
}

/// Data subcommands
#[derive(Debug, Subcommand)]
pub enum DataCommand {
    /// Write every record to a JSON file (stdout if no file is given)
    Export {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all records with the contents of an export
    Import {
        /// Export file path
        file: PathBuf,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete all records
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Execute data commands
pub async fn execute(args: &DataArgs, config: &AppConfig) -> Result<(), AppError> {
    let mut store = super::open_store(config).await?;

    match &args.command {
        DataCommand::Export { output: out_path } => {
            let json = store.export_json()?;
            match out_path {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    tokio::fs::write(path, json).await?;
                    output::print_success(&format!("Exported to '{}'", path.display()));
                }
                None => println!("{}", json),
            }
        }
        DataCommand::Import { file, yes } => {
            let json = tokio::fs::read_to_string(file).await?;
            if !yes && !confirm("Replace ALL planner records with this export?")? {
                println!("Cancelled.");
                return Ok(());
            }
            store.import_json(&json).await?;
            output::print_success(&format!(
                "Imported {} vendors, {} orders, {} protocols",
                store.vendors().len(),
                store.orders().len(),
                store.protocols().len()
            ));
        }
        DataCommand::Clear { yes } => {
            if !yes && !confirm("Delete ALL planner records?")? {
                println!("Cancelled.");
                return Ok(());
            }
            store.clear().await?;
            output::print_success("All planner data cleared");
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, AppError> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.data_dir = dir.join("data").to_string_lossy().into_owned();
        config
    }

    #[tokio::test]
    async fn test_export_then_clear_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(dir.path());
        {
            let mut store = super::super::open_store(&config).await.unwrap();
            store
                .add_vendor(planner_entity::CreateVendor {
                    name: "Acme Labs".into(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let backup = dir.path().join("backup/planner.json");
        let export = DataArgs {
            command: DataCommand::Export {
                output: Some(backup.clone()),
            },
        };
        execute(&export, &config).await.unwrap();
        assert!(backup.is_file());

        let clear = DataArgs {
            command: DataCommand::Clear { yes: true },
        };
        execute(&clear, &config).await.unwrap();
        assert!(super::super::open_store(&config).await.unwrap().vendors().is_empty());

        let import = DataArgs {
            command: DataCommand::Import {
                file: backup,
                yes: true,
            },
        };
        execute(&import, &config).await.unwrap();
        let store = super::super::open_store(&config).await.unwrap();
        assert_eq!(store.vendors()[0].name, "Acme Labs");
    }
}
