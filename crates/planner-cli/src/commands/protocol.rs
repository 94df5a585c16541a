//! Dosing protocol CLI commands.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use planner_core::config::AppConfig;
use planner_core::error::AppError;
use planner_core::types::ProtocolId;
use planner_entity::{CreateProtocol, Frequency, Protocol, UpdateProtocol};

/// Arguments for protocol commands
#[derive(Debug, Args)]
pub struct ProtocolArgs {
    /// Protocol subcommand
    #[command(subcommand)]
    pub command: ProtocolCommand,
}

/// Protocol subcommands
#[derive(Debug, Subcommand)]
pub enum ProtocolCommand {
    /// List protocols
    List {
        /// Only running protocols
        #[arg(long)]
        active: bool,
    },
    /// Show one protocol
    Show {
        /// Protocol ID
        id: ProtocolId,
    },
    /// Add a protocol
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        peptide: String,
        /// Dose per administration in micrograms
        #[arg(long)]
        dose_mcg: f64,
        /// daily, eod, every:N or days:mon,thu
        #[arg(long, default_value = "daily")]
        frequency: Frequency,
        /// First dosing day
        #[arg(long)]
        start: NaiveDate,
        /// Last dosing day
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Update a protocol
    Update {
        /// Protocol ID
        id: ProtocolId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        dose_mcg: Option<f64>,
        #[arg(long)]
        frequency: Option<Frequency>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Pause a protocol
    Pause {
        /// Protocol ID
        id: ProtocolId,
    },
    /// Resume a paused protocol
    Resume {
        /// Protocol ID
        id: ProtocolId,
    },
    /// Remove a protocol and its schedule
    Remove {
        /// Protocol ID
        id: ProtocolId,
    },
}

#[derive(Debug, Tabled)]
struct ProtocolRow {
    id: String,
    name: String,
    peptide: String,
    dose_mcg: f64,
    frequency: String,
    start: String,
    end: String,
    active: bool,
}

fn protocol_row(p: &Protocol) -> ProtocolRow {
    ProtocolRow {
        id: p.id.to_string(),
        name: p.name.clone(),
        peptide: p.peptide.clone(),
        dose_mcg: p.dose_mcg,
        frequency: p.frequency.to_string(),
        start: p.start_date.to_string(),
        end: output::opt(&p.end_date),
        active: p.active,
    }
}

/// Execute protocol commands
pub async fn execute(
    args: &ProtocolArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut store = super::open_store(config).await?;

    match &args.command {
        ProtocolCommand::List { active } => {
            let protocols: Vec<Protocol> = store
                .protocols()
                .iter()
                .filter(|p| !active || p.active)
                .cloned()
                .collect();
            output::print_records(&protocols, protocol_row, format);
        }
        ProtocolCommand::Show { id } => {
            let protocol = store.protocol(*id)?;
            output::print_record(protocol, protocol_row, format);
            if format == OutputFormat::Table {
                output::print_kv("Daily use", &format!("{:.3} mg", protocol.daily_mg()));
                output::print_kv("Notes", &output::opt(&protocol.notes));
            }
        }
        ProtocolCommand::Add {
            name,
            peptide,
            dose_mcg,
            frequency,
            start,
            end,
            notes,
        } => {
            let protocol = store
                .add_protocol(CreateProtocol {
                    name: name.clone(),
                    peptide: peptide.clone(),
                    dose_mcg: *dose_mcg,
                    frequency: frequency.clone(),
                    start_date: *start,
                    end_date: *end,
                    notes: notes.clone(),
                })
                .await?;
            output::print_record(&protocol, protocol_row, format);
        }
        ProtocolCommand::Update {
            id,
            name,
            dose_mcg,
            frequency,
            start,
            end,
            notes,
        } => {
            let protocol = store
                .update_protocol(
                    *id,
                    UpdateProtocol {
                        name: name.clone(),
                        dose_mcg: *dose_mcg,
                        frequency: frequency.clone(),
                        start_date: *start,
                        end_date: *end,
                        notes: notes.clone(),
                    },
                )
                .await?;
            output::print_record(&protocol, protocol_row, format);
        }
        ProtocolCommand::Pause { id } => {
            let protocol = store.set_protocol_active(*id, false).await?;
            output::print_success(&format!("Protocol '{}' paused", protocol.name));
        }
        ProtocolCommand::Resume { id } => {
            let protocol = store.set_protocol_active(*id, true).await?;
            output::print_success(&format!("Protocol '{}' resumed", protocol.name));
        }
        ProtocolCommand::Remove { id } => {
            let protocol = store.remove_protocol(*id).await?;
            output::print_success(&format!("Protocol '{}' removed", protocol.name));
        }
    }

    Ok(())
}
