//! Dosing calendar CLI commands.

use chrono::{Days, NaiveDate};
use clap::{Args, Subcommand};
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use planner_core::config::AppConfig;
use planner_core::error::AppError;
use planner_core::traits::clock::Clock;
use planner_core::types::{ProtocolId, ScheduleEntryId};
use planner_entity::ScheduleEntry;
use planner_service::PlannerStore;

/// Arguments for schedule commands
#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// Schedule subcommand
    #[command(subcommand)]
    pub command: ScheduleCommand,
}

/// Schedule subcommands
#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    /// Plan doses for a protocol
    Generate {
        /// Protocol ID
        protocol: ProtocolId,
        /// Number of days from the protocol start
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },
    /// Doses planned for today
    Today,
    /// Doses planned in a date range
    List {
        /// First day (defaults to today)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day (defaults to a week after `from`)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Mark a dose taken
    Done {
        /// Schedule entry ID
        id: ScheduleEntryId,
    },
    /// Mark a dose not taken
    Undo {
        /// Schedule entry ID
        id: ScheduleEntryId,
    },
}

#[derive(Debug, Tabled)]
struct ScheduleRow {
    id: String,
    date: String,
    protocol: String,
    dose_mcg: f64,
    taken: String,
}

/// Rows name the protocol rather than showing its ID.
fn schedule_row(store: &PlannerStore, e: &ScheduleEntry) -> ScheduleRow {
    ScheduleRow {
        id: e.id.to_string(),
        date: e.date.to_string(),
        protocol: store
            .protocol(e.protocol_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|_| e.protocol_id.to_string()),
        dose_mcg: e.dose_mcg,
        taken: if e.completed { "yes" } else { "no" }.to_string(),
    }
}

fn print_entries(store: &PlannerStore, entries: &[ScheduleEntry], format: OutputFormat) {
    output::print_records(entries, |e| schedule_row(store, e), format);
}

/// Execute schedule commands
pub async fn execute(
    args: &ScheduleArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut store = super::open_store(config).await?;
    let today = store.clock().now().date_naive();

    match &args.command {
        ScheduleCommand::Generate { protocol, days } => {
            let created = store.generate_schedule(*protocol, *days).await?;
            if created.is_empty() {
                output::print_warning("No new doses to schedule");
            } else {
                output::print_success(&format!("Scheduled {} doses", created.len()));
                print_entries(&store, &created, format);
            }
        }
        ScheduleCommand::Today => {
            let entries: Vec<ScheduleEntry> =
                store.schedule_for(today).into_iter().cloned().collect();
            print_entries(&store, &entries, format);
        }
        ScheduleCommand::List { from, to } => {
            let from = from.unwrap_or(today);
            let to = match to {
                Some(to) => *to,
                None => from.checked_add_days(Days::new(7)).unwrap_or(from),
            };
            if to < from {
                return Err(AppError::validation("--to is before --from"));
            }
            let entries: Vec<ScheduleEntry> =
                store.schedule_between(from, to).into_iter().cloned().collect();
            print_entries(&store, &entries, format);
        }
        ScheduleCommand::Done { id } => {
            let entry = store.mark_dose(*id, true).await?;
            output::print_success(&format!("Dose on {} marked taken", entry.date));
        }
        ScheduleCommand::Undo { id } => {
            let entry = store.mark_dose(*id, false).await?;
            output::print_success(&format!("Dose on {} marked not taken", entry.date));
        }
    }

    Ok(())
}
