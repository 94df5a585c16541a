//! Vendor management CLI commands.

use clap::{Args, Subcommand};
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use planner_core::config::AppConfig;
use planner_core::error::AppError;
use planner_core::types::VendorId;
use planner_entity::{CreateVendor, UpdateVendor, Vendor};

/// Arguments for vendor commands
#[derive(Debug, Args)]
pub struct VendorArgs {
    /// Vendor subcommand
    #[command(subcommand)]
    pub command: VendorCommand,
}

/// Vendor subcommands
#[derive(Debug, Subcommand)]
pub enum VendorCommand {
    /// List all vendors
    List,
    /// Show one vendor
    Show {
        /// Vendor ID
        id: VendorId,
    },
    /// Add a vendor
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        /// Rating from 0 to 5
        #[arg(long, default_value_t = 0)]
        rating: u8,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Update a vendor
    Update {
        /// Vendor ID
        id: VendorId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        rating: Option<u8>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a vendor (its orders are kept)
    Remove {
        /// Vendor ID
        id: VendorId,
    },
}

/// Vendor display row for table output
#[derive(Debug, Tabled)]
struct VendorRow {
    id: String,
    name: String,
    website: String,
    contact: String,
    rating: String,
}

fn vendor_row(v: &Vendor) -> VendorRow {
    VendorRow {
        id: v.id.to_string(),
        name: v.name.clone(),
        website: output::opt(&v.website),
        contact: output::opt(&v.contact),
        rating: format!("{}/5", v.rating),
    }
}

/// Execute vendor commands
pub async fn execute(
    args: &VendorArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut store = super::open_store(config).await?;

    match &args.command {
        VendorCommand::List => {
            output::print_records(store.vendors(), vendor_row, format);
        }
        VendorCommand::Show { id } => {
            output::print_record(store.vendor(*id)?, vendor_row, format);
        }
        VendorCommand::Add {
            name,
            website,
            contact,
            rating,
            notes,
        } => {
            let vendor = store
                .add_vendor(CreateVendor {
                    name: name.clone(),
                    website: website.clone(),
                    contact: contact.clone(),
                    rating: *rating,
                    notes: notes.clone(),
                })
                .await?;
            output::print_record(&vendor, vendor_row, format);
        }
        VendorCommand::Update {
            id,
            name,
            website,
            contact,
            rating,
            notes,
        } => {
            let vendor = store
                .update_vendor(
                    *id,
                    UpdateVendor {
                        name: name.clone(),
                        website: website.clone(),
                        contact: contact.clone(),
                        rating: *rating,
                        notes: notes.clone(),
                    },
                )
                .await?;
            output::print_record(&vendor, vendor_row, format);
        }
        VendorCommand::Remove { id } => {
            let vendor = store.remove_vendor(*id).await?;
            output::print_success(&format!("Vendor '{}' removed", vendor.name));
        }
    }

    Ok(())
}
