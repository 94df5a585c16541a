//! Order tracking CLI commands.

use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use planner_core::config::AppConfig;
use planner_core::error::AppError;
use planner_core::types::{OrderId, VendorId};
use planner_entity::{CreateOrder, Order, OrderStatus, UpdateOrder};

/// Arguments for order commands
#[derive(Debug, Args)]
pub struct OrderArgs {
    /// Order subcommand
    #[command(subcommand)]
    pub command: OrderCommand,
}

/// Order subcommands
#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// List orders
    List {
        /// Only orders with this status
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Show one order
    Show {
        /// Order ID
        id: OrderId,
    },
    /// Record an order
    Add {
        #[arg(long)]
        peptide: String,
        /// Number of vials
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        mg_per_vial: f64,
        /// Link to a saved vendor
        #[arg(long)]
        vendor: Option<VendorId>,
        /// Vendor name when not linking a saved vendor
        #[arg(long)]
        vendor_name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long, default_value = "ordered")]
        status: OrderStatus,
        /// Order date (defaults to today)
        #[arg(long)]
        ordered_on: Option<NaiveDate>,
        #[arg(long)]
        tracking: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Update an order
    Update {
        /// Order ID
        id: OrderId,
        #[arg(long)]
        peptide: Option<String>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long)]
        mg_per_vial: Option<f64>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        ordered_on: Option<NaiveDate>,
        #[arg(long)]
        tracking: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change an order's status
    Status {
        /// Order ID
        id: OrderId,
        /// ordered, shipped, received or cancelled
        status: OrderStatus,
    },
    /// Remove an order
    Remove {
        /// Order ID
        id: OrderId,
    },
}

/// Order display row for table output
#[derive(Debug, Tabled)]
struct OrderRow {
    id: String,
    peptide: String,
    vendor: String,
    vials: u32,
    total_mg: String,
    status: String,
    ordered: String,
    received: String,
}

fn order_row(o: &Order) -> OrderRow {
    OrderRow {
        id: o.id.to_string(),
        peptide: o.peptide.clone(),
        vendor: o.vendor_name.clone(),
        vials: o.quantity,
        total_mg: format!("{:.1}", o.total_mg()),
        status: o.status.to_string(),
        ordered: o.ordered_on.to_string(),
        received: output::opt(&o.received_on),
    }
}

/// Execute order commands
pub async fn execute(
    args: &OrderArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut store = super::open_store(config).await?;

    match &args.command {
        OrderCommand::List { status } => {
            let orders: Vec<Order> = store
                .orders()
                .iter()
                .filter(|o| status.is_none_or(|s| o.status == s))
                .cloned()
                .collect();
            output::print_records(&orders, order_row, format);
        }
        OrderCommand::Show { id } => {
            output::print_record(store.order(*id)?, order_row, format);
        }
        OrderCommand::Add {
            peptide,
            quantity,
            mg_per_vial,
            vendor,
            vendor_name,
            price,
            status,
            ordered_on,
            tracking,
            notes,
        } => {
            let order = store
                .add_order(CreateOrder {
                    vendor_id: *vendor,
                    vendor_name: vendor_name.clone().unwrap_or_default(),
                    peptide: peptide.clone(),
                    quantity: *quantity,
                    mg_per_vial: *mg_per_vial,
                    price: *price,
                    status: *status,
                    ordered_on: ordered_on.unwrap_or_else(|| Utc::now().date_naive()),
                    tracking_number: tracking.clone(),
                    notes: notes.clone(),
                })
                .await?;
            output::print_record(&order, order_row, format);
        }
        OrderCommand::Update {
            id,
            peptide,
            quantity,
            mg_per_vial,
            price,
            ordered_on,
            tracking,
            notes,
        } => {
            let order = store
                .update_order(
                    *id,
                    UpdateOrder {
                        peptide: peptide.clone(),
                        quantity: *quantity,
                        mg_per_vial: *mg_per_vial,
                        price: *price,
                        ordered_on: *ordered_on,
                        tracking_number: tracking.clone(),
                        notes: notes.clone(),
                    },
                )
                .await?;
            output::print_record(&order, order_row, format);
        }
        OrderCommand::Status { id, status } => {
            let order = store.set_order_status(*id, *status).await?;
            output::print_success(&format!("Order {} is now {}", order.id, order.status));
        }
        OrderCommand::Remove { id } => {
            let order = store.remove_order(*id).await?;
            output::print_success(&format!("Order for {} removed", order.peptide));
        }
    }

    Ok(())
}
