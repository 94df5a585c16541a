//! Share link CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use planner_core::config::AppConfig;
use planner_core::error::{AppError, ErrorKind};
use planner_core::types::{OrderId, ProtocolId, VendorId};
use planner_entity::SharedRecord;
use planner_service::OpenedShare;

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Create a link for a vendor
    Vendor {
        /// Vendor ID
        id: VendorId,
    },
    /// Create a link for a protocol
    Protocol {
        /// Protocol ID
        id: ProtocolId,
    },
    /// Create a link for an order
    Order {
        /// Order ID
        id: OrderId,
    },
    /// Show what a link contains without saving it
    Open {
        /// Share URL
        url: String,
    },
    /// Save the record from a link as a new local record
    Import {
        /// Share URL
        url: String,
    },
}

#[derive(Debug, Serialize)]
struct SharePreview<'a> {
    record: &'a SharedRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
}

#[derive(Debug, Tabled)]
struct ShareRow {
    kind: String,
    title: String,
    expires: String,
}

fn preview(opened: &OpenedShare) -> SharePreview<'_> {
    SharePreview {
        record: &opened.record,
        expires_at: opened.expires_at.map(|t| t.to_rfc3339()),
    }
}

fn share_row(p: &SharePreview<'_>) -> ShareRow {
    ShareRow {
        kind: p.record.kind().to_string(),
        title: p.record.title().to_string(),
        expires: output::opt(&p.expires_at),
    }
}

/// Point the user at a plain-text copy of the record when no link could
/// be generated. Other errors pass through unchanged.
fn suggest_fallback(mut err: AppError, kind: &str, id: &impl std::fmt::Display) -> AppError {
    if err.kind == ErrorKind::EncodeFailure {
        err.message = format!(
            "{}\nShare the record as plain text instead: planner --format json {kind} show {id}",
            err.message
        );
    }
    err
}

/// Execute share commands
pub async fn execute(
    args: &ShareArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut store = super::open_store(config).await?;
    let service = super::share_service(config);

    match &args.command {
        ShareCommand::Vendor { id } => {
            let url = service
                .share_vendor(store.vendor(*id)?)
                .map_err(|e| suggest_fallback(e, "vendor", id))?;
            println!("{url}");
        }
        ShareCommand::Protocol { id } => {
            let url = service
                .share_protocol(store.protocol(*id)?)
                .map_err(|e| suggest_fallback(e, "protocol", id))?;
            println!("{url}");
        }
        ShareCommand::Order { id } => {
            let url = service
                .share_order(store.order(*id)?)
                .map_err(|e| suggest_fallback(e, "order", id))?;
            println!("{url}");
        }
        ShareCommand::Open { url } => {
            let opened = service.open(url)?;
            output::print_record(&preview(&opened), share_row, format);
        }
        ShareCommand::Import { url } => {
            let record = service.import(&mut store, url).await?;
            output::print_success(&format!(
                "Imported {} '{}'",
                record.kind(),
                record.title()
            ));
        }
    }

    Ok(())
}
