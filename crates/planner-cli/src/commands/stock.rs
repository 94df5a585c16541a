//! Stockpile report.

use tabled::Tabled;

use crate::output::{self, OutputFormat};
use planner_core::config::AppConfig;
use planner_core::error::AppError;
use planner_entity::StockpileItem;

#[derive(Debug, Tabled)]
struct StockRow {
    peptide: String,
    vials: u32,
    total_mg: String,
    used_mg: String,
    remaining_mg: String,
    days_left: String,
}

fn stock_row(item: &StockpileItem) -> StockRow {
    StockRow {
        peptide: item.peptide.clone(),
        vials: item.vials_on_hand,
        total_mg: format!("{:.2}", item.total_mg),
        used_mg: format!("{:.2}", item.used_mg),
        remaining_mg: format!("{:.2}", item.remaining_mg),
        days_left: item
            .days_of_supply
            .map(|d| format!("{:.0}", d.floor()))
            .unwrap_or_else(|| "-".to_string()),
    }
}

/// Print stock on hand per peptide
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let store = super::open_store(config).await?;
    let items = store.stockpile();
    output::print_records(&items, stock_row, format);

    if format == OutputFormat::Table {
        for item in items.iter().filter(|i| i.days_of_supply.is_some_and(|d| d < 7.0)) {
            output::print_warning(&format!("{} runs out within a week", item.peptide));
        }
    }
    Ok(())
}
