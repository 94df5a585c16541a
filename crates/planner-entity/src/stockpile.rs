//! Derived stockpile bookkeeping row.

use serde::{Deserialize, Serialize};

/// What is left of one peptide across received orders and logged doses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockpileItem {
    /// Peptide name, as first recorded.
    pub peptide: String,
    /// Vials received.
    pub vials_on_hand: u32,
    /// Milligrams received.
    pub total_mg: f64,
    /// Milligrams consumed by completed doses.
    pub used_mg: f64,
    /// Milligrams remaining, never negative.
    pub remaining_mg: f64,
    /// Days the remainder lasts at the rate of active protocols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_supply: Option<f64>,
}
