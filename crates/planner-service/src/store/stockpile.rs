//! Stockpile bookkeeping derived from orders, protocols and logged doses.

use std::collections::{BTreeMap, HashMap};

use planner_core::types::ProtocolId;
use planner_entity::{Order, OrderStatus, Protocol, ScheduleEntry, StockpileItem};

#[derive(Default)]
struct Tally {
    name: String,
    vials: u32,
    total_mg: f64,
    used_mg: f64,
    daily_mg: f64,
}

fn tally_for<'a>(tallies: &'a mut BTreeMap<String, Tally>, peptide: &str) -> &'a mut Tally {
    let entry = tallies
        .entry(peptide.trim().to_lowercase())
        .or_default();
    if entry.name.is_empty() {
        entry.name = peptide.trim().to_string();
    }
    entry
}

/// Compute per-peptide stock.
///
/// Received orders add to the stock; completed schedule entries draw it
/// down. Peptides are grouped case-insensitively and reported under the
/// first spelling seen, sorted by name.
pub fn compute(
    orders: &[Order],
    protocols: &[Protocol],
    schedule: &[ScheduleEntry],
) -> Vec<StockpileItem> {
    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();

    for order in orders.iter().filter(|o| o.status == OrderStatus::Received) {
        let tally = tally_for(&mut tallies, &order.peptide);
        tally.vials = tally.vials.saturating_add(order.quantity);
        tally.total_mg += order.total_mg();
    }

    for protocol in protocols.iter().filter(|p| p.active) {
        tally_for(&mut tallies, &protocol.peptide).daily_mg += protocol.daily_mg();
    }

    let peptide_by_protocol: HashMap<ProtocolId, &str> = protocols
        .iter()
        .map(|p| (p.id, p.peptide.as_str()))
        .collect();

    for entry in schedule.iter().filter(|e| e.completed) {
        if let Some(peptide) = peptide_by_protocol.get(&entry.protocol_id) {
            tally_for(&mut tallies, peptide).used_mg += entry.dose_mcg / 1000.0;
        }
    }

    tallies
        .into_values()
        .filter(|t| t.total_mg > 0.0 || t.used_mg > 0.0)
        .map(|t| {
            let remaining_mg = (t.total_mg - t.used_mg).max(0.0);
            let days_of_supply = (t.daily_mg > 0.0).then(|| remaining_mg / t.daily_mg);
            StockpileItem {
                peptide: t.name,
                vials_on_hand: t.vials,
                total_mg: t.total_mg,
                used_mg: t.used_mg,
                remaining_mg,
                days_of_supply,
            }
        })
        .collect()
}
