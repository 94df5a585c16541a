//! Calendar schedule entries materialised from protocols.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use planner_core::types::{ProtocolId, ScheduleEntryId};

/// One planned dose on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Unique entry identifier.
    pub id: ScheduleEntryId,
    /// Protocol this dose belongs to.
    pub protocol_id: ProtocolId,
    /// Day the dose is planned for.
    pub date: NaiveDate,
    /// Dose in micrograms, copied from the protocol when generated.
    pub dose_mcg: f64,
    /// Whether the dose was taken.
    #[serde(default)]
    pub completed: bool,
    /// When the dose was marked taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScheduleEntry {
    /// Create a pending entry.
    pub fn planned(protocol_id: ProtocolId, date: NaiveDate, dose_mcg: f64) -> Self {
        Self {
            id: ScheduleEntryId::new(),
            protocol_id,
            date,
            dose_mcg,
            completed: false,
            completed_at: None,
        }
    }

    /// Mark the entry taken or not taken.
    pub fn mark(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = completed.then_some(now);
    }
}
