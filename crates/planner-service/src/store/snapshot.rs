//! Whole-store export format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use planner_entity::{Order, Protocol, ScheduleEntry, Vendor};

/// Current export format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Every collection at one point in time, used for backup and restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// When the export was taken.
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub protocols: Vec<Protocol>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}
