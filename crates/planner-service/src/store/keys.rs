//! Storage keys for every planner collection. All live under the
//! `planner:` namespace.

const PREFIX: &str = "planner";

/// Vendor list.
pub const VENDORS: &str = "planner:vendors";

/// Order list.
pub const ORDERS: &str = "planner:orders";

/// Protocol list.
pub const PROTOCOLS: &str = "planner:protocols";

/// Calendar schedule entries.
pub const SCHEDULE: &str = "planner:schedule";

/// Every collection key, in load order.
pub const ALL: [&str; 4] = [VENDORS, ORDERS, PROTOCOLS, SCHEDULE];

/// Whether a key belongs to the planner.
pub fn is_planner_key(key: &str) -> bool {
    key.split_once(':').is_some_and(|(prefix, _)| prefix == PREFIX)
}
