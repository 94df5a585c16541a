//! Share link configuration.

use serde::{Deserialize, Serialize};

/// Settings used when building and validating share links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Origin that share URLs are rooted at (scheme + host + optional port).
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Route prefix placed between the origin and the record type.
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
    /// Validity window of a freshly generated link, in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            route_prefix: default_route_prefix(),
            ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_route_prefix() -> String {
    "planner".to_string()
}

fn default_ttl_hours() -> u64 {
    24
}
