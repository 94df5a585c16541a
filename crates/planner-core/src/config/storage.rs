//! Record storage configuration.

use serde::{Deserialize, Serialize};

/// Where planner records are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend: `"local"` (JSON files on disk) or `"memory"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Directory holding one JSON document per collection key.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_data_dir() -> String {
    "./data".to_string()
}
