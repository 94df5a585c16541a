//! Key-value storage trait for pluggable record backends.

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for string key-value backends.
///
/// Every value is a serialized JSON document stored under a string key.
/// Implementations live in `planner-storage`.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Get a value by key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store a value, replacing any existing one. Returns once the value
    /// is durable for this backend.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// List every key currently stored.
    async fn keys(&self) -> AppResult<Vec<String>>;

    /// Check that the backend is usable.
    async fn health_check(&self) -> AppResult<bool>;
}
