//! Backend selection from configuration.

use std::sync::Arc;

use tracing::info;

use planner_core::config::storage::StorageConfig;
use planner_core::error::AppError;
use planner_core::result::AppResult;
use planner_core::traits::storage::KeyValueStore;

/// Build the key-value backend named by `config.provider`.
pub async fn create_store(config: &StorageConfig) -> AppResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.provider.as_str() {
        #[cfg(feature = "local")]
        "local" => Arc::new(crate::providers::LocalKeyValueStore::new(&config.data_dir).await?),
        #[cfg(feature = "memory")]
        "memory" => Arc::new(crate::providers::MemoryKeyValueStore::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown storage provider: {other}"
            )));
        }
    };

    if !store.health_check().await? {
        return Err(AppError::storage(format!(
            "Storage backend '{}' is not usable at {}",
            store.provider_type(),
            config.data_dir
        )));
    }

    info!(
        provider = store.provider_type(),
        data_dir = %config.data_dir,
        "Storage backend ready"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider() {
        let config = StorageConfig {
            provider: "memory".into(),
            data_dir: "unused".into(),
        };
        let store = create_store(&config).await.unwrap();
        assert_eq!(store.provider_type(), "memory");
    }

    #[tokio::test]
    async fn test_local_provider_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested/data");
        let config = StorageConfig {
            provider: "local".into(),
            data_dir: data_dir.to_string_lossy().into_owned(),
        };
        let store = create_store(&config).await.unwrap();
        assert_eq!(store.provider_type(), "local");
        assert!(data_dir.is_dir());
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let config = StorageConfig {
            provider: "s3".into(),
            data_dir: "./data".into(),
        };
        let err = create_store(&config).await.unwrap_err();
        assert_eq!(err.kind, planner_core::error::ErrorKind::Configuration);
    }
}
