//! Local filesystem key-value store.
//!
//! Each key is one `<escaped key>.json` file under the data directory.
//! Writes go to a temporary sibling first and are renamed into place, so a
//! crash mid-write never leaves a truncated document behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use planner_core::error::{AppError, ErrorKind};
use planner_core::result::AppResult;
use planner_core::traits::storage::KeyValueStore;

const EXTENSION: &str = "json";

/// Key-value store persisted as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct LocalKeyValueStore {
    /// Directory holding one file per key.
    root: PathBuf,
}

impl LocalKeyValueStore {
    /// Create a store rooted at the given directory, creating it if needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create data directory: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Directory this store writes to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{EXTENSION}", escape_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for LocalKeyValueStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to read key: {key}"),
                e,
            )),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.path_for(key);
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", escape_key(key), uuid::Uuid::new_v4()));

        fs::write(&tmp, value).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write key: {key}"),
                e,
            )
        })?;

        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to commit key: {key}"),
                e,
            ));
        }

        debug!(key, bytes = value.len(), "Wrote key");
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "Removed key");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to remove key: {key}"),
                e,
            )),
        }
    }

    async fn keys(&self) -> AppResult<Vec<String>> {
        let mut dir = fs::read_dir(&self.root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to list data directory: {}", self.root.display()),
                e,
            )
        })?;

        let mut keys = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if let Some(stem) = name.strip_suffix(&format!(".{EXTENSION}")) {
                if let Some(key) = unescape_key(stem) {
                    keys.push(key);
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir())
    }
}

/// Escape a key into a file-name-safe stem.
///
/// `[A-Za-z0-9.-]` pass through; every other byte becomes `_XX` (hex).
fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || (byte == b'.' && !out.is_empty()) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("_{byte:02X}"));
        }
    }
    out
}

/// Reverse [`escape_key`]. Returns `None` for names this store did not write.
fn unescape_key(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
