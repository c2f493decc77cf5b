//! Credential storage.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use pagefill_protocols::{CredentialStore, StorageError};

/// In-memory store for tests and one-shot runs.
#[derive(Default)]
pub struct MemoryCredentialStore {
    values: parking_lot::RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key-value store persisted as one JSON object:
///
/// ```json
/// { "geminiApiKey": "..." }
/// ```
///
/// Missing files read as empty. Writes go through a temporary file so a
/// crash never leaves a truncated store behind.
pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    /// A parent path that exists but is not a directory can never hold the store.
    async fn check_parent(&self) -> Result<(), StorageError> {
        let Some(parent) = self.parent() else {
            return Ok(());
        };
        if fs::metadata(parent).await.is_ok_and(|meta| !meta.is_dir()) {
            return Err(StorageError::Unavailable(format!(
                "{} is not a directory",
                parent.display()
            )));
        }
        Ok(())
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        self.check_parent().await?;
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn save(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        self.check_parent().await?;
        if let Some(parent) = self.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(values)?).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!("Saved storage to {:?}", self.path);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values).await
    }
}
