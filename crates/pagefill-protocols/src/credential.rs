//! Credential storage trait.

use async_trait::async_trait;

use crate::error::StorageError;

/// Storage key of the generation API credential.
pub const CREDENTIAL_KEY: &str = "geminiApiKey";

/// Persistent key-value storage.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Stored API credential, `None` when absent or blank.
    async fn credential(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .get(CREDENTIAL_KEY)
            .await?
            .filter(|value| !value.trim().is_empty()))
    }

    /// Store the API credential, trimmed. Blank values are rejected.
    async fn save_credential(&self, value: &str) -> Result<(), StorageError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(StorageError::InvalidValue {
                key: CREDENTIAL_KEY.to_string(),
                message: "must not be empty".to_string(),
            });
        }
        self.set(CREDENTIAL_KEY, trimmed).await
    }
}
