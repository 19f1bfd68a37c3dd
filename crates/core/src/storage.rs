//! Object storage collaborator.
//!
//! Engines store uploads through [`ObjectStorage`] and only ever see the
//! returned URL. Implementations live in `hrflow-cloud`.

/// Error raised by an object storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend rejected or failed the write.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// The backend is not configured correctly.
    #[error("Storage configuration error: {0}")]
    Config(String),
}

#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key` and return the URL it can be fetched from.
    async fn put_object(
        &self,
        key: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError>;
}
