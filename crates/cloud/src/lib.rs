//! Object storage backends for uploaded documents and profile pictures.
//!
//! Both backends implement [`hrflow_core::storage::ObjectStorage`]. The API
//! selects one at startup with [`storage_from_env`].

use std::sync::Arc;

use hrflow_core::storage::{ObjectStorage, StorageError};

pub mod local;
pub mod s3;

pub use local::{LocalStorage, LocalStorageConfig};
pub use s3::{S3Config, S3Storage};

/// Which backend `STORAGE_BACKEND` selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => Err(StorageError::Config(format!(
                "Unknown STORAGE_BACKEND '{other}'. Must be one of: local, s3"
            ))),
        }
    }

    /// Read `STORAGE_BACKEND` (default `local`).
    pub fn from_env() -> Result<Self, StorageError> {
        Self::parse(&std::env::var("STORAGE_BACKEND").unwrap_or_default())
    }
}

/// A constructed backend, plus the local root when files are served by the
/// API itself.
pub struct StorageSetup {
    pub storage: Arc<dyn ObjectStorage>,
    pub served_dir: Option<std::path::PathBuf>,
}

/// Build the backend selected by the environment.
pub async fn storage_from_env() -> Result<StorageSetup, StorageError> {
    match StorageBackend::from_env()? {
        StorageBackend::S3 => {
            let config = S3Config::from_env()?;
            tracing::info!(bucket = %config.bucket, region = %config.region, "Using S3 storage");
            Ok(StorageSetup {
                storage: Arc::new(S3Storage::new(config).await),
                served_dir: None,
            })
        }
        StorageBackend::Local => {
            let config = LocalStorageConfig::from_env();
            tracing::info!(root = %config.root.display(), "Using local disk storage");
            let root = config.root.clone();
            Ok(StorageSetup {
                storage: Arc::new(LocalStorage::new(config)),
                served_dir: Some(root),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parsing() {
        assert_eq!(StorageBackend::parse("").unwrap(), StorageBackend::Local);
        assert_eq!(StorageBackend::parse("Local").unwrap(), StorageBackend::Local);
        assert_eq!(StorageBackend::parse("s3").unwrap(), StorageBackend::S3);
        assert!(StorageBackend::parse("gcs").is_err());
    }
}
