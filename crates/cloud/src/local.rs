//! Local filesystem object storage for development.
//!
//! Objects are written under a root directory and served by the API at
//! `LOCAL_STORAGE_PUBLIC_URL`.

use std::path::{Component, Path, PathBuf};

use hrflow_core::storage::{ObjectStorage, StorageError};

/// Default directory uploaded objects are written to.
pub const DEFAULT_LOCAL_DIR: &str = "./uploads";

/// Default public base URL of the served directory.
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:9000/uploads";

#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    pub root: PathBuf,
    pub public_url: String,
}

impl LocalStorageConfig {
    /// | Variable                   | Default                          |
    /// |----------------------------|----------------------------------|
    /// | `LOCAL_STORAGE_DIR`        | `./uploads`                      |
    /// | `LOCAL_STORAGE_PUBLIC_URL` | `http://localhost:9000/uploads`  |
    pub fn from_env() -> Self {
        Self {
            root: std::env::var("LOCAL_STORAGE_DIR")
                .unwrap_or_else(|_| DEFAULT_LOCAL_DIR.to_string())
                .into(),
            public_url: std::env::var("LOCAL_STORAGE_PUBLIC_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string()),
        }
    }
}

pub struct LocalStorage {
    config: LocalStorageConfig,
}

impl LocalStorage {
    pub fn new(config: LocalStorageConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Resolve `key` under the root, refusing anything that could escape it.
    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::Upload(format!("Invalid object key '{key}'")));
        }
        Ok(self.config.root.join(relative))
    }
}

#[async_trait::async_trait]
impl ObjectStorage for LocalStorage {
    async fn put_object(
        &self,
        key: &str,
        _content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Upload(format!("Failed to create directory: {e}")))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| StorageError::Upload(format!("Failed to write object: {e}")))?;

        tracing::debug!(key, size = bytes.len(), "Object stored on local disk");
        Ok(format!("{}/{key}", self.config.public_url.trim_end_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(LocalStorageConfig {
            root: dir.to_path_buf(),
            public_url: "http://localhost:9000/uploads/".to_string(),
        })
    }

    #[tokio::test]
    async fn writes_nested_key_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(dir.path());

        let url = store
            .put_object("documents/1/EMP-1/3/a.pdf", Some("application/pdf"), b"%PDF".to_vec())
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:9000/uploads/documents/1/EMP-1/3/a.pdf");
        let written = std::fs::read(dir.path().join("documents/1/EMP-1/3/a.pdf")).unwrap();
        assert_eq!(written, b"%PDF");
    }

    #[tokio::test]
    async fn rejects_keys_escaping_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = storage(dir.path());

        for key in ["../etc/passwd", "/abs/path", "a/../../b", ""] {
            assert!(
                store.put_object(key, None, vec![1]).await.is_err(),
                "key {key:?} should be rejected"
            );
        }
    }
}
