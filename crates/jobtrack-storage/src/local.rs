use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use jobtrack_core::StorageBackend;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation. Used for development and tests;
/// presigned uploads are an S3 capability and are not supported here.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage
    /// * `base_url` - Base URL for serving objects (e.g., "http://localhost:3000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a storage key to a filesystem path, rejecting keys that could
    /// escape the base directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(format!(
                "Storage key contains invalid characters: {}",
                key
            )));
        }
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Collect every file under `dir`, depth-first, as paths relative to the
    /// storage root.
    async fn walk_files(&self, dir: &Path) -> StorageResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut stack = vec![dir.to_path_buf()];

        while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::IoError(e)),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    stack.push(path);
                } else {
                    files.push(path);
                }
            }
        }

        Ok(files)
    }

    fn relative_key(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.base_path)
            .ok()
            .map(|p| p.to_string_lossy().replace('\\', "/"))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put_object(&self, key: &str, data: Bytes, _content_type: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        self.ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", path.display(), e)))?;
        file.write_all(&data)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", path.display(), e)))?;
        file.flush()
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(key = %key, size_bytes = data.len(), "Local put successful");
        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<Bytes> {
        let path = self.key_to_path(key)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::ReadFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn delete_object(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::ReadFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        // A prefix is a path fragment, not necessarily a whole directory, so
        // walk the deepest directory above it and filter.
        let prefix_path = self.key_to_path(prefix.trim_end_matches('/'))?;
        let walk_root = if prefix.ends_with('/') {
            prefix_path
        } else {
            prefix_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.base_path.clone())
        };

        let files = self.walk_files(&walk_root).await?;
        let mut keys: Vec<String> = files
            .iter()
            .filter_map(|p| self.relative_key(p))
            .filter(|k| k.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete_prefix(&self, prefix: &str) -> StorageResult<usize> {
        let keys = self.list_keys(prefix).await?;
        let mut deleted = 0usize;

        for key in &keys {
            let path = self.key_to_path(key)?;
            match fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(StorageError::DeleteFailed(format!(
                        "{}: {}",
                        path.display(),
                        e
                    )))
                }
            }
        }

        // Prune the now-empty record directory, ignoring failures.
        if prefix.ends_with('/') {
            let dir = self.base_path.join(prefix.trim_end_matches('/'));
            let _ = fs::remove_dir(&dir).await;
        }

        tracing::debug!(prefix = %prefix, objects_deleted = deleted, "Local prefix delete");
        Ok(deleted)
    }

    async fn signed_download_url(&self, key: &str, _expires_in: Duration) -> StorageResult<String> {
        // No signing for local files; the URL is only as protected as the
        // static file route serving it.
        self.key_to_path(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    async fn signed_upload_url(
        &self,
        _key: &str,
        _content_type: &str,
        _content_length: u64,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        Err(StorageError::Unsupported(
            "presigned uploads require the s3 backend",
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/files".to_string())
            .await
            .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let (_dir, storage) = storage().await;
        storage
            .put_object("applications/2026/x/meta.json", Bytes::from("{}"), "application/json")
            .await
            .unwrap();
        let data = storage.get_object("applications/2026/x/meta.json").await.unwrap();
        assert_eq!(&data[..], b"{}");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_dir, storage) = storage().await;
        let err = storage.get_object("applications/2026/y/meta.json").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (_dir, storage) = storage().await;
        let err = storage.get_object("../outside").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
        let err = storage.get_object("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_list_and_delete_prefix() {
        let (_dir, storage) = storage().await;
        for key in [
            "applications/2026/a/meta.json",
            "applications/2026/a/cv.pdf",
            "applications/2026/b/meta.json",
        ] {
            storage
                .put_object(key, Bytes::from("data"), "application/octet-stream")
                .await
                .unwrap();
        }

        let keys = storage.list_keys("applications/2026/a/").await.unwrap();
        assert_eq!(keys.len(), 2);

        let deleted = storage.delete_prefix("applications/2026/a/").await.unwrap();
        assert_eq!(deleted, 2);
        assert!(!storage.exists("applications/2026/a/meta.json").await.unwrap());
        assert!(storage.exists("applications/2026/b/meta.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_urls_unsupported() {
        let (_dir, storage) = storage().await;
        let err = storage
            .signed_upload_url("k", "application/pdf", 1024, Duration::from_secs(900))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Unsupported(_)));

        let url = storage
            .signed_download_url("applications/2026/a/cv.pdf", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:3000/files/applications/2026/a/cv.pdf"
        );
    }
}
