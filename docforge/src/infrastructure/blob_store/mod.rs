// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Filesystem-backed `BlobStore` (§6): content-addressed keys rooted under
//! one configured directory. Grounded on the donor's async `tokio::fs`
//! adapter style (`infrastructure/adapters/file_io_service_adapter.rs`) -
//! every operation is a thin `tokio::fs` call plus a `DomainError` mapping,
//! no buffering or chunking logic since blobs here are whole images/PDFs
//! rather than multi-gigabyte streams.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use docforge_domain::error::DomainError;
use docforge_domain::repositories::BlobStore;

pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, DomainError> {
        if key.contains("..") {
            return Err(DomainError::ValidationFailed(format!("blob key must not contain '..': {key}")));
        }
        Ok(self.root.join(key))
    }
}

fn io_err(e: std::io::Error) -> DomainError {
    DomainError::ResourceUnavailable(e.to_string())
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String, DomainError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let mut file = tokio::fs::File::create(&path).await.map_err(io_err)?;
        file.write_all(&bytes).await.map_err(io_err)?;
        Ok(key.to_string())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DomainError::NotFound(format!("blob not found: {key}"))
            } else {
                io_err(e)
            }
        })
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::metadata(&path).await.is_ok())
    }

    /// No HTTP front end fronts this store, so the "signed URL" is a
    /// `file://` reference scoped to the configured root; a deployment that
    /// needs browser-facing delivery swaps this adapter for an object-store
    /// one without touching callers.
    async fn signed_url(&self, key: &str, _expires_in: chrono::Duration) -> Result<String, DomainError> {
        let path = self.resolve(key)?;
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path());

        store.put("images/abc.png", b"hello".to_vec(), "image/png").await.unwrap();
        let bytes = store.get("images/abc.png").await.unwrap();
        assert_eq!(bytes, b"hello");
        assert!(store.exists("images/abc.png").await.unwrap());
    }

    #[tokio::test]
    async fn get_missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path());
        let err = store.get("images/missing.png").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn rejects_path_traversal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path());
        let err = store.put("../escape.png", b"x".to_vec(), "image/png").await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path());
        store.delete("images/never-existed.png").await.unwrap();
    }
}
