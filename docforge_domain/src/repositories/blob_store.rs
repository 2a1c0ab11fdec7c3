// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Blob store port (§6). Keys are content-addressed:
//! `images/<sha256>.<ext>`, `documents/<doc_id>/<filename>`.

use async_trait::async_trait;

use crate::error::DomainError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, DomainError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, DomainError>;
    async fn delete(&self, key: &str) -> Result<(), DomainError>;
    async fn exists(&self, key: &str) -> Result<bool, DomainError>;

    /// Time-bounded URL for client retrieval, not for server-to-server
    /// reads (§6).
    async fn signed_url(&self, key: &str, expires_in: chrono::Duration) -> Result<String, DomainError>;
}
