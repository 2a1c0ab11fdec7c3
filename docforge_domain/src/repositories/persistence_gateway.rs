// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Persistence Gateway
//!
//! Typed operations over the schema-partitioned relational store (§4.A,
//! §6). The single point through which every stage and the executor reads
//! and writes `core.*`/`content.*`/`intelligence.*`/`system.*` rows.
//! Concrete implementation in `docforge` talks to Postgres; this trait is
//! the domain-owned port.

use async_trait::async_trait;

use crate::entities::{ContentChunk, Document, Embedding, ErrorCode, Image, IntelligenceChunk, Link, StructuredExtraction, StructuredTable, Video};
use crate::error::DomainError;
use crate::value_objects::{ContentHash, DocumentId, ImageId, IntelligenceChunkId, StageName, VideoId};

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Atomic upsert-by-hash, the sole idempotency anchor for `upload`
    /// (§4.A, §4.E, §8 property 1).
    async fn upsert_document_by_hash(&self, hash: &ContentHash, meta: Document) -> Result<(DocumentId, bool), DomainError>;

    async fn get_document(&self, id: DocumentId) -> Result<Option<Document>, DomainError>;
    async fn save_document(&self, document: &Document) -> Result<(), DomainError>;

    /// Cross-schema read used by image dedup (§4.A, §4.E `image_processing`).
    async fn get_image_by_hash(&self, hash: &ContentHash) -> Result<Option<Image>, DomainError>;
    async fn save_image(&self, image: &Image) -> Result<ImageId, DomainError>;

    /// All images extracted from one document, used by `visual_embedding`
    /// to find images still missing an embedding (§4.E).
    async fn get_images_for_document(&self, document_id: DocumentId) -> Result<Vec<Image>, DomainError>;

    async fn insert_content_chunks(&self, chunks: &[ContentChunk]) -> Result<(), DomainError>;
    async fn get_content_chunks(&self, document_id: DocumentId) -> Result<Vec<ContentChunk>, DomainError>;

    /// Idempotent per `(document_id, fingerprint)` - the `chunk_prep` dedup
    /// anchor (§4.E, §8 property 6). Returns the rows actually inserted
    /// (post-dedup).
    async fn insert_intelligence_chunks(&self, chunks: Vec<IntelligenceChunk>) -> Result<Vec<IntelligenceChunk>, DomainError>;
    async fn get_intelligence_chunks(&self, document_id: DocumentId) -> Result<Vec<IntelligenceChunk>, DomainError>;

    /// Transitions `pending` -> `completed` once `embedding` has written a
    /// vector for the chunk (§3 `IntelligenceChunk`: "status transitions
    /// pending->completed by the embedding stage").
    async fn mark_intelligence_chunks_embedded(&self, ids: Vec<IntelligenceChunkId>) -> Result<(), DomainError>;

    /// Bulk insert; fails atomically on dimension mismatch or a dangling
    /// source row (§4.A, §8 property 7).
    async fn create_embeddings(&self, batch: Vec<Embedding>) -> Result<(), DomainError>;
    async fn exists_embeddings_for_document(&self, document_id: DocumentId) -> Result<bool, DomainError>;

    async fn insert_structured_extractions(&self, extractions: Vec<StructuredExtraction>) -> Result<(), DomainError>;
    async fn insert_structured_tables(&self, tables: Vec<StructuredTable>) -> Result<(), DomainError>;

    /// Insert-or-merge on the `(code, manufacturer, product, document,
    /// video)` tuple (§3 `ErrorCode`).
    async fn upsert_error_codes(&self, codes: Vec<ErrorCode>) -> Result<(), DomainError>;

    async fn insert_links(&self, links: Vec<Link>) -> Result<(), DomainError>;

    /// `findOrCreateVideo` (§4.E `link_extraction`, §8 scenario S6).
    async fn find_or_create_video(&self, platform: &str, platform_video_id: &str) -> Result<Video, DomainError>;
    async fn save_video(&self, video: &Video) -> Result<(), DomainError>;
    async fn get_video(&self, id: VideoId) -> Result<Option<Video>, DomainError>;

    async fn count_by_document(&self, document_id: DocumentId) -> Result<CountSummary, DomainError>;
    async fn count_by_stage(&self, stage: StageName) -> Result<StageCountSummary, DomainError>;

    /// Advisory-lock operations keyed by a stable hash of `(document_id,
    /// stage_name)` or `(document_id)` for a full run (§4.A, §4.F, §5).
    /// Session-scoped: released automatically on connection loss.
    async fn try_acquire_advisory_lock(&self, key: i64) -> Result<bool, DomainError>;
    async fn release_advisory_lock(&self, key: i64) -> Result<(), DomainError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountSummary {
    pub content_chunks: u64,
    pub intelligence_chunks: u64,
    pub images: u64,
    pub embeddings: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StageCountSummary {
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// Deterministically derives the 64-bit advisory-lock key for `(document_id,
/// stage_name)` (§4.A: "derived deterministically... by stable hash to a
/// 64-bit integer").
pub fn advisory_lock_key(document_id: DocumentId, stage: Option<StageName>) -> i64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    document_id.as_uuid().hash(&mut hasher);
    stage.map(StageName::as_str).unwrap_or("").hash(&mut hasher);
    hasher.finish() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisory_lock_key_is_deterministic_for_the_same_inputs() {
        let doc = DocumentId::new();
        assert_eq!(
            advisory_lock_key(doc, Some(StageName::Upload)),
            advisory_lock_key(doc, Some(StageName::Upload))
        );
    }

    #[test]
    fn advisory_lock_key_differs_across_stages() {
        let doc = DocumentId::new();
        assert_ne!(
            advisory_lock_key(doc, Some(StageName::Upload)),
            advisory_lock_key(doc, Some(StageName::TextExtraction))
        );
    }

    #[test]
    fn document_scoped_lock_key_omits_the_stage() {
        let doc = DocumentId::new();
        assert_eq!(advisory_lock_key(doc, None), advisory_lock_key(doc, None));
    }
}
