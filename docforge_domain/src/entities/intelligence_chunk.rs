// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `IntelligenceChunk` — the fingerprinted, deduplicated, AI-ready
//! projection of `ContentChunk`s (§3, glossary). Sole input to text
//! embedding.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::value_objects::{DocumentId, Fingerprint, IntelligenceChunkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntelligenceStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelligenceChunk {
    pub id: IntelligenceChunkId,
    pub document_id: DocumentId,
    pub text: String,
    pub page_start: u32,
    pub page_end: u32,
    pub fingerprint: Fingerprint,
    pub processing_status: IntelligenceStatus,
    pub metadata: Json,
    /// Weak, non-owning back-reference to the raw chunk this was produced
    /// from - relation, not ownership (§3 "Ownership & lifecycle").
    pub source_chunk_ordinal: u32,
}

impl IntelligenceChunk {
    pub fn new(document_id: DocumentId, text: String, page_start: u32, page_end: u32, source_chunk_ordinal: u32) -> Self {
        Self {
            id: IntelligenceChunkId::new(),
            fingerprint: Fingerprint::of(&text),
            document_id,
            text,
            page_start,
            page_end,
            processing_status: IntelligenceStatus::Pending,
            metadata: Json::Null,
            source_chunk_ordinal,
        }
    }

    pub fn mark_embedded(&mut self) {
        self.processing_status = IntelligenceStatus::Completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_derives_fingerprint_and_starts_pending() {
        let chunk = IntelligenceChunk::new(DocumentId::new(), "Error Code 13.20.01".into(), 1, 1, 0);
        assert_eq!(chunk.fingerprint, Fingerprint::of("error code 13.20.01"));
        assert_eq!(chunk.processing_status, IntelligenceStatus::Pending);
    }

    #[test]
    fn mark_embedded_completes_the_pending_status() {
        let mut chunk = IntelligenceChunk::new(DocumentId::new(), "x".into(), 1, 1, 0);
        chunk.mark_embedded();
        assert_eq!(chunk.processing_status, IntelligenceStatus::Completed);
    }
}
