// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `chunk_prep` (§4.E): projects each `ContentChunk` into a fingerprinted
//! `IntelligenceChunk`. Within-document fingerprint collisions are dropped
//! by `insert_intelligence_chunks` itself (§3 `IntelligenceChunk`); this
//! stage only builds the candidates and reports what actually landed.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map};

use docforge_domain::entities::{IntelligenceChunk, ProcessingContext};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::PersistenceGateway;
use docforge_domain::services::{ProcessingResult, StageProcessor};
use docforge_domain::value_objects::StageName;

pub struct ChunkPrepProcessor {
    gateway: Arc<dyn PersistenceGateway>,
}

impl ChunkPrepProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl StageProcessor for ChunkPrepProcessor {
    fn stage_name(&self) -> StageName {
        StageName::ChunkPrep
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let chunks = match self.gateway.get_content_chunks(ctx.document_id).await {
            Ok(chunks) => chunks,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("loading content chunks: {e}")),
        };

        let candidates: Vec<IntelligenceChunk> = chunks
            .into_iter()
            .filter(|c| !c.image_only)
            .map(|c| IntelligenceChunk::new(c.document_id, c.text, c.page_start, c.page_end, c.ordinal))
            .collect();

        let candidate_count = candidates.len();
        let inserted = match self.gateway.insert_intelligence_chunks(candidates).await {
            Ok(inserted) => inserted,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("persisting intelligence chunks: {e}")),
        };

        let mut data = Map::new();
        data.insert("inserted".to_string(), json!(inserted.len()));
        data.insert("duplicates_dropped".to_string(), json!(candidate_count.saturating_sub(inserted.len())));
        ProcessingResult::success(data, Map::new())
    }
}
