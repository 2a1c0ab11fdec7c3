// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `embedding` (§4.E): text embeddings over `IntelligenceChunk`s.
//! Idempotent per `(source_type, source_id, model_name)` - skips any chunk
//! already marked `completed` rather than re-embedding it, and transitions
//! the ones it processes from `pending` to `completed` (§3
//! `IntelligenceChunk`).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map};

use docforge_domain::entities::{Embedding, IntelligenceStatus, ProcessingContext, SourceType};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::{PersistenceGateway, TextEmbeddingModel};
use docforge_domain::value_objects::StageName;
use docforge_domain::services::{ProcessingResult, StageProcessor};

pub struct EmbeddingProcessor {
    gateway: Arc<dyn PersistenceGateway>,
    embedder: Arc<dyn TextEmbeddingModel>,
}

impl EmbeddingProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, embedder: Arc<dyn TextEmbeddingModel>) -> Self {
        Self { gateway, embedder }
    }
}

#[async_trait]
impl StageProcessor for EmbeddingProcessor {
    fn stage_name(&self) -> StageName {
        StageName::Embedding
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let chunks = match self.gateway.get_intelligence_chunks(ctx.document_id).await {
            Ok(chunks) => chunks,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("loading intelligence chunks: {e}")),
        };

        let pending: Vec<_> = chunks.into_iter().filter(|c| c.processing_status != IntelligenceStatus::Completed).collect();

        let mut batch = Vec::with_capacity(pending.len());
        let mut embedded_ids = Vec::with_capacity(pending.len());

        for chunk in &pending {
            let vector = match self.embedder.embed(&chunk.text).await {
                Ok(vector) => vector,
                Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("embedding chunk: {e}")),
            };
            let embedding = match Embedding::new(SourceType::TextChunk, chunk.id.as_uuid(), vector, self.embedder.model_name()) {
                Ok(embedding) => embedding,
                Err(e) => return ProcessingResult::failure(ErrorKind::Permanent, format!("building embedding: {e}")),
            };
            embedded_ids.push(chunk.id);
            batch.push(embedding);
        }

        if !batch.is_empty() {
            if let Err(e) = self.gateway.create_embeddings(batch).await {
                return ProcessingResult::failure(ErrorKind::Transient, format!("persisting embeddings: {e}"));
            }
            if let Err(e) = self.gateway.mark_intelligence_chunks_embedded(embedded_ids.clone()).await {
                return ProcessingResult::failure(ErrorKind::Transient, format!("marking chunks embedded: {e}"));
            }
        }

        let mut data = Map::new();
        data.insert("embedded".to_string(), json!(embedded_ids.len()));
        ProcessingResult::success(data, Map::new())
    }
}
