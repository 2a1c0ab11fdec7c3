// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `search_indexing` (§4.E), the final stage in the dependency graph. Full
//! text search runs off a GIN index over `to_tsvector(text)`
//! (`migrations/0002_search_index.sql`), which Postgres keeps current as
//! rows change - there is nothing left for this stage to build. Its job is
//! the completion gate: confirm `embedding` actually produced vectors for
//! the document before the document is considered searchable end to end.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map};

use docforge_domain::entities::ProcessingContext;
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::PersistenceGateway;
use docforge_domain::value_objects::StageName;
use docforge_domain::services::{ProcessingResult, StageProcessor};

pub struct SearchIndexingProcessor {
    gateway: Arc<dyn PersistenceGateway>,
}

impl SearchIndexingProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl StageProcessor for SearchIndexingProcessor {
    fn stage_name(&self) -> StageName {
        StageName::SearchIndexing
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let chunks = match self.gateway.get_intelligence_chunks(ctx.document_id).await {
            Ok(chunks) => chunks,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("loading intelligence chunks: {e}")),
        };

        if chunks.is_empty() {
            let mut data = Map::new();
            data.insert("searchable_chunks".to_string(), json!(0));
            return ProcessingResult::success(data, Map::new());
        }

        match self.gateway.exists_embeddings_for_document(ctx.document_id).await {
            Ok(true) => {}
            Ok(false) => return ProcessingResult::failure(ErrorKind::Permanent, "no embeddings found for document at search_indexing"),
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("checking embeddings: {e}")),
        }

        let mut data = Map::new();
        data.insert("searchable_chunks".to_string(), json!(chunks.len()));
        ProcessingResult::success(data, Map::new())
    }
}
