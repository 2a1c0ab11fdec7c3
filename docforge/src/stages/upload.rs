// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `upload` (§4.E): verifies the raw bytes at `file_reference` still hash to
//! the content hash the ingest use case already resolved, and reports
//! duplicates as success rather than failure.
//!
//! §4.A calls `upsertDocumentByHash` "the sole idempotency anchor for the
//! upload stage", and §4.F keys the whole run - advisory lock, every
//! `StageStatus` row - off one `document_id` from the first stage onward.
//! Those two requirements only compose if the canonical id is known before
//! the executor starts, so the ingest use case (not this stage) calls
//! `upsert_document_by_hash` once, up front, and passes the resulting
//! canonical id into `PipelineExecutor::run`. This stage's job is reduced to
//! an integrity re-check plus surfacing the `was_new` the use case already
//! learned, carried in via `ctx.config["was_new"]` rather than paying for a
//! second upsert call.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map};

use docforge_domain::entities::ProcessingContext;
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::{BlobStore, PersistenceGateway};
use docforge_domain::services::{ProcessingResult, StageProcessor};
use docforge_domain::value_objects::{ContentHash, StageName};

pub struct UploadProcessor {
    gateway: Arc<dyn PersistenceGateway>,
    blobs: Arc<dyn BlobStore>,
}

impl UploadProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { gateway, blobs }
    }
}

#[async_trait]
impl StageProcessor for UploadProcessor {
    fn stage_name(&self) -> StageName {
        StageName::Upload
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let bytes = match self.blobs.get(&ctx.file_reference).await {
            Ok(bytes) => bytes,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("reading raw upload: {e}")),
        };

        let document = match self.gateway.get_document(ctx.document_id).await {
            Ok(Some(document)) => document,
            Ok(None) => return ProcessingResult::failure(ErrorKind::Permanent, "document row missing at upload stage"),
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("loading document: {e}")),
        };

        let observed_hash = ContentHash::of(&bytes);
        if observed_hash != document.content_hash {
            return ProcessingResult::failure(ErrorKind::Permanent, "hash mismatch with prior version");
        }

        let was_new = ctx.config.get("was_new").and_then(|v| v.as_bool()).unwrap_or(true);
        if !was_new {
            return ProcessingResult::duplicate();
        }

        let mut data = Map::new();
        data.insert("byte_size".to_string(), json!(document.byte_size));
        ProcessingResult::success(data, Map::new())
    }
}
