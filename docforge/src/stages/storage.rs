// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `storage` (§4.E: "upload raster assets to blob store"). `image_processing`
//! already writes each image's bytes to the blob store at extraction time
//! (it needs the storage key immediately, for dedup), so this stage's
//! contribution is the durability guarantee: it re-verifies every image row
//! for the document still has its blob present, the checkpoint a resumed
//! run relies on before `embedding`/`search_indexing` treat the document's
//! assets as permanent (§9 Open Questions).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map};

use docforge_domain::entities::ProcessingContext;
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::{BlobStore, PersistenceGateway};
use docforge_domain::value_objects::StageName;
use docforge_domain::services::{ProcessingResult, StageProcessor};

pub struct StorageProcessor {
    gateway: Arc<dyn PersistenceGateway>,
    blobs: Arc<dyn BlobStore>,
}

impl StorageProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { gateway, blobs }
    }
}

#[async_trait]
impl StageProcessor for StorageProcessor {
    fn stage_name(&self) -> StageName {
        StageName::Storage
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let images = match self.gateway.get_images_for_document(ctx.document_id).await {
            Ok(images) => images,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("loading images: {e}")),
        };

        let mut verified = 0u32;
        let mut missing = Vec::new();

        for image in &images {
            match self.blobs.exists(&image.storage_key).await {
                Ok(true) => verified += 1,
                Ok(false) => missing.push(image.storage_key.clone()),
                Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("checking blob presence: {e}")),
            }
        }

        if !missing.is_empty() {
            return ProcessingResult::failure(ErrorKind::Permanent, format!("{} image asset(s) missing from blob store", missing.len()));
        }

        let mut data = Map::new();
        data.insert("assets_verified".to_string(), json!(verified));
        ProcessingResult::success(data, Map::new())
    }
}
