// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `visual_embedding` (§4.E): a vision-model caption per image, embedded
//! through the text embedding model as the image's vector representation -
//! there is no standalone image-embedding port, so the caption-then-embed
//! path doubles as one, consistent with how a captioning VLM is commonly
//! used as a stand-in for a dedicated vision encoder. Capped per run
//! (default 5, §5: "bounded to VRAM capacity") with a mandatory inter-call
//! delay.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map};

use docforge_domain::entities::{Embedding, ProcessingContext, SourceType};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::{BlobStore, PersistenceGateway, TextEmbeddingModel, VisionModel};
use docforge_domain::services::{ProcessingResult, StageProcessor};
use docforge_domain::value_objects::StageName;

pub struct VisualEmbeddingProcessor {
    gateway: Arc<dyn PersistenceGateway>,
    vision: Arc<dyn VisionModel>,
    embedder: Arc<dyn TextEmbeddingModel>,
    blobs: Arc<dyn BlobStore>,
    max_images_per_run: usize,
    inter_call_delay: Duration,
}

impl VisualEmbeddingProcessor {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        vision: Arc<dyn VisionModel>,
        embedder: Arc<dyn TextEmbeddingModel>,
        blobs: Arc<dyn BlobStore>,
        max_images_per_run: usize,
        inter_call_delay: Duration,
    ) -> Self {
        Self { gateway, vision, embedder, blobs, max_images_per_run, inter_call_delay }
    }
}

#[async_trait]
impl StageProcessor for VisualEmbeddingProcessor {
    fn stage_name(&self) -> StageName {
        StageName::VisualEmbedding
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let images = match self.gateway.get_images_for_document(ctx.document_id).await {
            Ok(images) => images,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("loading images: {e}")),
        };

        let missing: Vec<_> = images.into_iter().filter(|i| i.visual_embedding_id.is_none()).collect();
        let capped = missing.len() > self.max_images_per_run;
        let pending: Vec<_> = missing.into_iter().take(self.max_images_per_run).collect();

        let mut embedded = 0u32;
        let mut failed = 0u32;
        let mut first = true;

        for mut image in pending {
            if !first {
                tokio::time::sleep(self.inter_call_delay).await;
            }
            first = false;

            let bytes = match self.blobs.get(&image.storage_key).await {
                Ok(bytes) => bytes,
                Err(_) => {
                    failed += 1;
                    continue;
                }
            };

            let caption = match self.vision.describe(&bytes, "Describe this image for semantic search.").await {
                Ok(described) => described.text,
                Err(_) => {
                    failed += 1;
                    continue;
                }
            };

            let vector = match self.embedder.embed(&caption).await {
                Ok(vector) => vector,
                Err(_) => {
                    failed += 1;
                    continue;
                }
            };

            let embedding = match Embedding::new(SourceType::Image, image.id.as_uuid(), vector, self.embedder.model_name()) {
                Ok(embedding) => embedding,
                Err(_) => {
                    failed += 1;
                    continue;
                }
            };

            if let Err(e) = self.gateway.create_embeddings(vec![embedding.clone()]).await {
                return ProcessingResult::failure(ErrorKind::Transient, format!("saving visual embedding: {e}"));
            }

            image.visual_embedding_id = Some(embedding.id);
            if let Err(e) = self.gateway.save_image(&image).await {
                return ProcessingResult::failure(ErrorKind::Transient, format!("linking image to embedding: {e}"));
            }
            embedded += 1;
        }

        if embedded == 0 && failed > 0 {
            return ProcessingResult::failure(ErrorKind::Transient, "no image could be embedded this run");
        }

        let mut data = Map::new();
        data.insert("embedded".to_string(), json!(embedded));
        data.insert("failed".to_string(), json!(failed));
        let mut metadata = Map::new();
        metadata.insert("capped".to_string(), json!(capped));
        ProcessingResult::success(data, metadata)
    }
}
