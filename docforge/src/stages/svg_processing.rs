// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `svg_processing` (§4.E): flags pages whose content stream is dominated
//! by vector path-painting operators rather than raster image XObjects, so
//! `image_processing` does not waste an OCR/hash pass on line-art diagrams.
//! No persisted entity of its own - this stage's contribution is metadata
//! consumed by the next stage in the chain.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map};

use docforge_domain::entities::ProcessingContext;
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::BlobStore;
use docforge_domain::services::{ProcessingResult, StageProcessor};
use docforge_domain::value_objects::StageName;

/// A page whose content stream contains at least this many path-painting
/// operators relative to its overall token count is treated as vector-art
/// dominated rather than raster-dominated.
const VECTOR_OPERATOR_RATIO: f64 = 0.15;

pub struct SvgProcessingProcessor {
    blobs: Arc<dyn BlobStore>,
}

impl SvgProcessingProcessor {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }
}

#[async_trait]
impl StageProcessor for SvgProcessingProcessor {
    fn stage_name(&self) -> StageName {
        StageName::SvgProcessing
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let bytes = match self.blobs.get(&ctx.file_reference).await {
            Ok(bytes) => bytes,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("reading PDF bytes: {e}")),
        };

        let document = match lopdf::Document::load_mem(&bytes) {
            Ok(document) => document,
            Err(e) => return ProcessingResult::failure(ErrorKind::Permanent, format!("parsing PDF structure: {e}")),
        };

        let mut vector_pages = Vec::new();
        for (page_number, page_id) in document.get_pages() {
            let content = match document.get_page_content(page_id) {
                Ok(content) => content,
                Err(_) => continue,
            };
            if is_vector_dominated(&content) {
                vector_pages.push(page_number);
            }
        }

        let mut metadata = Map::new();
        metadata.insert("vector_pages".to_string(), json!(vector_pages));

        let mut data = Map::new();
        data.insert("vector_page_count".to_string(), json!(vector_pages.len()));
        ProcessingResult::success(data, metadata)
    }
}

fn is_vector_dominated(content: &[u8]) -> bool {
    let text = String::from_utf8_lossy(content);
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return false;
    }
    let vector_ops = tokens
        .iter()
        .filter(|t| matches!(**t, "m" | "l" | "c" | "v" | "y" | "re" | "S" | "s" | "f" | "f*" | "B" | "b"))
        .count();
    (vector_ops as f64) / (tokens.len() as f64) >= VECTOR_OPERATOR_RATIO
}
