// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `text_extraction` (§4.E): one `ContentChunk` per page, contiguous
//! ordinals starting at 0, image-only pages get an empty non-failing chunk.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map};

use docforge_domain::entities::{ContentChunk, ProcessingContext};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::{BlobStore, PersistenceGateway};
use docforge_domain::services::{ProcessingResult, StageProcessor};
use docforge_domain::value_objects::StageName;

pub struct TextExtractionProcessor {
    gateway: Arc<dyn PersistenceGateway>,
    blobs: Arc<dyn BlobStore>,
}

impl TextExtractionProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { gateway, blobs }
    }
}

#[async_trait]
impl StageProcessor for TextExtractionProcessor {
    fn stage_name(&self) -> StageName {
        StageName::TextExtraction
    }

    async fn has_existing_output(&self, ctx: &ProcessingContext) -> bool {
        matches!(self.gateway.get_content_chunks(ctx.document_id).await, Ok(existing) if !existing.is_empty())
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let bytes = match self.blobs.get(&ctx.file_reference).await {
            Ok(bytes) => bytes,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("reading PDF bytes: {e}")),
        };

        let pages = match extract_pages(&bytes) {
            Ok(pages) => pages,
            Err(e) => return ProcessingResult::failure(ErrorKind::Permanent, format!("extracting text: {e}")),
        };

        let chunks: Vec<ContentChunk> = pages
            .iter()
            .enumerate()
            .map(|(ordinal, text)| {
                let page = (ordinal + 1) as u32;
                ContentChunk::new(ctx.document_id, ordinal as u32, page, page, text.clone(), if text.trim().is_empty() { 0.0 } else { 0.9 })
            })
            .collect();

        if let Err(e) = self.gateway.insert_content_chunks(&chunks).await {
            return ProcessingResult::failure(ErrorKind::Transient, format!("persisting chunks: {e}"));
        }

        let mut metadata = Map::new();
        metadata.insert("page_count".to_string(), json!(pages.len()));
        metadata.insert("pages".to_string(), json!(pages));

        let mut data = Map::new();
        data.insert("chunk_count".to_string(), json!(chunks.len()));
        ProcessingResult::success(data, metadata)
    }
}

/// Splits `pdf_extract`'s whole-document output on its page-boundary form
/// feed (`\x0c`) into one text buffer per page. Falls back to treating the
/// whole document as a single page if no form feed is present (some PDFs
/// produce a single-page extraction with no separator).
fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, pdf_extract::OutputError> {
    let text = pdf_extract::extract_text_from_mem(bytes)?;
    let pages: Vec<String> = text.split('\u{c}').map(|page| page.to_string()).collect();
    Ok(if pages.is_empty() { vec![String::new()] } else { pages })
}
