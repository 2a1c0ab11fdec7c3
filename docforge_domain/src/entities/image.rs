// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `Image` — an extracted raster/vector asset, deduplicated across
//! documents by content hash (§3, §4.E `image_processing`).

use serde::{Deserialize, Serialize};

use crate::value_objects::{ContentHash, DocumentId, EmbeddingId, ImageId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    pub document_id: DocumentId,
    pub page: u32,
    pub file_hash: ContentHash,
    pub storage_key: String,
    pub ocr_text: Option<String>,
    pub ai_description: Option<String>,
    pub visual_embedding_id: Option<EmbeddingId>,
}

impl Image {
    pub fn new(document_id: DocumentId, page: u32, file_hash: ContentHash, storage_key: impl Into<String>) -> Self {
        Self {
            id: ImageId::new(),
            document_id,
            page,
            file_hash,
            storage_key: storage_key.into(),
            ocr_text: None,
            ai_description: None,
            visual_embedding_id: None,
        }
    }
}
