// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The 15 stage processors (§4.E) and the table that wires each
//! `StageName` to its implementation for `PipelineExecutor`.

mod chunk_prep;
mod classification;
mod embedding;
mod image_processing;
mod link_extraction;
mod metadata_extraction;
mod parts_extraction;
mod search_indexing;
mod series_detection;
mod storage;
pub mod support;
mod svg_processing;
mod table_extraction;
mod text_extraction;
mod upload;
mod visual_embedding;

use std::sync::Arc;
use std::time::Duration;

use docforge_domain::repositories::{BlobStore, PersistenceGateway, TextEmbeddingModel, VisionModel};
use docforge_domain::services::StageProcessorTable;
use docforge_domain::value_objects::StageName;

pub use chunk_prep::ChunkPrepProcessor;
pub use classification::ClassificationProcessor;
pub use embedding::EmbeddingProcessor;
pub use image_processing::ImageProcessingProcessor;
pub use link_extraction::LinkExtractionProcessor;
pub use metadata_extraction::MetadataExtractionProcessor;
pub use parts_extraction::PartsExtractionProcessor;
pub use search_indexing::SearchIndexingProcessor;
pub use series_detection::SeriesDetectionProcessor;
pub use storage::StorageProcessor;
pub use svg_processing::SvgProcessingProcessor;
pub use table_extraction::TableExtractionProcessor;
pub use text_extraction::TextExtractionProcessor;
pub use upload::UploadProcessor;
pub use visual_embedding::VisualEmbeddingProcessor;

/// The collaborators every stage processor is built from. One bundle, built
/// once at startup by the bootstrap crate and handed to `build_stage_table`,
/// rather than each stage reaching for a global service locator (§9 Design
/// Notes: "Global mutable service instances").
pub struct StageCollaborators {
    pub gateway: Arc<dyn PersistenceGateway>,
    pub blobs: Arc<dyn BlobStore>,
    pub vision: Arc<dyn VisionModel>,
    pub embedder: Arc<dyn TextEmbeddingModel>,
    pub max_images_per_run: usize,
    pub visual_embedding_delay: Duration,
}

pub fn build_stage_table(collaborators: StageCollaborators) -> StageProcessorTable {
    let StageCollaborators { gateway, blobs, vision, embedder, max_images_per_run, visual_embedding_delay } = collaborators;

    let mut table: StageProcessorTable = StageProcessorTable::new();

    table.insert(StageName::Upload, Arc::new(UploadProcessor::new(gateway.clone(), blobs.clone())));
    table.insert(StageName::TextExtraction, Arc::new(TextExtractionProcessor::new(gateway.clone(), blobs.clone())));
    table.insert(StageName::TableExtraction, Arc::new(TableExtractionProcessor::new(gateway.clone())));
    table.insert(StageName::SvgProcessing, Arc::new(SvgProcessingProcessor::new(blobs.clone())));
    table.insert(StageName::ImageProcessing, Arc::new(ImageProcessingProcessor::new(gateway.clone(), vision.clone(), blobs.clone())));
    table.insert(
        StageName::VisualEmbedding,
        Arc::new(VisualEmbeddingProcessor::new(gateway.clone(), vision.clone(), embedder.clone(), blobs.clone(), max_images_per_run, visual_embedding_delay)),
    );
    table.insert(StageName::LinkExtraction, Arc::new(LinkExtractionProcessor::new(gateway.clone())));
    table.insert(StageName::ChunkPrep, Arc::new(ChunkPrepProcessor::new(gateway.clone())));
    table.insert(StageName::Classification, Arc::new(ClassificationProcessor::new(gateway.clone())));
    table.insert(StageName::MetadataExtraction, Arc::new(MetadataExtractionProcessor::new(gateway.clone(), vision.clone(), blobs.clone())));
    table.insert(StageName::PartsExtraction, Arc::new(PartsExtractionProcessor::new(gateway.clone())));
    table.insert(StageName::SeriesDetection, Arc::new(SeriesDetectionProcessor::new(gateway.clone())));
    table.insert(StageName::Storage, Arc::new(StorageProcessor::new(gateway.clone(), blobs.clone())));
    table.insert(StageName::Embedding, Arc::new(EmbeddingProcessor::new(gateway.clone(), embedder.clone())));
    table.insert(StageName::SearchIndexing, Arc::new(SearchIndexingProcessor::new(gateway)));

    table
}
