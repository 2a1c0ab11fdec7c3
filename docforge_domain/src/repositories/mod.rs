//! Repository and service port traits — the domain's contract with the
//! infrastructure layer (§4.A, §4.B, §4.G, §6). All concrete adapters
//! (Postgres, object storage, HTTP enrichment clients) live in `docforge`;
//! this crate only declares the interface.

mod blob_store;
mod enrichment;
mod error_record_store;
mod persistence_gateway;
mod processing_queue;
mod stage_status_store;

pub use blob_store::BlobStore;
pub use enrichment::{
    DescribeResult, EnrichmentError, ErrorCodeCandidate, ScrapeResult, TextEmbeddingModel, VideoMetadata,
    VideoMetadataService, VisionModel, WebScraper,
};
pub use error_record_store::ErrorRecordStore;
pub use persistence_gateway::{advisory_lock_key, CountSummary, PersistenceGateway, StageCountSummary};
pub use processing_queue::{ProcessingQueue, QueueDepth, ReclaimSummary};
pub use stage_status_store::StageStatusStore;
