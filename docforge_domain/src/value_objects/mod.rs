//! Value objects: small, immutable, validated types that stand in for raw
//! `String`/`Uuid`/`f64` at domain boundaries.

mod correlation_id;
mod fingerprint;
mod hash;
mod ids;
mod lease_token;
mod priority;
mod stage_name;

pub use correlation_id::CorrelationId;
pub use fingerprint::{normalize_text, Fingerprint};
pub use hash::ContentHash;
pub use ids::{
    BatchTaskId, DocumentId, EmbeddingId, ErrorRecordId, ImageId, IntelligenceChunkId,
    ManufacturerId, ProductId, QueueTaskId, SeriesId, VideoId,
};
pub use lease_token::LeaseToken;
pub use priority::Priority;
pub use stage_name::{StageName, ALL_STAGES};
