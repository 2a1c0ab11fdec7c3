//! Domain entities: the mutable, identity-bearing records in §3's data
//! model, grouped by the schema that owns them in §6.

mod content_chunk;
mod document;
mod embedding;
mod error_code;
mod error_record;
mod image;
mod intelligence_chunk;
mod link;
mod manufacturer;
mod processing_context;
mod queue_task;
mod stage_status;
mod structured_extraction;
mod structured_table;
mod video;

pub use content_chunk::{ChunkType, ContentChunk};
pub use document::{Document, DocumentType, ProcessingStatus};
pub use embedding::{Embedding, SourceType};
pub use error_code::ErrorCode;
pub use error_record::{ErrorRecord, ErrorRecordStatus};
pub use image::Image;
pub use intelligence_chunk::{IntelligenceChunk, IntelligenceStatus};
pub use link::{Link, LinkCategory};
pub use manufacturer::{Manufacturer, Product, Series};
pub use processing_context::{PriorResults, ProcessingContext};
pub use queue_task::{QueueTask, QueueTaskStatus};
pub use stage_status::{StageState, StageStatus};
pub use structured_extraction::{ExtractionType, StructuredExtraction, ValidationStatus};
pub use structured_table::StructuredTable;
pub use video::Video;
