// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Builds the full collaborator graph the use cases run against from one
//! [`AppConfig`] and an already-migrated connection pool.
//!
//! Grounded on the donor's `ProcessFileUseCase::create_pipeline_service`
//! static helper (`application/use_cases/process_file.rs`): one place that
//! owns every `Arc::new` for the runtime, so a use case takes `&RuntimeServices`
//! instead of reaching for a dozen constructor arguments of its own.

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use sqlx::PgPool;

use docforge_domain::repositories::{BlobStore, ErrorRecordStore, PersistenceGateway, ProcessingQueue, StageStatusStore};
use docforge_domain::services::RetryPolicy;

use crate::infrastructure::blob_store::FilesystemBlobStore;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::{PostgresErrorRecordStore, PostgresGateway, PostgresQueue, PostgresStageStatusStore};
use crate::infrastructure::enrichment::{HttpTextEmbeddingModel, HttpVisionModel};
use crate::infrastructure::metrics::PipelineMetrics;
use crate::infrastructure::runtime::{BatchEngine, EventBus, PipelineExecutor, RetryOrchestrator, StageDispatcher};
use crate::stages::{build_stage_table, StageCollaborators};

/// The model identity stamped onto every `Embedding` row (§3 `Embedding`:
/// "idempotent per `(source_type, source_id, model_name)`"). Not exposed as
/// a config knob yet - swapping embedding models is an operational event
/// rare enough that a redeploy is an acceptable way to change it.
const EMBEDDING_MODEL_NAME: &str = "text-embedding-3-small";
const EMBEDDING_DIMENSION: u32 = 1536;

/// Every collaborator a use case might need, built once at start-up and
/// shared behind `Arc`s for the lifetime of the process.
pub struct RuntimeServices {
    pub gateway: Arc<dyn PersistenceGateway>,
    pub stage_status: Arc<dyn StageStatusStore>,
    pub error_records: Arc<dyn ErrorRecordStore>,
    pub queue: Arc<dyn ProcessingQueue>,
    pub blobs: Arc<dyn BlobStore>,
    pub executor: Arc<PipelineExecutor>,
    pub dispatcher: Arc<StageDispatcher>,
    pub batch: Arc<BatchEngine>,
    pub metrics: PipelineMetrics,
    pub events: EventBus,
}

impl RuntimeServices {
    /// Wires every adapter from `config` and an already-migrated `pool`.
    pub fn build(config: &AppConfig, pool: PgPool) -> anyhow::Result<Self> {
        let gateway: Arc<dyn PersistenceGateway> = Arc::new(PostgresGateway::new(pool.clone()));
        let stage_status: Arc<dyn StageStatusStore> = Arc::new(PostgresStageStatusStore::new(pool.clone()));
        let error_records: Arc<dyn ErrorRecordStore> = Arc::new(PostgresErrorRecordStore::new(pool.clone()));
        let queue: Arc<dyn ProcessingQueue> = Arc::new(PostgresQueue::new(pool.clone()));
        let blobs: Arc<dyn BlobStore> = Arc::new(FilesystemBlobStore::new(config.blob_store.root.clone()));

        let vision = Arc::new(HttpVisionModel::new(config.enrichment.vision_model_url.clone()));
        let embedder = Arc::new(HttpTextEmbeddingModel::new(
            config.enrichment.embedding_model_url.clone(),
            EMBEDDING_MODEL_NAME,
            EMBEDDING_DIMENSION,
        ));

        let processors = build_stage_table(StageCollaborators {
            gateway: gateway.clone(),
            blobs: blobs.clone(),
            vision,
            embedder,
            max_images_per_run: config.visual_embedding_cap,
            visual_embedding_delay: Duration::from_millis(config.visual_embedding_inter_call_delay_ms),
        });

        let events = EventBus::new();
        let metrics = PipelineMetrics::new()?;

        // `AppConfig.retry` has no `cap_ms` knob; the donor's own backoff
        // cap is a constant rather than an operator-tunable, so this
        // follows the same default rather than growing the config surface
        // for a value nobody has asked to change.
        let retry_policy = RetryPolicy {
            base_delay_ms: config.retry.base_delay_ms,
            max_attempts: config.retry.max_attempts,
            cap_ms: RetryPolicy::default().cap_ms,
            rate_limit_floor_delay_ms: config.retry.rate_limit_floor_delay_ms,
        };

        let retry = Arc::new(RetryOrchestrator::new(
            gateway.clone(),
            queue.clone(),
            retry_policy,
            events.clone(),
            metrics.clone(),
        ));

        let visibility_timeout = ChronoDuration::seconds(config.queue.visibility_timeout_s as i64);

        let executor = Arc::new(PipelineExecutor::new(
            gateway.clone(),
            stage_status.clone(),
            error_records.clone(),
            processors,
            retry,
            events.clone(),
            metrics.clone(),
            visibility_timeout,
            config.max_concurrent_documents,
        ));

        let dispatcher = Arc::new(StageDispatcher::new(stage_status.clone(), executor.clone()));

        let batch = Arc::new(BatchEngine::new(pool, queue.clone(), config.queue.batch_sync_threshold));

        Ok(Self {
            gateway,
            stage_status,
            error_records,
            queue,
            blobs,
            executor,
            dispatcher,
            batch,
            metrics,
            events,
        })
    }
}
