// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Pipeline Executor (§4.F): full/smart/selective run modes, intra-document
//! branch parallelism, per-document advisory lock, cancellation.
//!
//! Grounded on the donor's `BasicStageExecutor` (registry-dispatch-by-key,
//! generalized here to a closed `StageName` rather than a free-form
//! algorithm string) plus the base-wrapper obligations from §4.D: lease
//! management, idempotency precheck, lease extension, and panic
//! containment all live here rather than in each stage processor.

use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration as ChronoDuration, Utc};
use futures::FutureExt;
use serde_json::Value as Json;
use tokio::sync::Semaphore;

use docforge_domain::entities::{ErrorRecord, PriorResults, ProcessingContext, StageState};
use docforge_domain::error::{DomainError, ErrorKind};
use docforge_domain::events::PipelineEvent;
use docforge_domain::repositories::{advisory_lock_key, ErrorRecordStore, PersistenceGateway, StageStatusStore};
use docforge_domain::services::{DependencyGraph, ProcessingResult, StageProcessorTable};
use docforge_domain::value_objects::{CorrelationId, DocumentId, StageName, ALL_STAGES};

use super::events::EventBus;
use super::retry_orchestrator::{RetryOrchestrator, RetryOutcome};
use crate::infrastructure::metrics::PipelineMetrics;

#[derive(Debug, Clone)]
pub enum RunMode {
    /// Run all 15 stages in dependency order (§4.F).
    Full,
    /// Run only stages `pending`/`failed` whose dependencies are
    /// `completed`/`skipped` (§4.F resume).
    Smart,
    /// Run a caller-supplied sequence; dependency gates still apply unless
    /// `force` (§4.F).
    Selective { stages: Vec<StageName>, force: bool },
}

#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub completed: Vec<StageName>,
    pub failed: Vec<StageName>,
    pub blocked: Vec<StageName>,
}

pub struct PipelineExecutor {
    gateway: Arc<dyn PersistenceGateway>,
    stage_status: Arc<dyn StageStatusStore>,
    error_records: Arc<dyn ErrorRecordStore>,
    processors: StageProcessorTable,
    retry: Arc<RetryOrchestrator>,
    events: EventBus,
    metrics: PipelineMetrics,
    visibility_timeout: ChronoDuration,
    document_slots: Arc<Semaphore>,
}

impl PipelineExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        stage_status: Arc<dyn StageStatusStore>,
        error_records: Arc<dyn ErrorRecordStore>,
        processors: StageProcessorTable,
        retry: Arc<RetryOrchestrator>,
        events: EventBus,
        metrics: PipelineMetrics,
        visibility_timeout: ChronoDuration,
        max_concurrent_documents: usize,
    ) -> Self {
        Self {
            gateway,
            stage_status,
            error_records,
            processors,
            retry,
            events,
            metrics,
            visibility_timeout,
            document_slots: Arc::new(Semaphore::new(max_concurrent_documents)),
        }
    }

    /// Runs `mode` for `document_id`, honoring the per-document advisory
    /// lock (§4.F: "so that two workers do not drive the same document
    /// concurrently") and the `max_concurrent_documents` slot cap (§5).
    pub async fn run(
        &self,
        document_id: DocumentId,
        file_reference: &str,
        mode: RunMode,
        config: Arc<Json>,
    ) -> Result<RunOutcome, DomainError> {
        let _permit = self.document_slots.acquire().await.map_err(|_| DomainError::internal("document slot semaphore closed"))?;

        let lock_key = advisory_lock_key(document_id, None);
        if !self.gateway.try_acquire_advisory_lock(lock_key).await? {
            return Err(DomainError::AlreadyInProgress(format!("document {document_id} already has an active run")));
        }

        let result = self.run_locked(document_id, file_reference, mode, config).await;

        self.gateway.release_advisory_lock(lock_key).await?;
        result
    }

    async fn run_locked(&self, document_id: DocumentId, file_reference: &str, mode: RunMode, config: Arc<Json>) -> Result<RunOutcome, DomainError> {
        self.stage_status.initialize(document_id).await?;

        let mut candidates: HashSet<StageName> = match &mode {
            RunMode::Full => ALL_STAGES.into_iter().collect(),
            RunMode::Smart => ALL_STAGES.into_iter().collect(),
            RunMode::Selective { stages, .. } => stages.iter().copied().collect(),
        };
        // `Full` re-runs every stage unconditionally, including ones already
        // `completed` (§4.F); it shares the force-style candidate path with
        // `Selective { force: true, .. }` rather than going through
        // `runnable()`'s completed-state filter, which `Smart` still does.
        let force = matches!(mode, RunMode::Full | RunMode::Selective { force: true, .. });

        let mut outcome = RunOutcome::default();

        loop {
            let all_status = self.stage_status.get_all(document_id).await?;
            let states: HashMap<StageName, StageState> = all_status.iter().map(|s| (s.stage, s.state)).collect();
            let prior_results: Arc<PriorResults> = Arc::new(
                all_status
                    .into_iter()
                    .filter_map(|s| s.result_metadata.map(|metadata| (s.stage, metadata)))
                    .collect(),
            );

            let ready: Vec<StageName> = if force {
                candidates
                    .iter()
                    .copied()
                    .filter(|s| !outcome.completed.contains(s) && !outcome.failed.contains(s))
                    .collect()
            } else {
                DependencyGraph::runnable(&states).into_iter().filter(|s| candidates.contains(s)).collect()
            };

            if ready.is_empty() {
                break;
            }

            let handles = ready.iter().map(|&stage| {
                let correlation_id = CorrelationId::generate(Utc::now().timestamp_millis());
                self.run_stage(document_id, file_reference, stage, correlation_id, prior_results.clone(), config.clone())
            });
            let results = futures::future::join_all(handles).await;

            for (stage, state) in ready.into_iter().zip(results) {
                candidates.remove(&stage);
                match state? {
                    StageState::Completed | StageState::Skipped => outcome.completed.push(stage),
                    _ => outcome.failed.push(stage),
                }
            }
        }

        if !force {
            let states = self.current_states(document_id).await?;
            for stage in candidates {
                if !DependencyGraph::missing_prerequisites(stage, &states).is_empty() {
                    outcome.blocked.push(stage);
                }
            }
        }

        Ok(outcome)
    }

    async fn current_states(&self, document_id: DocumentId) -> Result<HashMap<StageName, StageState>, DomainError> {
        Ok(self
            .stage_status
            .get_all(document_id)
            .await?
            .into_iter()
            .map(|s| (s.stage, s.state))
            .collect())
    }

    /// One stage execution through the full base-wrapper contract (§4.D):
    /// idempotency precheck, lease begin/extend/complete/fail, panic
    /// containment, then the retry orchestrator on failure.
    async fn run_stage(
        &self,
        document_id: DocumentId,
        file_reference: &str,
        stage: StageName,
        correlation_id: CorrelationId,
        prior_results: Arc<PriorResults>,
        config: Arc<Json>,
    ) -> Result<StageState, DomainError> {
        let processor = match self.processors.get(&stage) {
            Some(p) => Arc::clone(p),
            None => return Err(DomainError::invalid_config(format!("no processor registered for stage {stage}"))),
        };

        let precheck_ctx = ProcessingContext::new(document_id, file_reference, correlation_id.clone())
            .with_prior_results(prior_results.clone())
            .with_config(config.clone());
        if processor.has_existing_output(&precheck_ctx).await {
            let lease = self.stage_status.begin(document_id, stage, self.visibility_timeout).await?;
            self.stage_status.complete(document_id, stage, lease).await?;
            return Ok(StageState::Completed);
        }

        let lease = match self.stage_status.begin(document_id, stage, self.visibility_timeout).await {
            Ok(lease) => lease,
            Err(DomainError::AlreadyInProgress(_)) => return Ok(StageState::InProgress),
            Err(e) => return Err(e),
        };

        self.metrics.record_stage_started(stage.as_str());
        self.events.publish(PipelineEvent::StageStarted { document_id, stage, correlation_id: correlation_id.clone() });

        let ctx = ProcessingContext::new(document_id, file_reference, correlation_id.clone())
            .with_prior_results(prior_results)
            .with_config(config);
        let started_at = std::time::Instant::now();

        let keep_alive = half_of(self.visibility_timeout);
        let extension = self.visibility_timeout;
        let keeper_store = Arc::clone(&self.stage_status);
        let keeper = tokio::spawn(async move {
            loop {
                tokio::time::sleep(keep_alive).await;
                if keeper_store.extend_lease(document_id, stage, lease, extension).await.is_err() {
                    break;
                }
            }
        });

        let process_future = AssertUnwindSafe(processor.process(ctx)).catch_unwind();
        let result: ProcessingResult = match process_future.await {
            Ok(r) => r,
            Err(_) => ProcessingResult::failure(ErrorKind::Unknown, format!("stage {stage} panicked")),
        };
        keeper.abort();

        let duration = started_at.elapsed();

        if result.success {
            self.stage_status.complete(document_id, stage, lease).await?;
            if !result.metadata.is_empty() {
                self.stage_status.save_result_metadata(document_id, stage, Json::Object(result.metadata.clone())).await?;
            }
            self.metrics.record_stage_completed(stage.as_str(), duration.as_secs_f64());
            self.events.publish(PipelineEvent::StageCompleted {
                document_id,
                stage,
                duration_ms: duration.as_millis() as u64,
                result_summary: if result.duplicate { "duplicate".to_string() } else { "ok".to_string() },
            });
            return Ok(StageState::Completed);
        }

        let error = result.error.expect("failure result carries an error");
        let domain_error = to_domain_error(error.kind, &error.message);

        let status = self.stage_status.get(document_id, stage).await?;
        let mut error_record = ErrorRecord::new(document_id, stage, error.kind, error.message.clone(), status.attempt_count, correlation_id);

        if error.kind == ErrorKind::Cancelled {
            self.stage_status.fail(document_id, stage, lease, error_record.error_id).await?;
            error_record.exhaust();
            self.error_records.save(&error_record).await?;
            return Ok(StageState::Failed);
        }

        self.stage_status.fail(document_id, stage, lease, error_record.error_id).await?;

        match self.retry.handle_failure(document_id, stage, &domain_error, status.attempt_count).await? {
            RetryOutcome::Scheduled { error_record: scheduled, .. } => {
                self.error_records.save(&scheduled).await?;
            }
            RetryOutcome::Exhausted { error_record: exhausted } | RetryOutcome::NotRetryable { error_record: exhausted } => {
                self.error_records.save(&exhausted).await?;
            }
            RetryOutcome::LockHeldElsewhere => {
                self.error_records.save(&error_record).await?;
            }
        }

        Ok(StageState::Failed)
    }
}

fn half_of(d: ChronoDuration) -> StdDuration {
    let millis = (d.num_milliseconds() / 2).max(1_000) as u64;
    StdDuration::from_millis(millis)
}

fn to_domain_error(kind: ErrorKind, message: &str) -> DomainError {
    match kind {
        ErrorKind::Transient => DomainError::ResourceUnavailable(message.to_string()),
        ErrorKind::Permanent => DomainError::ValidationFailed(message.to_string()),
        ErrorKind::RateLimited => DomainError::RateLimited(message.to_string()),
        ErrorKind::Cancelled => DomainError::Cancelled(message.to_string()),
        ErrorKind::LeaseLost => DomainError::LeaseLost(message.to_string()),
        ErrorKind::Unknown => DomainError::InternalError(message.to_string()),
    }
}
