// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Retry Orchestrator (§4.C): classify, decide, lock, schedule, record.
//!
//! The deferred-retry task is always realized as a queue entry with
//! `scheduled_at = now + delay` rather than an in-process sleeping task -
//! §4.C allows either, and a queue entry survives a process restart, which
//! matters more here than the marginal latency of a dequeue poll.

use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;

use docforge_domain::entities::{ErrorRecord, QueueTask};
use docforge_domain::error::DomainError;
use docforge_domain::events::PipelineEvent;
use docforge_domain::repositories::{advisory_lock_key, PersistenceGateway, ProcessingQueue};
use docforge_domain::services::{RetryDecision, RetryPolicy};
use docforge_domain::value_objects::{CorrelationId, DocumentId, Priority, StageName};

use super::events::EventBus;
use crate::infrastructure::metrics::PipelineMetrics;

#[derive(Debug, Clone)]
pub enum RetryOutcome {
    /// A queue entry was inserted for `scheduled_at = now + delay_ms`.
    Scheduled { error_record: ErrorRecord, delay_ms: u64 },
    /// The error record reached its terminal `exhausted` state; the stage
    /// row itself remains `failed` (§4.C).
    Exhausted { error_record: ErrorRecord },
    /// Cancellation short-circuits retry entirely (§7).
    NotRetryable { error_record: ErrorRecord },
    /// Another worker already holds the `(document_id, stage)` advisory
    /// lock; this retry decision is dropped (§4.C step 4).
    LockHeldElsewhere,
}

pub struct RetryOrchestrator {
    gateway: Arc<dyn PersistenceGateway>,
    queue: Arc<dyn ProcessingQueue>,
    policy: RetryPolicy,
    events: EventBus,
    metrics: PipelineMetrics,
}

impl RetryOrchestrator {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        queue: Arc<dyn ProcessingQueue>,
        policy: RetryPolicy,
        events: EventBus,
        metrics: PipelineMetrics,
    ) -> Self {
        Self { gateway, queue, policy, events, metrics }
    }

    /// Runs the full §4.C algorithm for one failed stage execution and
    /// returns what happened. Callers (the pipeline executor) are
    /// responsible for transitioning the stage status row itself via
    /// `StageStatusStore::fail`.
    pub async fn handle_failure(
        &self,
        document_id: DocumentId,
        stage: StageName,
        error: &DomainError,
        attempt: u32,
    ) -> Result<RetryOutcome, DomainError> {
        let kind = error.classify();
        let correlation_id = CorrelationId::generate(Utc::now().timestamp_millis());
        let mut error_record = ErrorRecord::new(document_id, stage, kind, error.to_string(), attempt, correlation_id.clone());

        self.metrics.record_stage_failed(stage.as_str(), kind);

        let decision = self.policy.decide(kind, attempt);
        self.events.publish(PipelineEvent::StageFailed {
            document_id,
            stage,
            error_kind: kind,
            correlation_id: correlation_id.clone(),
            will_retry: matches!(decision, RetryDecision::Retry { .. }),
        });

        match decision {
            RetryDecision::NotRetryable => {
                error_record.exhaust();
                Ok(RetryOutcome::NotRetryable { error_record })
            }
            RetryDecision::Exhausted => {
                error_record.exhaust();
                Ok(RetryOutcome::Exhausted { error_record })
            }
            RetryDecision::Retry { delay_ms } => {
                let lock_key = advisory_lock_key(document_id, Some(stage));
                if !self.gateway.try_acquire_advisory_lock(lock_key).await? {
                    return Ok(RetryOutcome::LockHeldElsewhere);
                }

                let scheduled_at = Utc::now() + ChronoDuration::milliseconds(delay_ms as i64);
                error_record.schedule_retry(scheduled_at);

                let payload = json!({
                    "document_id": document_id.to_string(),
                    "stage": stage.as_str(),
                    "attempt": attempt,
                });
                let task = QueueTask::new(
                    "stage_retry",
                    payload,
                    Priority::Other.as_u8(),
                    scheduled_at,
                    correlation_id.clone(),
                );
                self.queue.enqueue(task).await?;

                self.metrics.record_retry_scheduled();
                self.events.publish(PipelineEvent::RetryScheduled {
                    error_id: error_record.error_id.to_string(),
                    correlation_id,
                    delay_ms,
                    attempt,
                });

                self.gateway.release_advisory_lock(lock_key).await?;
                Ok(RetryOutcome::Scheduled { error_record, delay_ms })
            }
        }
    }
}
