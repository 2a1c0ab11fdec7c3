// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Observability events emitted by the pipeline executor and retry
//! orchestrator (§6), consumed by an external monitor out of this crate's
//! scope. We specify the shape and the channel, not the consumer.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::value_objects::{CorrelationId, DocumentId, StageName};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageStarted {
        document_id: DocumentId,
        stage: StageName,
        correlation_id: CorrelationId,
    },
    StageCompleted {
        document_id: DocumentId,
        stage: StageName,
        duration_ms: u64,
        result_summary: String,
    },
    StageFailed {
        document_id: DocumentId,
        stage: StageName,
        error_kind: ErrorKind,
        correlation_id: CorrelationId,
        will_retry: bool,
    },
    RetryScheduled {
        error_id: String,
        correlation_id: CorrelationId,
        delay_ms: u64,
        attempt: u32,
    },
    QueueDepth {
        task_type: String,
        pending: u64,
        processing: u64,
        failed: u64,
    },
}
