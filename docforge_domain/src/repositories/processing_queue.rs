// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Processing Queue port (§4.G): durable, priority-ordered, lease-based.

use async_trait::async_trait;
use chrono::Duration;

use crate::entities::QueueTask;
use crate::error::DomainError;
use crate::value_objects::QueueTaskId;

#[async_trait]
pub trait ProcessingQueue: Send + Sync {
    async fn enqueue(&self, task: QueueTask) -> Result<QueueTaskId, DomainError>;

    /// Atomically selects the highest-priority `queued` task due by now
    /// (§4.G). Ordering beyond priority is best-effort (§4.G, §5).
    async fn dequeue(&self, worker_id: &str, visibility_timeout: Duration) -> Result<Option<QueueTask>, DomainError>;

    async fn extend(&self, task_id: QueueTaskId, additional: Duration) -> Result<(), DomainError>;
    async fn ack(&self, task_id: QueueTaskId) -> Result<(), DomainError>;
    async fn nack(&self, task_id: QueueTaskId, reason: &str) -> Result<(), DomainError>;
    async fn defer(&self, task_id: QueueTaskId, until: chrono::DateTime<chrono::Utc>) -> Result<(), DomainError>;

    /// Reverts expired `processing` tasks to `queued`, incrementing their
    /// attempt counter; beyond `max_attempts` they are dead-lettered
    /// (§4.G).
    async fn reclaim_expired(&self, max_attempts: u32) -> Result<ReclaimSummary, DomainError>;

    async fn depth(&self, task_type: &str) -> Result<QueueDepth, DomainError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReclaimSummary {
    pub requeued: u64,
    pub dead_lettered: u64,
}

/// `queue.depth {task_type, pending, processing, failed}` (§6).
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueDepth {
    pub pending: u64,
    pub processing: u64,
    pub failed: u64,
}
