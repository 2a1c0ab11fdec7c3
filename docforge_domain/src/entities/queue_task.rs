// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `QueueTask` — durable, priority-ordered, lease-based unit of work (§3,
//! §4.G).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::value_objects::{CorrelationId, QueueTaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueTaskStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTask {
    pub id: QueueTaskId,
    pub task_type: String,
    pub payload: Json,
    pub status: QueueTaskStatus,
    pub priority: u8,
    pub scheduled_at: DateTime<Utc>,
    pub leased_until: Option<DateTime<Utc>>,
    pub lessor: Option<String>,
    pub attempt_count: u32,
    pub correlation_id: CorrelationId,
}

impl QueueTask {
    pub fn new(task_type: impl Into<String>, payload: Json, priority: u8, scheduled_at: DateTime<Utc>, correlation_id: CorrelationId) -> Self {
        Self {
            id: QueueTaskId::new(),
            task_type: task_type.into(),
            payload,
            status: QueueTaskStatus::Queued,
            priority,
            scheduled_at,
            leased_until: None,
            lessor: None,
            attempt_count: 0,
            correlation_id,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == QueueTaskStatus::Queued && self.scheduled_at <= now
    }

    pub fn is_lease_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == QueueTaskStatus::Processing && self.leased_until.is_some_and(|expiry| expiry < now)
    }
}
