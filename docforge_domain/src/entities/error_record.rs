// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `ErrorRecord` — durable record for the retry subsystem (§3, §4.C). State
//! machine: `pending_retry -> retrying -> (resolved | exhausted)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::value_objects::{CorrelationId, DocumentId, ErrorRecordId, StageName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorRecordStatus {
    PendingRetry,
    Retrying,
    Exhausted,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error_id: ErrorRecordId,
    pub correlation_id: CorrelationId,
    pub document_id: DocumentId,
    pub stage: StageName,
    pub error_kind: ErrorKind,
    pub message: String,
    pub attempt: u32,
    pub retry_scheduled_at: Option<DateTime<Utc>>,
    pub status: ErrorRecordStatus,
}

impl ErrorRecord {
    pub fn new(
        document_id: DocumentId,
        stage: StageName,
        error_kind: ErrorKind,
        message: impl Into<String>,
        attempt: u32,
        correlation_id: CorrelationId,
    ) -> Self {
        Self {
            error_id: ErrorRecordId::new(),
            correlation_id,
            document_id,
            stage,
            error_kind,
            message: message.into(),
            attempt,
            retry_scheduled_at: None,
            status: ErrorRecordStatus::PendingRetry,
        }
    }

    pub fn schedule_retry(&mut self, at: DateTime<Utc>) {
        self.retry_scheduled_at = Some(at);
        self.status = ErrorRecordStatus::Retrying;
    }

    pub fn resolve(&mut self) {
        self.status = ErrorRecordStatus::Resolved;
    }

    /// Terminal for the error record only - the stage row itself remains
    /// `failed` (§4.C: "`exhausted` is terminal for the error record; the
    /// stage itself remains `failed`").
    pub fn exhaust(&mut self) {
        self.status = ErrorRecordStatus::Exhausted;
    }
}
