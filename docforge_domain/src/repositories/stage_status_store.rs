// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage Status Store port (§4.B): per-`(document_id, stage)` lifecycle.

use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value as Json;

use crate::entities::StageStatus;
use crate::error::DomainError;
use crate::value_objects::{DocumentId, ErrorRecordId, LeaseToken, StageName};

#[async_trait]
pub trait StageStatusStore: Send + Sync {
    /// Ensures one `pending` row per known stage for `document_id` (§4.B).
    async fn initialize(&self, document_id: DocumentId) -> Result<(), DomainError>;

    async fn get(&self, document_id: DocumentId, stage: StageName) -> Result<StageStatus, DomainError>;
    async fn get_all(&self, document_id: DocumentId) -> Result<Vec<StageStatus>, DomainError>;

    /// `pending -> in_progress`. Fails with `AlreadyInProgress` if an
    /// unexpired lease is already held (§4.B, §8 property 3).
    async fn begin(&self, document_id: DocumentId, stage: StageName, visibility_timeout: Duration) -> Result<LeaseToken, DomainError>;

    async fn complete(&self, document_id: DocumentId, stage: StageName, lease: LeaseToken) -> Result<(), DomainError>;
    async fn fail(&self, document_id: DocumentId, stage: StageName, lease: LeaseToken, error_ref: ErrorRecordId) -> Result<(), DomainError>;
    async fn extend_lease(&self, document_id: DocumentId, stage: StageName, lease: LeaseToken, additional: Duration) -> Result<(), DomainError>;

    /// Stores a successfully completed stage's `ProcessingResult.metadata`
    /// so a later run can rebuild `prior_results_by_stage` without
    /// re-invoking the stage (§4.D).
    async fn save_result_metadata(&self, document_id: DocumentId, stage: StageName, metadata: Json) -> Result<(), DomainError>;

    /// Administrative: any state back to `pending`, attempt count preserved
    /// (§4.B `reset`).
    async fn reset(&self, document_id: DocumentId, stage: StageName) -> Result<(), DomainError>;
}
