// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Error Record Store port (§4.C, §3 `ErrorRecord`): durable home for the
//! retry subsystem's state machine, referenced by `StageStatus::last_error_ref`.

use async_trait::async_trait;

use crate::entities::ErrorRecord;
use crate::error::DomainError;
use crate::value_objects::ErrorRecordId;

#[async_trait]
pub trait ErrorRecordStore: Send + Sync {
    async fn save(&self, record: &ErrorRecord) -> Result<(), DomainError>;
    async fn get(&self, id: ErrorRecordId) -> Result<Option<ErrorRecord>, DomainError>;
}
