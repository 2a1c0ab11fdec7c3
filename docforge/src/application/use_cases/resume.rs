// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Resume use case (§4.F smart-resume, §8 scenario S3): re-drive an
//! existing document's `pending`/`failed` stages without re-uploading or
//! re-running anything already `completed`/`skipped`.

use std::sync::Arc;

use serde_json::Value as Json;
use tracing::info;

use docforge_domain::error::DomainError;
use docforge_domain::value_objects::DocumentId;

use crate::application::services::RuntimeServices;
use crate::infrastructure::runtime::{RunMode, RunOutcome};

pub struct ResumeUseCase {
    services: Arc<RuntimeServices>,
}

impl ResumeUseCase {
    pub fn new(services: Arc<RuntimeServices>) -> Self {
        Self { services }
    }

    /// `file_reference` is the blob key recorded at ingest time; resume
    /// does not re-derive it since no new upload occurs here (§4.E
    /// `upload`'s idempotency check covers that stage on its own if it is
    /// among the ones still pending).
    pub async fn execute(&self, document_id: DocumentId, file_reference: &str) -> Result<RunOutcome, DomainError> {
        if self.services.gateway.get_document(document_id).await?.is_none() {
            return Err(DomainError::NotFound(format!("document {document_id}")));
        }

        let run = self
            .services
            .executor
            .run(document_id, file_reference, RunMode::Smart, Arc::new(Json::Null))
            .await?;

        info!(%document_id, completed = run.completed.len(), failed = run.failed.len(), blocked = run.blocked.len(), "resume run finished");
        Ok(run)
    }
}
