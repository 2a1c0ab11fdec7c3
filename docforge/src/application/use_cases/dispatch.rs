// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Dispatch use case (§4.I, §AS.5 `run-stage`/`run-stages`): thin pass
//! through to [`StageDispatcher`], the only job here is translating
//! between CLI-shaped arguments and the dispatcher's own types.

use std::sync::Arc;

use docforge_domain::error::DomainError;
use docforge_domain::value_objects::{DocumentId, StageName};

use crate::application::services::RuntimeServices;
use crate::infrastructure::runtime::{PrereqFailure, RunOutcome};

pub struct DispatchUseCase {
    services: Arc<RuntimeServices>,
}

impl DispatchUseCase {
    pub fn new(services: Arc<RuntimeServices>) -> Self {
        Self { services }
    }

    pub async fn run_stage(
        &self,
        document_id: DocumentId,
        stage: StageName,
        file_reference: &str,
        force: bool,
    ) -> Result<Result<RunOutcome, PrereqFailure>, DomainError> {
        self.services.dispatcher.run_stage(document_id, stage, file_reference, force).await
    }

    pub async fn run_stages(
        &self,
        document_id: DocumentId,
        stages: Vec<StageName>,
        file_reference: &str,
        force: bool,
        stop_on_error: bool,
    ) -> Result<Result<RunOutcome, PrereqFailure>, DomainError> {
        self.services.dispatcher.run_stages(document_id, stages, file_reference, force, stop_on_error).await
    }
}
