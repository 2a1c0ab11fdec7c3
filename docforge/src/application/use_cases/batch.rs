// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Batch use case (§4.H, §AS.5 `batch`): thin pass through to
//! [`BatchEngine`], bundling the mutation request into one struct so the
//! bootstrap CLI has a single argument to build from its parsed flags.

use std::sync::Arc;

use uuid::Uuid;

use docforge_domain::error::DomainError;
use docforge_domain::value_objects::CorrelationId;

use crate::application::services::RuntimeServices;
use crate::infrastructure::runtime::{BatchMutation, BatchOutcome, BatchResource};

pub struct BatchUseCaseInput {
    pub resource: BatchResource,
    pub record_ids: Vec<Uuid>,
    pub mutation: BatchMutation,
    pub rollback_on_error: bool,
    pub actor_id: String,
    pub correlation_id: CorrelationId,
}

pub struct BatchUseCase {
    services: Arc<RuntimeServices>,
}

impl BatchUseCase {
    pub fn new(services: Arc<RuntimeServices>) -> Self {
        Self { services }
    }

    pub async fn execute(&self, input: BatchUseCaseInput) -> Result<BatchOutcome, DomainError> {
        self.services
            .batch
            .apply(input.resource, input.record_ids, input.mutation, input.rollback_on_error, &input.actor_id, input.correlation_id)
            .await
    }

    pub async fn rollback(&self, batch_task_id: Uuid, resource: BatchResource) -> Result<BatchOutcome, DomainError> {
        self.services.batch.rollback(batch_task_id, resource).await
    }
}
