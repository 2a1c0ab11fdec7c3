// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Queue status use case (§4.G, §AS.5 `queue status`): read-only depth
//! report for the retry/deferred-work queue.

use std::sync::Arc;

use docforge_domain::error::DomainError;
use docforge_domain::repositories::QueueDepth;

use crate::application::services::RuntimeServices;

pub struct QueueStatusUseCase {
    services: Arc<RuntimeServices>,
}

impl QueueStatusUseCase {
    pub fn new(services: Arc<RuntimeServices>) -> Self {
        Self { services }
    }

    pub async fn execute(&self, task_type: &str) -> Result<QueueDepth, DomainError> {
        self.services.queue.depth(task_type).await
    }
}
