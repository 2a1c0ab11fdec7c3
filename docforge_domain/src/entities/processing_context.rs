// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `ProcessingContext` — the uniform argument every stage processor
//! receives (§4.D). Carries no concrete service handles; the infrastructure
//! layer threads an immutable service bundle alongside it rather than
//! reaching for singletons (§9 Design Notes: "Global mutable service
//! instances").

use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::value_objects::{CorrelationId, DocumentId, StageName};

/// A stage's prior output, keyed by the stage that produced it, so a later
/// stage can read e.g. `text_extraction`'s page count without re-querying
/// the persistence gateway.
pub type PriorResults = HashMap<StageName, Json>;

#[derive(Clone)]
pub struct ProcessingContext {
    pub document_id: DocumentId,
    pub file_reference: String,
    pub prior_results_by_stage: Arc<PriorResults>,
    pub config: Arc<Json>,
    pub correlation_id: CorrelationId,
    pub cancellation_token: CancellationToken,
}

impl ProcessingContext {
    pub fn new(document_id: DocumentId, file_reference: impl Into<String>, correlation_id: CorrelationId) -> Self {
        Self {
            document_id,
            file_reference: file_reference.into(),
            prior_results_by_stage: Arc::new(HashMap::new()),
            config: Arc::new(Json::Null),
            correlation_id,
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn with_prior_results(mut self, prior_results_by_stage: Arc<PriorResults>) -> Self {
        self.prior_results_by_stage = prior_results_by_stage;
        self
    }

    pub fn with_config(mut self, config: Arc<Json>) -> Self {
        self.config = config;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
