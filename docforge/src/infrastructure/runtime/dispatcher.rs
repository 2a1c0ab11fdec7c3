// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage-Based Dispatcher (§4.I): external single-stage / sequence
//! invocation for an existing document, enforcing dependency gates ahead of
//! delegating to the [`super::pipeline_executor::PipelineExecutor`]'s
//! selective run mode.

use std::sync::Arc;

use serde_json::Value as Json;

use docforge_domain::entities::StageState;
use docforge_domain::error::DomainError;
use docforge_domain::repositories::StageStatusStore;
use docforge_domain::services::DependencyGraph;
use docforge_domain::value_objects::{DocumentId, StageName};

use super::pipeline_executor::{PipelineExecutor, RunMode, RunOutcome};

pub struct PrereqFailure {
    pub stage: StageName,
    pub missing: Vec<StageName>,
}

pub struct StageDispatcher {
    stage_status: Arc<dyn StageStatusStore>,
    executor: Arc<PipelineExecutor>,
}

impl StageDispatcher {
    pub fn new(stage_status: Arc<dyn StageStatusStore>, executor: Arc<PipelineExecutor>) -> Self {
        Self { stage_status, executor }
    }

    /// Dispatches a single stage. Returns a precondition failure identifying
    /// the missing stages if `stage`'s dependencies are not all
    /// `completed`/`skipped`, unless `force` is set (§4.I).
    pub async fn run_stage(&self, document_id: DocumentId, stage: StageName, file_reference: &str, force: bool) -> Result<Result<RunOutcome, PrereqFailure>, DomainError> {
        self.run_stages(document_id, vec![stage], file_reference, force, false).await
    }

    /// Dispatches an ordered sequence. `stop_on_error` halts the sequence at
    /// the first stage that does not complete successfully (§4.I).
    pub async fn run_stages(
        &self,
        document_id: DocumentId,
        stages: Vec<StageName>,
        file_reference: &str,
        force: bool,
        stop_on_error: bool,
    ) -> Result<Result<RunOutcome, PrereqFailure>, DomainError> {
        if !force {
            let states = self.current_states(document_id).await?;
            for &stage in &stages {
                let missing = DependencyGraph::missing_prerequisites(stage, &states);
                if !missing.is_empty() {
                    return Ok(Err(PrereqFailure { stage, missing }));
                }
            }
        }

        // A dispatched run always targets an already-upserted document, so
        // there is no `was_new` for `upload` to read back - it falls through
        // to the default (§4.E `upload`: "carried in via `ctx.config`").
        let no_config = Arc::new(Json::Null);

        if stop_on_error {
            let mut outcome = RunOutcome::default();
            for stage in stages {
                let step = self
                    .executor
                    .run(document_id, file_reference, RunMode::Selective { stages: vec![stage], force }, no_config.clone())
                    .await?;
                let failed = !step.failed.is_empty();
                outcome.completed.extend(step.completed);
                outcome.failed.extend(step.failed);
                outcome.blocked.extend(step.blocked);
                if failed {
                    break;
                }
            }
            return Ok(Ok(outcome));
        }

        let outcome = self.executor.run(document_id, file_reference, RunMode::Selective { stages, force }, no_config).await?;
        Ok(Ok(outcome))
    }

    async fn current_states(&self, document_id: DocumentId) -> Result<std::collections::HashMap<StageName, StageState>, DomainError> {
        Ok(self
            .stage_status
            .get_all(document_id)
            .await?
            .into_iter()
            .map(|s| (s.stage, s.state))
            .collect())
    }
}
