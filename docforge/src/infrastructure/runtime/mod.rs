// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Runtime orchestration: the event bus, retry orchestrator, pipeline
//! executor, stage-based dispatcher, and batch operations engine.
//!
//! Grounded on the donor's `infrastructure/runtime/stage_executor.rs`
//! registry-dispatch shape, generalized across the closed `StageName` set
//! and split into the collaborators SPEC_FULL.md §4 names separately.

mod batch_engine;
mod dispatcher;
mod events;
mod pipeline_executor;
mod retry_orchestrator;

pub use batch_engine::{BatchEngine, BatchMutation, BatchOutcome, BatchResource};
pub use dispatcher::{PrereqFailure, StageDispatcher};
pub use events::EventBus;
pub use pipeline_executor::{PipelineExecutor, RunMode, RunOutcome};
pub use retry_orchestrator::{RetryOrchestrator, RetryOutcome};
