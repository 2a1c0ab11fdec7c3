// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Processor contract
//!
//! Every one of the 15 stages implements `StageProcessor::process` (§4.D).
//! The base wrapper (implemented in the infrastructure layer, grounded on
//! the executor pattern this trait's shape is lifted from) wraps this call
//! with lease management, the idempotency precheck, lease extension, and
//! panic containment - none of which this trait itself knows about.

use async_trait::async_trait;
use serde_json::{Map, Value as Json};
use std::collections::HashMap;

use crate::entities::ProcessingContext;
use crate::error::ErrorKind;
use crate::value_objects::StageName;

/// `{success, data, metadata, error?}` (§4.D).
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub success: bool,
    pub data: Map<String, Json>,
    pub metadata: Map<String, Json>,
    pub error: Option<ProcessingResultError>,
    /// Set by the upload stage and honored by the pipeline executor (§4.E
    /// `upload`): a duplicate upload is success, not an error.
    pub duplicate: bool,
}

#[derive(Debug, Clone)]
pub struct ProcessingResultError {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl ProcessingResult {
    pub fn success(data: Map<String, Json>, metadata: Map<String, Json>) -> Self {
        Self { success: true, data, metadata, error: None, duplicate: false }
    }

    pub fn duplicate() -> Self {
        let mut metadata = Map::new();
        metadata.insert("duplicate".to_string(), Json::Bool(true));
        Self { success: true, data: Map::new(), metadata, error: None, duplicate: true }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let retryable = !matches!(kind, ErrorKind::Permanent | ErrorKind::Cancelled);
        Self {
            success: false,
            data: Map::new(),
            metadata: Map::new(),
            error: Some(ProcessingResultError { kind, message, retryable }),
            duplicate: false,
        }
    }
}

/// A single stage's entry point: `process(ctx) -> ProcessingResult` (§4.D).
#[async_trait]
pub trait StageProcessor: Send + Sync {
    fn stage_name(&self) -> StageName;

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult;

    /// Whether this stage's canonical output already exists for the
    /// document - the idempotency precheck the base wrapper consults before
    /// invoking `process` (§4.D). Default: never short-circuit; concrete
    /// stages override this with a cheap existence query.
    async fn has_existing_output(&self, _ctx: &ProcessingContext) -> bool {
        false
    }
}

/// Registry of stage processors keyed by the closed `StageName` enum - the
/// dispatch table called for in §9's redesign note, replacing a
/// string-keyed registry.
pub type StageProcessorTable = HashMap<StageName, std::sync::Arc<dyn StageProcessor>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_result_is_success_with_the_duplicate_flag() {
        let result = ProcessingResult::duplicate();
        assert!(result.success);
        assert!(result.duplicate);
        assert_eq!(result.metadata.get("duplicate"), Some(&Json::Bool(true)));
    }

    #[test]
    fn permanent_and_cancelled_failures_are_marked_not_retryable() {
        let permanent = ProcessingResult::failure(ErrorKind::Permanent, "bad input");
        let cancelled = ProcessingResult::failure(ErrorKind::Cancelled, "deadline exceeded");
        assert!(!permanent.error.unwrap().retryable);
        assert!(!cancelled.error.unwrap().retryable);
    }

    #[test]
    fn transient_failures_are_marked_retryable() {
        let transient = ProcessingResult::failure(ErrorKind::Transient, "timeout");
        assert!(transient.error.unwrap().retryable);
    }
}
