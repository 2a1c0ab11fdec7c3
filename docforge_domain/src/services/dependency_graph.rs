// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Thin query layer over `StageName::dependencies` for the pipeline
//! executor and dispatcher (§4.F, §4.I): which stages are runnable given a
//! map of current states, and which prerequisites are still missing.

use std::collections::HashMap;

use crate::entities::StageState;
use crate::value_objects::{StageName, ALL_STAGES};

pub struct DependencyGraph;

impl DependencyGraph {
    /// Stages whose dependencies are all `completed`/`skipped` and whose own
    /// state is `pending` or `failed` - the "smart resume" selection rule
    /// from §4.F.
    pub fn runnable(states: &HashMap<StageName, StageState>) -> Vec<StageName> {
        ALL_STAGES
            .into_iter()
            .filter(|stage| matches!(states.get(stage), Some(StageState::Pending) | Some(StageState::Failed) | None))
            .filter(|stage| {
                stage
                    .dependencies()
                    .iter()
                    .all(|dep| matches!(states.get(dep), Some(StageState::Completed) | Some(StageState::Skipped)))
            })
            .collect()
    }

    /// Dependencies of `stage` that are not yet `completed`/`skipped`, used
    /// by the dispatcher to build a precondition-failure response (§4.I).
    pub fn missing_prerequisites(stage: StageName, states: &HashMap<StageName, StageState>) -> Vec<StageName> {
        stage
            .dependencies()
            .iter()
            .copied()
            .filter(|dep| !matches!(states.get(dep), Some(StageState::Completed) | Some(StageState::Skipped)))
            .collect()
    }

    /// Two stages may run concurrently within one document only if neither
    /// depends (directly or transitively) on the other (§5: "stages on
    /// parallel branches... MAY run in parallel; stages on the same branch
    /// MUST NOT").
    pub fn may_run_concurrently(a: StageName, b: StageName) -> bool {
        if a == b {
            return false;
        }
        !Self::depends_on_transitively(a, b) && !Self::depends_on_transitively(b, a)
    }

    fn depends_on_transitively(stage: StageName, maybe_ancestor: StageName) -> bool {
        stage.dependencies().iter().any(|&dep| dep == maybe_ancestor || Self::depends_on_transitively(dep, maybe_ancestor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_upload_is_runnable_with_no_prior_state() {
        let states = HashMap::new();
        assert_eq!(DependencyGraph::runnable(&states), vec![StageName::Upload]);
    }

    #[test]
    fn table_extraction_and_svg_processing_both_become_runnable_after_text_extraction() {
        let mut states = HashMap::new();
        states.insert(StageName::Upload, StageState::Completed);
        states.insert(StageName::TextExtraction, StageState::Completed);
        let runnable = DependencyGraph::runnable(&states);
        assert!(runnable.contains(&StageName::TableExtraction));
        assert!(runnable.contains(&StageName::SvgProcessing));
    }

    #[test]
    fn missing_prerequisites_reports_unfinished_dependencies() {
        let states = HashMap::new();
        let missing = DependencyGraph::missing_prerequisites(StageName::TextExtraction, &states);
        assert_eq!(missing, vec![StageName::Upload]);
    }

    #[test]
    fn sibling_branches_may_run_concurrently_but_a_stage_and_its_dependency_may_not() {
        assert!(DependencyGraph::may_run_concurrently(StageName::TableExtraction, StageName::SvgProcessing));
        assert!(!DependencyGraph::may_run_concurrently(StageName::Upload, StageName::TextExtraction));
    }
}
