// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage names and the fixed dependency graph
//!
//! §4.E fixes exactly 15 stages and a fixed dependency graph between them.
//! Per the redesign note in §9 ("Dynamic dispatch over stage names"), this
//! is modeled as a closed enum plus an explicit edge table rather than a
//! string-keyed registry - there is no way to construct a `StageName` that
//! isn't one of the fifteen, and `StageName::dependencies` is the single
//! source of truth the pipeline executor and dispatcher both consult for
//! dependency-gate checks.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Upload,
    TextExtraction,
    TableExtraction,
    SvgProcessing,
    ImageProcessing,
    VisualEmbedding,
    LinkExtraction,
    ChunkPrep,
    Classification,
    MetadataExtraction,
    PartsExtraction,
    SeriesDetection,
    Storage,
    Embedding,
    SearchIndexing,
}

/// All 15 stages in a stable order (topological, matching §4.E's diagram).
pub const ALL_STAGES: [StageName; 15] = [
    StageName::Upload,
    StageName::TextExtraction,
    StageName::TableExtraction,
    StageName::SvgProcessing,
    StageName::ImageProcessing,
    StageName::VisualEmbedding,
    StageName::LinkExtraction,
    StageName::ChunkPrep,
    StageName::Classification,
    StageName::MetadataExtraction,
    StageName::PartsExtraction,
    StageName::SeriesDetection,
    StageName::Storage,
    StageName::Embedding,
    StageName::SearchIndexing,
];

impl StageName {
    /// Direct predecessors that must be `completed` or `skipped` before this
    /// stage may run. Mirrors the diagram in §4.E exactly: `table_extraction`
    /// and `svg_processing` are parallel branches off `text_extraction`, and
    /// `visual_embedding` branches off `image_processing` without blocking
    /// the main `link_extraction` chain.
    pub fn dependencies(self) -> &'static [StageName] {
        use StageName::*;
        match self {
            Upload => &[],
            TextExtraction => &[Upload],
            TableExtraction => &[TextExtraction],
            SvgProcessing => &[TextExtraction],
            ImageProcessing => &[SvgProcessing],
            VisualEmbedding => &[ImageProcessing],
            LinkExtraction => &[ImageProcessing],
            ChunkPrep => &[LinkExtraction],
            Classification => &[ChunkPrep],
            MetadataExtraction => &[Classification],
            PartsExtraction => &[MetadataExtraction],
            SeriesDetection => &[PartsExtraction],
            Storage => &[SeriesDetection],
            Embedding => &[Storage],
            SearchIndexing => &[Embedding],
        }
    }

    pub fn as_str(self) -> &'static str {
        use StageName::*;
        match self {
            Upload => "upload",
            TextExtraction => "text_extraction",
            TableExtraction => "table_extraction",
            SvgProcessing => "svg_processing",
            ImageProcessing => "image_processing",
            VisualEmbedding => "visual_embedding",
            LinkExtraction => "link_extraction",
            ChunkPrep => "chunk_prep",
            Classification => "classification",
            MetadataExtraction => "metadata_extraction",
            PartsExtraction => "parts_extraction",
            SeriesDetection => "series_detection",
            Storage => "storage",
            Embedding => "embedding",
            SearchIndexing => "search_indexing",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StageName {
    type Err = crate::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STAGES
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| crate::error::DomainError::ValidationFailed(format!("unknown stage: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_has_no_dependencies() {
        assert!(StageName::Upload.dependencies().is_empty());
    }

    #[test]
    fn table_extraction_and_svg_processing_both_depend_only_on_text_extraction() {
        assert_eq!(StageName::TableExtraction.dependencies(), &[StageName::TextExtraction]);
        assert_eq!(StageName::SvgProcessing.dependencies(), &[StageName::TextExtraction]);
    }

    #[test]
    fn search_indexing_is_the_terminal_stage() {
        assert!(ALL_STAGES.iter().all(|s| !s.dependencies().contains(&StageName::SearchIndexing)));
    }

    #[test]
    fn round_trips_through_its_string_form() {
        for stage in ALL_STAGES {
            assert_eq!(stage.as_str().parse::<StageName>().unwrap(), stage);
        }
    }

    #[test]
    fn rejects_unknown_stage_names() {
        assert!("not_a_stage".parse::<StageName>().is_err());
    }
}
