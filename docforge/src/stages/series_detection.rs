// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `series_detection` (§4.E): looks for known manufacturer product-line
//! names in the extracted text and records the detected series as a
//! `StructuredExtraction` (`ProductSpecs`) row, for the same reason
//! `parts_extraction` does not create `Series` rows directly - there is no
//! series CRUD port, only the lightweight reference entity (§3).

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map};

use docforge_domain::entities::{ExtractionType, ProcessingContext, SourceType, StructuredExtraction, ValidationStatus};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::PersistenceGateway;
use docforge_domain::value_objects::StageName;
use docforge_domain::services::{ProcessingResult, StageProcessor};

/// Known manufacturer product-line prefixes, each followed by an
/// alphanumeric model token (e.g. "LaserJet Pro M428", "imageRUNNER 2630").
static SERIES_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(LaserJet(?:\s+Pro)?|imageRUNNER|WorkCentre|Aficio|PIXMA)\s+([A-Za-z0-9][A-Za-z0-9\-]{1,14})")
        .expect("static series-reference pattern is valid")
});

pub struct SeriesDetectionProcessor {
    gateway: Arc<dyn PersistenceGateway>,
}

impl SeriesDetectionProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl StageProcessor for SeriesDetectionProcessor {
    fn stage_name(&self) -> StageName {
        StageName::SeriesDetection
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let text = ctx
            .prior_results_by_stage
            .get(&StageName::TextExtraction)
            .and_then(|v| v.get("pages"))
            .and_then(|v| v.as_array())
            .map(|pages| pages.iter().filter_map(|p| p.as_str()).collect::<Vec<_>>().join("\n"))
            .unwrap_or_default();

        let mut series_names: Vec<String> = SERIES_REFERENCE.captures_iter(&text).map(|c| format!("{} {}", &c[1], &c[2])).collect();
        series_names.sort();
        series_names.dedup();

        if series_names.is_empty() {
            let mut data = Map::new();
            data.insert("series_detected".to_string(), json!(0));
            return ProcessingResult::success(data, Map::new());
        }

        let extraction = StructuredExtraction {
            source_type: SourceType::TextChunk,
            source_id: ctx.document_id.as_uuid(),
            extraction_type: ExtractionType::ProductSpecs,
            extracted_data: json!({ "series_names": series_names }),
            confidence: 0.6,
            validation_status: ValidationStatus::Pending,
        };

        let detected = series_names.len();
        if let Err(e) = self.gateway.insert_structured_extractions(vec![extraction]).await {
            return ProcessingResult::failure(ErrorKind::Transient, format!("persisting series detection: {e}"));
        }

        let mut data = Map::new();
        data.insert("series_detected".to_string(), json!(detected));
        ProcessingResult::success(data, Map::new())
    }
}
