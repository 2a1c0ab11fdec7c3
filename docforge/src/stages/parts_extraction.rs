// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `parts_extraction` (§4.E): scans the extracted text for part-number
//! references and records them as `StructuredExtraction` rows. There is no
//! parts-catalog entity of its own in the persistence gateway (§3 scopes
//! `Product` as a lightweight reference, not something this stage creates),
//! so a part reference is stored as unvalidated structured data pending
//! curation, the same shape `table_extraction`'s output takes before it is
//! reviewed.

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

/// A part-number reference: an explicit "Part No"/"P/N" label followed by an
/// alphanumeric catalog code.
static PART_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:part\s*(?:no\.?|number)|p/n)\s*[:#]?\s*([A-Z0-9][A-Z0-9\-]{2,14})").expect("static part-reference pattern is valid")
});

pub struct PartsExtractionProcessor {
    gateway: Arc<dyn PersistenceGateway>,
}

impl PartsExtractionProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl StageProcessor for PartsExtractionProcessor {
    fn stage_name(&self) -> StageName {
        StageName::PartsExtraction
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let text = ctx
            .prior_results_by_stage
            .get(&StageName::TextExtraction)
            .and_then(|v| v.get("pages"))
            .and_then(|v| v.as_array())
            .map(|pages| pages.iter().filter_map(|p| p.as_str()).collect::<Vec<_>>().join("\n"))
            .unwrap_or_default();

        let mut part_numbers: Vec<String> = PART_REFERENCE.captures_iter(&text).map(|c| c[1].to_string()).collect();
        part_numbers.sort();
        part_numbers.dedup();

        let extraction = StructuredExtraction {
            source_type: SourceType::TextChunk,
            source_id: ctx.document_id.as_uuid(),
            extraction_type: ExtractionType::PartsList,
            extracted_data: json!({ "part_numbers": part_numbers }),
            confidence: 0.65,
            validation_status: ValidationStatus::Pending,
        };

        let part_count = part_numbers.len();
        if let Err(e) = self.gateway.insert_structured_extractions(vec![extraction]).await {
            return ProcessingResult::failure(ErrorKind::Transient, format!("persisting parts extraction: {e}"));
        }

        let mut data = Map::new();
        data.insert("part_numbers".to_string(), json!(part_count));
        ProcessingResult::success(data, Map::new())
    }
}
