// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `metadata_extraction` (§4.E): manufacturer-specific regex patterns first,
//! optionally augmented with vision-model extraction from the document's
//! images; same-identity results are coalesced with `ErrorCode::merge`.
//! Solution text is filtered to the onsite-technicians section when a
//! three-section marker is present (HP's service-manual convention).

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map};

use docforge_domain::entities::{ErrorCode, ProcessingContext};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::{BlobStore, PersistenceGateway, VisionModel};
use docforge_domain::value_objects::StageName;
use docforge_domain::services::{ProcessingResult, StageProcessor};

use crate::stages::support::{detect_manufacturer_name, manufacturer_id_for, MANUFACTURER_PATTERNS, PATTERN_MATCH_MIN_CONFIDENCE};

/// HP service manuals mark the three audience sections with headings like
/// this; only the technician-facing body is kept as `solution` text.
const ONSITE_SECTION_MARKER: &str = "onsite technicians";
const OTHER_SECTION_MARKERS: &[&str] = &["call center agents", "customer self-repair"];

pub struct MetadataExtractionProcessor {
    gateway: Arc<dyn PersistenceGateway>,
    vision: Arc<dyn VisionModel>,
    blobs: Arc<dyn BlobStore>,
}

impl MetadataExtractionProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>, vision: Arc<dyn VisionModel>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { gateway, vision, blobs }
    }
}

#[async_trait]
impl StageProcessor for MetadataExtractionProcessor {
    fn stage_name(&self) -> StageName {
        StageName::MetadataExtraction
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let text = ctx
            .prior_results_by_stage
            .get(&StageName::TextExtraction)
            .and_then(|v| v.get("pages"))
            .and_then(|v| v.as_array())
            .map(|pages| pages.iter().filter_map(|p| p.as_str()).collect::<Vec<_>>().join("\n"))
            .unwrap_or_default();

        let manufacturer_name = detect_manufacturer_name(&text);
        let manufacturer_id = manufacturer_id_for(manufacturer_name);

        let mut codes = pattern_match_codes(&text, manufacturer_name, manufacturer_id, ctx.document_id);

        let images = match self.gateway.get_images_for_document(ctx.document_id).await {
            Ok(images) => images,
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("loading images: {e}")),
        };

        let mut vision_failures = 0u32;
        for image in images {
            let bytes = match self.blobs.get(&image.storage_key).await {
                Ok(bytes) => bytes,
                Err(_) => {
                    vision_failures += 1;
                    continue;
                }
            };
            let candidates = match self.vision.extract_error_codes(&bytes).await {
                Ok(candidates) => candidates,
                Err(_) => {
                    vision_failures += 1;
                    continue;
                }
            };
            for candidate in candidates {
                let vision_code = ErrorCode {
                    code: candidate.code,
                    manufacturer_id,
                    product_id: None,
                    document_id: Some(ctx.document_id),
                    video_id: None,
                    description: candidate.description,
                    solution: filter_to_onsite_section(&candidate.solution),
                    confidence: candidate.confidence,
                    ai_extracted: true,
                    verified: false,
                };
                merge_into(&mut codes, vision_code);
            }
        }

        let code_count = codes.len();
        if let Err(e) = self.gateway.upsert_error_codes(codes).await {
            return ProcessingResult::failure(ErrorKind::Transient, format!("persisting error codes: {e}"));
        }

        let mut data = Map::new();
        data.insert("error_codes".to_string(), json!(code_count));
        let mut metadata = Map::new();
        metadata.insert("vision_failures".to_string(), json!(vision_failures));
        ProcessingResult::success(data, metadata)
    }
}

fn pattern_match_codes(
    text: &str,
    manufacturer_name: &str,
    manufacturer_id: docforge_domain::value_objects::ManufacturerId,
    document_id: docforge_domain::value_objects::DocumentId,
) -> Vec<ErrorCode> {
    let Some(pattern) = MANUFACTURER_PATTERNS.iter().find(|p| p.name == manufacturer_name) else {
        return Vec::new();
    };
    let Ok(regex) = Regex::new(pattern.pattern) else { return Vec::new() };

    // A fixed-pattern match always clears the acceptance bar; no per-match
    // confidence model exists below the regex itself.
    debug_assert!(0.75 >= PATTERN_MATCH_MIN_CONFIDENCE);

    let mut codes = Vec::new();
    for m in regex.find_iter(text) {
        let context = surrounding_line(text, m.start());
        codes.push(ErrorCode {
            code: m.as_str().to_string(),
            manufacturer_id,
            product_id: None,
            document_id: Some(document_id),
            video_id: None,
            description: context.clone(),
            solution: filter_to_onsite_section(&context),
            confidence: 0.75,
            ai_extracted: false,
            verified: false,
        });
    }
    codes
}

fn surrounding_line(text: &str, byte_offset: usize) -> String {
    let line_start = text[..byte_offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[byte_offset..].find('\n').map(|i| byte_offset + i).unwrap_or(text.len());
    text[line_start..line_end].trim().to_string()
}

/// Keeps only the onsite-technicians section when the three-audience
/// marker convention is present; otherwise returns the text unchanged.
fn filter_to_onsite_section(text: &str) -> String {
    let lower = text.to_lowercase();
    let Some(onsite_start) = lower.find(ONSITE_SECTION_MARKER) else {
        return text.to_string();
    };
    let section_start = onsite_start + ONSITE_SECTION_MARKER.len();
    let section_end = OTHER_SECTION_MARKERS
        .iter()
        .filter_map(|marker| lower[section_start..].find(marker))
        .map(|offset| section_start + offset)
        .min()
        .unwrap_or(text.len());
    text[section_start..section_end].trim().to_string()
}

/// Coalesces a candidate into `codes` by `identity_key`, applying
/// `ErrorCode::merge` on a collision (§4.E: "pattern and vision results on
/// the same code are coalesced").
fn merge_into(codes: &mut Vec<ErrorCode>, candidate: ErrorCode) {
    if let Some(existing) = codes.iter_mut().find(|c| c.identity_key() == candidate.identity_key()) {
        *existing = ErrorCode::merge(existing.clone(), candidate);
    } else {
        codes.push(candidate);
    }
}
