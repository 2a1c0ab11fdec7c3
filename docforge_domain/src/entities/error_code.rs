// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `ErrorCode` — normalized manufacturer error code with provenance (§3,
//! §4.E `metadata_extraction`).

use serde::{Deserialize, Serialize};

use crate::value_objects::{DocumentId, ManufacturerId, ProductId, VideoId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorCode {
    pub code: String,
    pub manufacturer_id: ManufacturerId,
    pub product_id: Option<ProductId>,
    pub document_id: Option<DocumentId>,
    pub video_id: Option<VideoId>,
    pub description: String,
    pub solution: String,
    pub confidence: f32,
    pub ai_extracted: bool,
    pub verified: bool,
}

impl ErrorCode {
    /// The uniqueness tuple from §3: `(code, manufacturer, product,
    /// document, video)` - allows the same code to recur with different
    /// provenance.
    pub fn identity_key(&self) -> (String, ManufacturerId, Option<ProductId>, Option<DocumentId>, Option<VideoId>) {
        (self.code.clone(), self.manufacturer_id, self.product_id, self.document_id, self.video_id)
    }

    /// Merges a pattern-matched and a vision-extracted result for the same
    /// identity key. Resolves the open tie-break question (DESIGN.md):
    /// higher confidence wins; on an exact tie, the pattern-match result
    /// wins because manufacturer regex patterns are treated as higher-trust
    /// than a general vision model.
    pub fn merge(pattern_match: ErrorCode, vision: ErrorCode) -> ErrorCode {
        if vision.confidence > pattern_match.confidence {
            vision
        } else {
            pattern_match
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(confidence: f32, ai_extracted: bool) -> ErrorCode {
        ErrorCode {
            code: "13.20.01".into(),
            manufacturer_id: ManufacturerId::new(),
            product_id: None,
            document_id: None,
            video_id: None,
            description: "desc".into(),
            solution: "fix".into(),
            confidence,
            ai_extracted,
            verified: false,
        }
    }

    #[test]
    fn merge_prefers_higher_confidence() {
        let pattern = code(0.7, false);
        let vision = code(0.95, true);
        let merged = ErrorCode::merge(pattern, vision);
        assert!(merged.ai_extracted);
    }

    #[test]
    fn merge_prefers_pattern_match_on_exact_tie() {
        let pattern = code(0.8, false);
        let vision = code(0.8, true);
        let merged = ErrorCode::merge(pattern, vision);
        assert!(!merged.ai_extracted);
    }
}
