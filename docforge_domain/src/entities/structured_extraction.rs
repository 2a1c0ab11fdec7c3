// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `StructuredExtraction` — `(source_type, source_id, extraction_type,
//! extracted_data, confidence, validation_status)` (§3).

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use uuid::Uuid;

use super::SourceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionType {
    ProductSpecs,
    ErrorCodes,
    ServiceManual,
    PartsList,
    Troubleshooting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending,
    Validated,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredExtraction {
    pub source_type: SourceType,
    pub source_id: Uuid,
    pub extraction_type: ExtractionType,
    pub extracted_data: Json,
    pub confidence: f32,
    pub validation_status: ValidationStatus,
}
