// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `StructuredTable` rows emitted by `table_extraction` (§4.E). Idempotency
//! anchor: `(document_id, page, index_on_page)` is unique.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::value_objects::DocumentId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredTable {
    pub document_id: DocumentId,
    pub page: u32,
    pub index_on_page: u32,
    pub data_rows: Json,
    pub markdown_rendering: String,
    pub caption: Option<String>,
    pub surrounding_context: Option<String>,
}
