// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `Document` — the logical unit ingested (§3 `Document`). Lives in
//! `core.documents`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ContentHash, DocumentId, ManufacturerId, Priority, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    ServiceManual,
    PartsCatalog,
    Bulletin,
    Cpmd,
    Other,
}

impl DocumentType {
    /// The classification stage's type tag, used to derive `Priority`
    /// (§4.E `classification`). Note the tag names diverge slightly from
    /// the enum variants - `Bulletin` classifies as `"service_bulletin"`.
    pub fn as_priority_key(self) -> &'static str {
        match self {
            DocumentType::ServiceManual => "service_manual",
            DocumentType::PartsCatalog => "parts_catalog",
            DocumentType::Bulletin => "service_bulletin",
            DocumentType::Cpmd => "cpmd",
            DocumentType::Other => "other",
        }
    }
}

/// Top-level processing status summary, distinct from any single stage's
/// `StageState` (§3: "a document exists in at most one terminal state").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Processing,
    Completed,
    Failed,
    Archived,
}

impl ProcessingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed | ProcessingStatus::Archived)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub content_hash: ContentHash,
    pub filename: String,
    pub byte_size: u64,
    pub manufacturer_id: Option<ManufacturerId>,
    pub product_ids: Vec<ProductId>,
    pub document_type: Option<DocumentType>,
    pub priority: Option<Priority>,
    pub processing_status: ProcessingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(content_hash: ContentHash, filename: impl Into<String>, byte_size: u64, now: DateTime<Utc>) -> Self {
        Self {
            id: DocumentId::new(),
            content_hash,
            filename: filename.into(),
            byte_size,
            manufacturer_id: None,
            product_ids: Vec::new(),
            document_type: None,
            priority: None,
            processing_status: ProcessingStatus::Processing,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn classify(&mut self, document_type: DocumentType, manufacturer_id: ManufacturerId, now: DateTime<Utc>) {
        self.priority = Some(Priority::for_document_type(document_type.as_priority_key()));
        self.document_type = Some(document_type);
        self.manufacturer_id = Some(manufacturer_id);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn new_document_starts_unclassified_and_processing() {
        let doc = Document::new(ContentHash::of(b"bytes"), "manual.pdf", 1024, now());
        assert!(doc.document_type.is_none());
        assert!(doc.priority.is_none());
        assert_eq!(doc.processing_status, ProcessingStatus::Processing);
        assert!(!doc.processing_status.is_terminal());
    }

    #[test]
    fn classify_derives_priority_from_document_type() {
        let mut doc = Document::new(ContentHash::of(b"bytes"), "bulletin.pdf", 10, now());
        doc.classify(DocumentType::Bulletin, ManufacturerId::new(), now());
        assert_eq!(doc.priority, Some(Priority::ServiceBulletin));
    }
}
