// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `classification` (§4.E): sets `document_type` and `manufacturer_id` on
//! the `Document`; `Document::classify` derives `priority` from the type.
//! Manufacturer identity is resolved deterministically
//! (`stages::support::manufacturer_id_for`) rather than through a lookup
//! table the domain does not expose (§9 Open Questions).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map};

use docforge_domain::entities::{DocumentType, ProcessingContext};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::PersistenceGateway;
use docforge_domain::services::{ProcessingResult, StageProcessor};
use docforge_domain::value_objects::StageName;

use crate::stages::support::{detect_manufacturer_name, manufacturer_id_for};

pub struct ClassificationProcessor {
    gateway: Arc<dyn PersistenceGateway>,
}

impl ClassificationProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl StageProcessor for ClassificationProcessor {
    fn stage_name(&self) -> StageName {
        StageName::Classification
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let text = self.document_text(&ctx);

        let document_type = classify_document_type(&text);
        let manufacturer_name = detect_manufacturer_name(&text);
        let manufacturer_id = manufacturer_id_for(manufacturer_name);

        let mut document = match self.gateway.get_document(ctx.document_id).await {
            Ok(Some(document)) => document,
            Ok(None) => return ProcessingResult::failure(ErrorKind::Permanent, "document row missing at classification stage"),
            Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("loading document: {e}")),
        };

        document.classify(document_type, manufacturer_id, Utc::now());

        if let Err(e) = self.gateway.save_document(&document).await {
            return ProcessingResult::failure(ErrorKind::Transient, format!("saving document: {e}"));
        }

        let mut data = Map::new();
        data.insert("document_type".to_string(), json!(document.document_type));
        data.insert("manufacturer".to_string(), json!(manufacturer_name));
        data.insert("priority".to_string(), json!(document.priority));
        ProcessingResult::success(data, Map::new())
    }
}

impl ClassificationProcessor {
    fn document_text(&self, ctx: &ProcessingContext) -> String {
        ctx.prior_results_by_stage
            .get(&StageName::TextExtraction)
            .and_then(|v| v.get("pages"))
            .and_then(|v| v.as_array())
            .map(|pages| pages.iter().filter_map(|p| p.as_str()).collect::<Vec<_>>().join("\n"))
            .unwrap_or_default()
    }
}

fn classify_document_type(text: &str) -> DocumentType {
    let lower = text.to_lowercase();
    if lower.contains("parts catalog") || lower.contains("parts list") {
        DocumentType::PartsCatalog
    } else if lower.contains("customer product maintenance") || lower.contains("cpmd") {
        DocumentType::Cpmd
    } else if lower.contains("service bulletin") || lower.contains("technical bulletin") {
        DocumentType::Bulletin
    } else if lower.contains("service manual") || lower.contains("repair manual") {
        DocumentType::ServiceManual
    } else {
        DocumentType::Other
    }
}
