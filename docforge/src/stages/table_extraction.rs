// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `table_extraction` (§4.E): detects tabular runs within each page's text
//! (produced by `text_extraction`, read from `prior_results_by_stage`
//! rather than re-parsing the PDF) and emits one `StructuredTable` row per
//! detected table. Idempotency anchor: `(document_id, page,
//! index_on_page)`.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map};

use docforge_domain::entities::{ProcessingContext, StructuredTable};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::PersistenceGateway;
use docforge_domain::services::{ProcessingResult, StageProcessor};
use docforge_domain::value_objects::StageName;

/// Two or more runs of at least two spaces, the column-separator signature
/// most PDF table extractors agree on in the absence of a real layout
/// model.
fn column_separator() -> Regex {
    Regex::new(r" {2,}").expect("static column-separator pattern is valid")
}

pub struct TableExtractionProcessor {
    gateway: Arc<dyn PersistenceGateway>,
}

impl TableExtractionProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl StageProcessor for TableExtractionProcessor {
    fn stage_name(&self) -> StageName {
        StageName::TableExtraction
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let Some(text_output) = ctx.prior_results_by_stage.get(&StageName::TextExtraction) else {
            return ProcessingResult::failure(ErrorKind::Permanent, "text_extraction output not available");
        };
        let Some(pages) = text_output.get("pages").and_then(|v| v.as_array()) else {
            return ProcessingResult::failure(ErrorKind::Permanent, "text_extraction metadata missing pages");
        };

        let separator = column_separator();
        let mut tables = Vec::new();

        for (page_idx, page_value) in pages.iter().enumerate() {
            let page_text = page_value.as_str().unwrap_or_default();
            let page_number = (page_idx + 1) as u32;
            tables.extend(detect_tables_on_page(&separator, ctx.document_id, page_number, page_text));
        }

        if let Err(e) = self.gateway.insert_structured_tables(tables.clone()).await {
            return ProcessingResult::failure(ErrorKind::Transient, format!("persisting tables: {e}"));
        }

        let mut data = Map::new();
        data.insert("table_count".to_string(), json!(tables.len()));
        ProcessingResult::success(data, Map::new())
    }
}

fn detect_tables_on_page(separator: &Regex, document_id: docforge_domain::value_objects::DocumentId, page: u32, text: &str) -> Vec<StructuredTable> {
    let lines: Vec<&str> = text.lines().collect();
    let mut tables = Vec::new();
    let mut run_start: Option<usize> = None;
    let mut index_on_page = 0u32;

    let mut i = 0;
    while i <= lines.len() {
        let is_tabular = i < lines.len() && separator.is_match(lines[i]) && !lines[i].trim().is_empty();
        match (is_tabular, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) if i - start >= 2 => {
                let caption = start.checked_sub(1).and_then(|idx| lines.get(idx)).filter(|l| !l.trim().is_empty()).map(|l| l.trim().to_string());
                let rows: Vec<Vec<String>> = lines[start..i].iter().map(|line| separator.split(line.trim()).map(|cell| cell.trim().to_string()).collect()).collect();
                let markdown = render_markdown(&rows);
                tables.push(StructuredTable {
                    document_id,
                    page,
                    index_on_page,
                    data_rows: json!(rows),
                    markdown_rendering: markdown,
                    caption,
                    surrounding_context: lines.get(i).map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
                });
                index_on_page += 1;
                run_start = None;
            }
            (false, Some(_)) => run_start = None,
            _ => {}
        }
        i += 1;
    }

    tables
}

fn render_markdown(rows: &[Vec<String>]) -> String {
    let Some(header) = rows.first() else { return String::new() };
    let mut out = format!("| {} |\n", header.join(" | "));
    out.push_str(&format!("|{}|\n", "---|".repeat(header.len())));
    for row in rows.iter().skip(1) {
        out.push_str(&format!("| {} |\n", row.join(" | ")));
    }
    out
}
