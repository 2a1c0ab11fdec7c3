// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `link_extraction` (§4.E): scans the text produced by `text_extraction`
//! for URLs and contact references, categorizes each, and upserts a
//! `Video` row for recognized video-platform hosts.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map};
use url::Url;

use docforge_domain::entities::{Link, LinkCategory, ProcessingContext};
use docforge_domain::error::ErrorKind;
use docforge_domain::repositories::PersistenceGateway;
use docforge_domain::services::{ProcessingResult, StageProcessor};
use docforge_domain::value_objects::StageName;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s)>\]]+").expect("static URL pattern is valid"));
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").expect("static email pattern is valid"));
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\d[\d\-\.\s]{7,}\d").expect("static phone pattern is valid"));

const DOWNLOAD_EXTENSIONS: &[&str] = &[".pdf", ".zip", ".exe", ".dmg", ".msi", ".tar.gz"];

pub struct LinkExtractionProcessor {
    gateway: Arc<dyn PersistenceGateway>,
}

impl LinkExtractionProcessor {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl StageProcessor for LinkExtractionProcessor {
    fn stage_name(&self) -> StageName {
        StageName::LinkExtraction
    }

    async fn process(&self, ctx: ProcessingContext) -> ProcessingResult {
        let Some(text_output) = ctx.prior_results_by_stage.get(&StageName::TextExtraction) else {
            return ProcessingResult::failure(ErrorKind::Permanent, "text_extraction output not available");
        };
        let Some(pages) = text_output.get("pages").and_then(|v| v.as_array()) else {
            return ProcessingResult::failure(ErrorKind::Permanent, "text_extraction metadata missing pages");
        };

        let whole_text: String = pages.iter().filter_map(|p| p.as_str()).collect::<Vec<_>>().join("\n");

        let mut links = Vec::new();
        for url_match in URL_PATTERN.find_iter(&whole_text) {
            links.push(categorize_url(ctx.document_id, url_match.as_str()));
        }
        for email_match in EMAIL_PATTERN.find_iter(&whole_text) {
            links.push(Link::new(ctx.document_id, format!("mailto:{}", email_match.as_str()), LinkCategory::Email, 1.0));
        }
        for phone_match in PHONE_PATTERN.find_iter(&whole_text) {
            let digits: String = phone_match.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.len() >= 8 {
                links.push(Link::new(ctx.document_id, phone_match.as_str().trim().to_string(), LinkCategory::Phone, 0.7));
            }
        }

        let mut video_links = 0u32;
        for link in links.iter_mut() {
            if link.category != LinkCategory::Video {
                continue;
            }
            let Some((platform, video_id)) = video_identity(&link.url) else { continue };
            match self.gateway.find_or_create_video(&platform, &video_id).await {
                Ok(video) => {
                    link.video_id = Some(video.id);
                    video_links += 1;
                }
                Err(e) => return ProcessingResult::failure(ErrorKind::Transient, format!("upserting video: {e}")),
            }
        }

        let link_count = links.len();
        if let Err(e) = self.gateway.insert_links(links).await {
            return ProcessingResult::failure(ErrorKind::Transient, format!("persisting links: {e}"));
        }

        let mut data = Map::new();
        data.insert("link_count".to_string(), json!(link_count));
        data.insert("video_links".to_string(), json!(video_links));
        ProcessingResult::success(data, Map::new())
    }
}

fn categorize_url(document_id: docforge_domain::value_objects::DocumentId, raw_url: &str) -> Link {
    let trimmed = raw_url.trim_end_matches(|c: char| ".,;:)".contains(c));

    if let Some((_, _)) = video_identity(trimmed) {
        return Link::new(document_id, trimmed, LinkCategory::Video, 0.9);
    }

    let lower = trimmed.to_lowercase();
    if DOWNLOAD_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Link::new(document_id, trimmed, LinkCategory::Download, 0.85);
    }
    if lower.contains("support") {
        return Link::new(document_id, trimmed, LinkCategory::Support, 0.6);
    }
    if lower.contains("tutorial") || lower.contains("how-to") || lower.contains("howto") {
        return Link::new(document_id, trimmed, LinkCategory::Tutorial, 0.6);
    }
    Link::new(document_id, trimmed, LinkCategory::External, 0.5)
}

/// Recognizes YouTube and Vimeo hosts and extracts the platform-native
/// video id (§4.E: "detects platform from URL host; extracts the
/// platform's video id").
fn video_identity(raw_url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(raw_url).ok()?;
    let host = parsed.host_str()?;

    if host.ends_with("youtube.com") {
        let id = parsed.query_pairs().find(|(k, _)| k == "v").map(|(_, v)| v.to_string())?;
        return Some(("youtube".to_string(), id));
    }
    if host.ends_with("youtu.be") {
        let id = parsed.path_segments()?.next()?.to_string();
        if id.is_empty() {
            return None;
        }
        return Some(("youtube".to_string(), id));
    }
    if host.ends_with("vimeo.com") {
        let id = parsed.path_segments()?.next()?.to_string();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        return Some(("vimeo".to_string(), id));
    }
    None
}
