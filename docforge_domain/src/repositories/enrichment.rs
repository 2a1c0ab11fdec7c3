// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! External enrichment collaborator ports (§6). All optional - absence must
//! downgrade gracefully, never fail a stage outright.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EnrichmentError {
    #[error("enrichment collaborator timed out")]
    Timeout,
    #[error("enrichment collaborator returned an error: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone)]
pub struct ScrapeResult {
    pub text: String,
    pub markdown: String,
    pub structured: Option<serde_json::Value>,
    pub confidence: f32,
}

#[async_trait]
pub trait WebScraper: Send + Sync {
    /// Timeout 30s default; 300s for crawl jobs (§6).
    async fn scrape(&self, url: &str, schema: Option<&serde_json::Value>) -> Result<ScrapeResult, EnrichmentError>;
}

#[derive(Debug, Clone)]
pub struct DescribeResult {
    pub text: String,
    pub confidence: f32,
}

#[derive(Debug, Clone)]
pub struct ErrorCodeCandidate {
    pub code: String,
    pub description: String,
    pub solution: String,
    pub confidence: f32,
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Per-call timeout 60s (§6).
    async fn describe(&self, image_bytes: &[u8], prompt: &str) -> Result<DescribeResult, EnrichmentError>;
    async fn extract_error_codes(&self, image_bytes: &[u8]) -> Result<Vec<ErrorCodeCandidate>, EnrichmentError>;
}

#[async_trait]
pub trait TextEmbeddingModel: Send + Sync {
    /// Dimension is model-fixed and stored on the embedding row (§6).
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EnrichmentError>;
    fn dimension(&self) -> u32;
    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub platform: String,
    pub platform_video_id: String,
    pub title: Option<String>,
    pub duration_s: Option<u32>,
    pub thumbnail_url: Option<String>,
    pub channel_title: Option<String>,
}

#[async_trait]
pub trait VideoMetadataService: Send + Sync {
    async fn enrich(&self, url: &str) -> Result<VideoMetadata, EnrichmentError>;
}
