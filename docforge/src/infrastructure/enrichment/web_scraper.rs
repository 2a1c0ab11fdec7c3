// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `WebScraper` adapter (§6): posts a URL (and optional extraction schema)
//! to a configured scraping service and relays its structured response.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use docforge_domain::repositories::{EnrichmentError, ScrapeResult, WebScraper};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a serde_json::Value>,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    text: String,
    markdown: String,
    #[serde(default)]
    structured: Option<serde_json::Value>,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

pub struct HttpWebScraper {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl HttpWebScraper {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl WebScraper for HttpWebScraper {
    async fn scrape(&self, url: &str, schema: Option<&serde_json::Value>) -> Result<ScrapeResult, EnrichmentError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(EnrichmentError::Upstream("no web scraper endpoint configured".into()));
        };

        let response = self
            .client
            .post(endpoint)
            .timeout(DEFAULT_TIMEOUT)
            .json(&ScrapeRequest { url, schema })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EnrichmentError::Timeout
                } else {
                    EnrichmentError::Upstream(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(EnrichmentError::Upstream(format!("scraper returned {}", response.status())));
        }

        let body: ScrapeResponse = response.json().await.map_err(|e| EnrichmentError::Upstream(e.to_string()))?;

        Ok(ScrapeResult {
            text: body.text,
            markdown: body.markdown,
            structured: body.structured,
            confidence: body.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_endpoint_yields_upstream_error() {
        let scraper = HttpWebScraper::new(None);
        let err = scraper.scrape("https://example.com", None).await.unwrap_err();
        assert!(matches!(err, EnrichmentError::Upstream(_)));
    }
}
