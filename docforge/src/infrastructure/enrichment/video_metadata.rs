// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `VideoMetadataService` adapter (§6): resolves a platform video URL to
//! title/duration/thumbnail metadata via a configured lookup service
//! (e.g. a YouTube/Vimeo metadata proxy).

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use docforge_domain::repositories::{EnrichmentError, VideoMetadataService};
use docforge_domain::repositories::VideoMetadata as PortVideoMetadata;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct VideoMetadataResponse {
    platform: String,
    platform_video_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    duration_s: Option<u32>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    channel_title: Option<String>,
}

pub struct HttpVideoMetadataService {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl HttpVideoMetadataService {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl VideoMetadataService for HttpVideoMetadataService {
    async fn enrich(&self, url: &str) -> Result<PortVideoMetadata, EnrichmentError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(EnrichmentError::Upstream("no video metadata endpoint configured".into()));
        };

        let response = self
            .client
            .get(endpoint)
            .timeout(DEFAULT_TIMEOUT)
            .query(&[("url", url)])
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
            return Err(EnrichmentError::Upstream(format!("video metadata service returned {}", response.status())));
        }

        let body: VideoMetadataResponse = response.json().await.map_err(|e| EnrichmentError::Upstream(e.to_string()))?;

        Ok(PortVideoMetadata {
            platform: body.platform,
            platform_video_id: body.platform_video_id,
            title: body.title,
            duration_s: body.duration_s,
            thumbnail_url: body.thumbnail_url,
            channel_title: body.channel_title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_endpoint_yields_upstream_error() {
        let service = HttpVideoMetadataService::new(None);
        let err = service.enrich("https://youtube.com/watch?v=abc123").await.unwrap_err();
        assert!(matches!(err, EnrichmentError::Upstream(_)));
    }
}
