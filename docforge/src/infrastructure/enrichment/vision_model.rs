// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `VisionModel` adapter (§6): sends image bytes (base64-encoded, since the
//! wire format is JSON) to a configured vision service for captioning and
//! error-code extraction.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use docforge_domain::repositories::{DescribeResult, EnrichmentError, ErrorCodeCandidate, VisionModel};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct DescribeRequest<'a> {
    image_base64: String,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct DescribeResponse {
    text: String,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

#[derive(Serialize)]
struct ErrorCodeRequest {
    image_base64: String,
}

#[derive(Deserialize)]
struct ErrorCodeResponse {
    #[serde(default)]
    candidates: Vec<ErrorCodeCandidateWire>,
}

#[derive(Deserialize)]
struct ErrorCodeCandidateWire {
    code: String,
    description: String,
    solution: String,
    #[serde(default = "default_confidence")]
    confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

pub struct HttpVisionModel {
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl HttpVisionModel {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    fn require_endpoint(&self) -> Result<&str, EnrichmentError> {
        self.endpoint
            .as_deref()
            .ok_or_else(|| EnrichmentError::Upstream("no vision model endpoint configured".into()))
    }

    fn map_send_error(e: reqwest::Error) -> EnrichmentError {
        if e.is_timeout() {
            EnrichmentError::Timeout
        } else {
            EnrichmentError::Upstream(e.to_string())
        }
    }
}

#[async_trait]
impl VisionModel for HttpVisionModel {
    async fn describe(&self, image_bytes: &[u8], prompt: &str) -> Result<DescribeResult, EnrichmentError> {
        let endpoint = self.require_endpoint()?;
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_bytes);

        let response = self
            .client
            .post(format!("{endpoint}/describe"))
            .timeout(DEFAULT_TIMEOUT)
            .json(&DescribeRequest { image_base64, prompt })
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            return Err(EnrichmentError::Upstream(format!("vision model returned {}", response.status())));
        }

        let body: DescribeResponse = response.json().await.map_err(|e| EnrichmentError::Upstream(e.to_string()))?;
        Ok(DescribeResult {
            text: body.text,
            confidence: body.confidence,
        })
    }

    async fn extract_error_codes(&self, image_bytes: &[u8]) -> Result<Vec<ErrorCodeCandidate>, EnrichmentError> {
        let endpoint = self.require_endpoint()?;
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_bytes);

        let response = self
            .client
            .post(format!("{endpoint}/error-codes"))
            .timeout(DEFAULT_TIMEOUT)
            .json(&ErrorCodeRequest { image_base64 })
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            return Err(EnrichmentError::Upstream(format!("vision model returned {}", response.status())));
        }

        let body: ErrorCodeResponse = response.json().await.map_err(|e| EnrichmentError::Upstream(e.to_string()))?;
        Ok(body
            .candidates
            .into_iter()
            .map(|c| ErrorCodeCandidate {
                code: c.code,
                description: c.description,
                solution: c.solution,
                confidence: c.confidence,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_endpoint_yields_upstream_error() {
        let model = HttpVisionModel::new(None);
        let err = model.describe(b"\x89PNG", "describe this").await.unwrap_err();
        assert!(matches!(err, EnrichmentError::Upstream(_)));
    }
}
