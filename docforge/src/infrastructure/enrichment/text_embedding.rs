// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `TextEmbeddingModel` adapter (§6): posts chunk text to a configured
//! embedding service and returns the vector, along with the fixed model
//! name/dimension callers stamp onto the embedding row.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use docforge_domain::repositories::{EnrichmentError, TextEmbeddingModel};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    vector: Vec<f32>,
}

pub struct HttpTextEmbeddingModel {
    endpoint: Option<String>,
    model_name: String,
    dimension: u32,
    client: reqwest::Client,
}

impl HttpTextEmbeddingModel {
    pub fn new(endpoint: Option<String>, model_name: impl Into<String>, dimension: u32) -> Self {
        Self {
            endpoint,
            model_name: model_name.into(),
            dimension,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TextEmbeddingModel for HttpTextEmbeddingModel {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EnrichmentError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Err(EnrichmentError::Upstream("no embedding model endpoint configured".into()));
        };

        let response = self
            .client
            .post(endpoint)
            .timeout(DEFAULT_TIMEOUT)
            .json(&EmbedRequest { text })
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
            return Err(EnrichmentError::Upstream(format!("embedding model returned {}", response.status())));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| EnrichmentError::Upstream(e.to_string()))?;

        if body.vector.len() as u32 != self.dimension {
            return Err(EnrichmentError::Upstream(format!(
                "embedding model returned {} dims, expected {}",
                body.vector.len(),
                self.dimension
            )));
        }

        Ok(body.vector)
    }

    fn dimension(&self) -> u32 {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_endpoint_yields_upstream_error() {
        let model = HttpTextEmbeddingModel::new(None, "text-embed-3", 1536);
        let err = model.embed("hello world").await.unwrap_err();
        assert!(matches!(err, EnrichmentError::Upstream(_)));
        assert_eq!(model.dimension(), 1536);
        assert_eq!(model.model_name(), "text-embed-3");
    }
}
