// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure configuration: the single canonical surface every adapter
//! and use case reads its settings from. Loaded by layering defaults, an
//! optional TOML file, then `DOCFORGE_`-prefixed environment variables, so a
//! deployment can override exactly the fields it needs without a full file.
//!
//! All enrichment-collaborator endpoints are `Option<String>` - absence
//! downgrades the corresponding stage gracefully rather than failing the
//! pipeline (see the enrichment ports in `docforge_domain::repositories`).

use serde::Deserialize;

/// Database connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_min_connections() -> u32 {
    2
}
fn default_max_connections() -> u32 {
    10
}

/// Retry and backoff parameters consumed by `docforge_domain::services::RetryPolicy`.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_rate_limit_floor_delay_ms")]
    pub rate_limit_floor_delay_ms: u64,
}

fn default_base_delay_ms() -> u64 {
    1_000
}
fn default_max_attempts() -> u32 {
    3
}
fn default_rate_limit_floor_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_attempts: default_max_attempts(),
            rate_limit_floor_delay_ms: default_rate_limit_floor_delay_ms(),
        }
    }
}

/// Processing queue visibility timeout and batch sync/async split threshold.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_visibility_timeout_s")]
    pub visibility_timeout_s: u64,
    #[serde(default = "default_batch_sync_threshold")]
    pub batch_sync_threshold: usize,
}

fn default_visibility_timeout_s() -> u64 {
    600
}
fn default_batch_sync_threshold() -> usize {
    50
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            visibility_timeout_s: default_visibility_timeout_s(),
            batch_sync_threshold: default_batch_sync_threshold(),
        }
    }
}

/// Blob store location for content-addressed images and extraction
/// artifacts.
#[derive(Debug, Clone, Deserialize)]
pub struct BlobStoreConfig {
    pub root: String,
}

/// Optional endpoints for the four enrichment collaborators. A missing
/// endpoint means the corresponding stage degrades instead of failing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrichmentConfig {
    pub web_scraper_url: Option<String>,
    pub vision_model_url: Option<String>,
    pub embedding_model_url: Option<String>,
    pub video_metadata_url: Option<String>,
}

/// Root application configuration assembled by [`load`].
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    pub blob_store: BlobStoreConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default = "default_max_concurrent_documents")]
    pub max_concurrent_documents: usize,
    #[serde(default = "default_visual_embedding_cap")]
    pub visual_embedding_cap: usize,
    #[serde(default = "default_visual_embedding_inter_call_delay_ms")]
    pub visual_embedding_inter_call_delay_ms: u64,
}

fn default_max_concurrent_documents() -> usize {
    4
}
fn default_visual_embedding_cap() -> usize {
    5
}
fn default_visual_embedding_inter_call_delay_ms() -> u64 {
    250
}

/// Loads configuration by layering, in increasing precedence: built-in
/// defaults, an optional TOML file at `path`, then `DOCFORGE_`-prefixed
/// environment variables (double underscore as the nesting separator, e.g.
/// `DOCFORGE_DATABASE__URL`).
pub fn load(path: Option<&str>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder()
        .set_default("max_concurrent_documents", 4i64)?
        .set_default("visual_embedding_cap", 5i64)?
        .set_default("visual_embedding_inter_call_delay_ms", 250i64)?
        .set_default("retry.base_delay_ms", 1_000i64)?
        .set_default("retry.max_attempts", 3i64)?
        .set_default("retry.rate_limit_floor_delay_ms", 30_000i64)?
        .set_default("queue.visibility_timeout_s", 600i64)?
        .set_default("queue.batch_sync_threshold", 50i64)?
        .set_default("database.min_connections", 2i64)?
        .set_default("database.max_connections", 10i64)?;

    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path).required(false));
    }

    let raw = builder
        .add_source(
            config::Environment::with_prefix("DOCFORGE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    raw.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults_from_environment_only() {
        std::env::set_var("DOCFORGE_DATABASE__URL", "postgres://localhost/docforge_test");
        std::env::set_var("DOCFORGE_BLOB_STORE__ROOT", "/tmp/docforge-blobs");

        let cfg = load(None).expect("config should load from env alone");
        assert_eq!(cfg.database.min_connections, 2);
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.visual_embedding_cap, 5);
        assert!(cfg.enrichment.vision_model_url.is_none());

        std::env::remove_var("DOCFORGE_DATABASE__URL");
        std::env::remove_var("DOCFORGE_BLOB_STORE__ROOT");
    }

    #[test]
    fn environment_overrides_defaults() {
        std::env::set_var("DOCFORGE_DATABASE__URL", "postgres://localhost/docforge_test2");
        std::env::set_var("DOCFORGE_BLOB_STORE__ROOT", "/tmp/docforge-blobs2");
        std::env::set_var("DOCFORGE_RETRY__MAX_ATTEMPTS", "7");

        let cfg = load(None).expect("config should load");
        assert_eq!(cfg.retry.max_attempts, 7);

        std::env::remove_var("DOCFORGE_DATABASE__URL");
        std::env::remove_var("DOCFORGE_BLOB_STORE__ROOT");
        std::env::remove_var("DOCFORGE_RETRY__MAX_ATTEMPTS");
    }
}
