// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DocForge Domain
//!
//! Pure domain layer for the document ingestion and enrichment engine:
//! entities, value objects, domain errors, and the repository/service port
//! traits that the infrastructure layer implements. No SQL, no HTTP client,
//! no filesystem access lives here - only business rules and the
//! interfaces concrete adapters must satisfy.
//!
//! ## Modules
//!
//! - [`value_objects`] - typed ids, content hashes, fingerprints, stage
//!   names and their dependency graph.
//! - [`entities`] - `Document`, `StageStatus`, `ContentChunk`,
//!   `IntelligenceChunk`, `Image`, `Embedding`, `ErrorCode`, `Link`/`Video`,
//!   `QueueTask`, `ErrorRecord`.
//! - [`services`] - the processor contract, the retry policy, and the
//!   stage dependency graph queries.
//! - [`repositories`] - ports: persistence gateway, stage status store,
//!   processing queue, blob store, enrichment collaborators.
//! - [`events`] - the observability event shapes emitted by the executor.
//! - [`error`] - [`error::DomainError`] and its retry-taxonomy
//!   classification.

pub mod entities;
pub mod error;
pub mod events;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use error::{DomainError, ErrorKind};
