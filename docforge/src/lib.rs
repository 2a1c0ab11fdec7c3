// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DocForge
//!
//! Application and infrastructure layer for the document ingestion and
//! enrichment engine. This crate wires [`docforge_domain`]'s ports to
//! concrete adapters and drives the staged, idempotent, resumable pipeline
//! that turns a raw PDF into searchable, cross-linked product intelligence.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ application/   use cases, batch orchestration           │
//! ├────────────────────────────────────────────────────────┤
//! │ stages/        one StageProcessor per pipeline stage     │
//! ├────────────────────────────────────────────────────────┤
//! │ infrastructure/ Postgres, blob store, HTTP enrichment,   │
//! │                 config, logging, metrics, runtime        │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! `docforge_domain` stays free of any of these concerns; everything here
//! implements one of its port traits or consumes them.

pub mod application;
pub mod infrastructure;
pub mod stages;

pub use docforge_domain as domain;
