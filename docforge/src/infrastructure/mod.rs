// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Adapters for every port the domain crate declares: Postgres persistence,
//! filesystem blob storage, HTTP enrichment collaborators, plus the
//! cross-cutting config/logging/metrics surfaces the runtime and bootstrap
//! layers build on.

pub mod blob_store;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod logging;
pub mod metrics;
pub mod runtime;
