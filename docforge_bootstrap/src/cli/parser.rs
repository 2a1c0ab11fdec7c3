// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap. This module defines the CLI
//! structure and handles argument parsing; security validation happens in
//! [`super::validator`] after parsing.
//!
//! Argument types here stay generic (`String`/`PathBuf`) rather than domain
//! types (`StageName`, `DocumentId`, ...) - this crate does not depend on
//! `docforge_domain`, so translating a raw string into a typed value object
//! happens in the composition root after `parse_and_validate` returns.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI structure.
#[derive(Parser, Debug, Clone)]
#[command(name = "docforge")]
#[command(about = concat!("DocForge document ingestion and enrichment pipeline v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging below error level
    #[arg(short, long)]
    pub quiet: bool,

    /// Configuration file path (TOML), layered under environment variables
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Pipeline run mode for `ingest` (§4.F).
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Run every stage, including ones already completed.
    Full,
    /// Run only pending/failed stages whose dependencies are satisfied.
    Smart,
}

/// CLI subcommands (§AS.5).
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Ingest a PDF: upload it (skipped if its content hash is already known) then run the pipeline.
    Ingest {
        /// PDF file to ingest
        path: PathBuf,

        /// Run mode: `full` re-runs every stage, `smart` resumes only what's pending/failed
        #[arg(long, value_enum, default_value = "full")]
        mode: PipelineMode,
    },

    /// Resume a document's pending/failed stages without re-uploading.
    Resume {
        /// Document identifier (UUID)
        document_id: String,

        /// Blob storage key recorded at ingest time
        file_reference: String,
    },

    /// Run one stage for a document.
    RunStage {
        /// Document identifier (UUID)
        document_id: String,

        /// Stage name, e.g. `text-extraction`
        stage: String,

        /// Blob storage key recorded at ingest time
        file_reference: String,

        /// Run even if the stage's prerequisites are not yet satisfied
        #[arg(long)]
        force: bool,
    },

    /// Run multiple stages for a document in dependency order.
    RunStages {
        /// Document identifier (UUID)
        document_id: String,

        /// Comma-separated stage names
        #[arg(long, value_delimiter = ',')]
        stages: Vec<String>,

        /// Blob storage key recorded at ingest time
        file_reference: String,

        /// Run even if prerequisites are not yet satisfied
        #[arg(long)]
        force: bool,

        /// Stop at the first stage failure instead of continuing to the rest
        #[arg(long)]
        stop_on_error: bool,
    },

    /// Apply or roll back a batch mutation (§4.H).
    Batch {
        #[command(subcommand)]
        action: BatchAction,
    },

    /// Report queue depth for a background task type (§4.G).
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Run pending database migrations and exit.
    Migrate,
}

#[derive(Subcommand, Debug, Clone)]
pub enum BatchAction {
    /// Apply a mutation to a set of records.
    Apply {
        /// Resource to mutate: `documents` or `error-codes`
        resource: String,

        /// Operation: `delete`, `set-field`, or `set-status`
        operation: String,

        /// Comma-separated record UUIDs to mutate
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,

        /// Column name for `set-field` (ignored otherwise)
        #[arg(long)]
        column: Option<String>,

        /// JSON-encoded value for `set-field`/`set-status` (ignored for `delete`)
        #[arg(long)]
        value: Option<String>,

        /// Roll back the whole batch on the first per-record failure
        #[arg(long)]
        rollback_on_error: bool,

        /// Identity recorded in the audit log for this mutation
        #[arg(long)]
        actor: String,
    },

    /// Undo a previously applied batch task from its audit log.
    Rollback {
        /// Batch task identifier (UUID)
        batch_task_id: String,

        /// Resource the batch task mutated: `documents` or `error-codes`
        resource: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum QueueAction {
    /// Report pending/processing/failed counts for one task type.
    Status {
        /// Task type: e.g. `batch_task`, `stage_retry`
        #[arg(long)]
        task_type: String,
    },
}

/// Parse CLI arguments. Clap exits the process on `--help`/`--version` or a
/// parse failure.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
