// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Structured logging setup built on `tracing` + `tracing-subscriber`.
//!
//! Every stage execution is wrapped in an
//! [`tracing::info_span!`] carrying `document_id`, `stage`, and
//! `correlation_id` so a single `grep` on any of the three reconstructs the
//! full causal chain for one document's run, matching the event shapes in
//! `docforge_domain::events::PipelineEvent`.

use tracing_subscriber::{fmt, EnvFilter};

/// Output format for the process's logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for local development.
    Pretty,
    /// Newline-delimited JSON, for production log aggregation.
    Json,
}

/// Installs the global `tracing` subscriber. `RUST_LOG` (or `DOCFORGE_LOG` if
/// set) controls verbosity per the usual `EnvFilter` directive syntax;
/// defaults to `info` when neither is set.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_env("DOCFORGE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt().with_env_filter(filter).with_target(true);

    match format {
        LogFormat::Pretty => subscriber.pretty().init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

/// Builds the per-stage-execution tracing span. Entering this span around a
/// `StageProcessor::process` call is what lets `StageStarted`/
/// `StageCompleted`/`StageFailed` log lines share a `correlation_id` with the
/// [`docforge_domain::events::PipelineEvent`] broadcast on the same
/// execution.
#[macro_export]
macro_rules! stage_span {
    ($document_id:expr, $stage:expr, $correlation_id:expr) => {
        tracing::info_span!(
            "stage_execution",
            document_id = %$document_id,
            stage = %$stage,
            correlation_id = %$correlation_id,
        )
    };
}
