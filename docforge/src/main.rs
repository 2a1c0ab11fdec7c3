// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # DocForge CLI
//!
//! Composition root: parses and validates the CLI via `docforge_bootstrap`,
//! loads [`docforge::infrastructure::config::AppConfig`], connects and
//! migrates Postgres, wires [`RuntimeServices`], then dispatches to the one
//! use case the chosen subcommand names. Races the chosen work against the
//! platform's shutdown signal so a SIGTERM/SIGINT during a long batch or
//! ingest run exits promptly instead of being silently dropped.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as Json;
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use docforge::application::services::RuntimeServices;
use docforge::application::use_cases::{BatchUseCase, BatchUseCaseInput, DispatchUseCase, IngestUseCase, QueueStatusUseCase, ResumeUseCase};
use docforge::infrastructure::config;
use docforge::infrastructure::db::schema::connect_and_migrate;
use docforge::infrastructure::runtime::{BatchMutation, BatchResource, RunMode};
use docforge_bootstrap::cli::{PipelineMode, ValidatedCommand};
use docforge_bootstrap::config::LogLevel;
use docforge_bootstrap::signals::create_signal_handler;
use docforge_bootstrap::{bootstrap_cli, ExitCode as DocForgeExitCode, ValidatedCli};

use docforge_domain::error::DomainError;
use docforge_domain::value_objects::{CorrelationId, DocumentId, StageName};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("docforge: {e}");
            return ExitCode::from(DocForgeExitCode::UsageError.as_i32() as u8);
        }
    };

    install_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(DocForgeExitCode::from_error(&*e).as_i32() as u8)
        }
    }
}

fn install_tracing(cli: &ValidatedCli) {
    let level = LogLevel::from_verbosity(cli.verbose, cli.quiet).to_tracing_level();
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

async fn run(cli: ValidatedCli) -> anyhow::Result<()> {
    let app_config = config::load(cli.config.as_deref().and_then(|p| p.to_str()))?;

    let pool = connect_and_migrate(&app_config.database.url, app_config.database.min_connections, app_config.database.max_connections).await?;

    if matches!(cli.command, ValidatedCommand::Migrate) {
        tracing::info!("migrations applied, exiting");
        return Ok(());
    }

    let services = Arc::new(RuntimeServices::build(&app_config, pool)?);

    let signals = create_signal_handler();
    let work = dispatch(services, cli.command);

    tokio::select! {
        result = work => result,
        () = signals.wait_for_signal(Box::new(|| {})) => {
            anyhow::bail!("interrupted by shutdown signal");
        }
    }
}

async fn dispatch(services: Arc<RuntimeServices>, command: ValidatedCommand) -> anyhow::Result<()> {
    match command {
        ValidatedCommand::Migrate => unreachable!("handled in run() before services are built"),

        ValidatedCommand::Ingest { path, mode } => {
            let mode = match mode {
                PipelineMode::Full => RunMode::Full,
                PipelineMode::Smart => RunMode::Smart,
            };
            let outcome = IngestUseCase::new(services).execute(&path, mode).await?;
            println!(
                "document {} ({}): completed={} failed={} blocked={}",
                outcome.document_id,
                if outcome.was_new { "new" } else { "existing" },
                outcome.run.completed.len(),
                outcome.run.failed.len(),
                outcome.run.blocked.len(),
            );
            Ok(())
        }

        ValidatedCommand::Resume { document_id, file_reference } => {
            let document_id = parse_document_id(&document_id)?;
            let run = ResumeUseCase::new(services).execute(document_id, &file_reference).await?;
            println!("completed={} failed={} blocked={}", run.completed.len(), run.failed.len(), run.blocked.len());
            Ok(())
        }

        ValidatedCommand::RunStage { document_id, stage, file_reference, force } => {
            let document_id = parse_document_id(&document_id)?;
            let stage = parse_stage(&stage)?;
            let outcome = DispatchUseCase::new(services).run_stage(document_id, stage, &file_reference, force).await?;
            report_dispatch_outcome(outcome)
        }

        ValidatedCommand::RunStages { document_id, stages, file_reference, force, stop_on_error } => {
            let document_id = parse_document_id(&document_id)?;
            let stages = stages.iter().map(|s| parse_stage(s)).collect::<anyhow::Result<Vec<_>>>()?;
            let outcome = DispatchUseCase::new(services).run_stages(document_id, stages, &file_reference, force, stop_on_error).await?;
            report_dispatch_outcome(outcome)
        }

        ValidatedCommand::BatchApply { resource, operation, ids, column, value, rollback_on_error, actor } => {
            let resource = parse_batch_resource(&resource)?;
            let mutation = parse_batch_mutation(&operation, column, value)?;
            let record_ids = ids.iter().map(|id| parse_uuid(id)).collect::<anyhow::Result<Vec<_>>>()?;

            let input = BatchUseCaseInput {
                resource,
                record_ids,
                mutation,
                rollback_on_error,
                actor_id: actor,
                correlation_id: CorrelationId::generate(Utc::now().timestamp_millis()),
            };
            let outcome = BatchUseCase::new(services).execute(input).await?;
            report_batch_outcome(outcome);
            Ok(())
        }

        ValidatedCommand::BatchRollback { batch_task_id, resource } => {
            let batch_task_id = parse_uuid(&batch_task_id)?;
            let resource = parse_batch_resource(&resource)?;
            let outcome = BatchUseCase::new(services).rollback(batch_task_id, resource).await?;
            report_batch_outcome(outcome);
            Ok(())
        }

        ValidatedCommand::QueueStatus { task_type } => {
            let depth = QueueStatusUseCase::new(services).execute(&task_type).await?;
            println!("pending={} processing={} failed={}", depth.pending, depth.processing, depth.failed);
            Ok(())
        }
    }
}

fn report_dispatch_outcome(outcome: Result<docforge::infrastructure::runtime::RunOutcome, docforge::infrastructure::runtime::PrereqFailure>) -> anyhow::Result<()> {
    match outcome {
        Ok(run) => {
            println!("completed={} failed={} blocked={}", run.completed.len(), run.failed.len(), run.blocked.len());
            Ok(())
        }
        Err(failure) => {
            anyhow::bail!("stage {} is missing prerequisites: {:?}", failure.stage, failure.missing);
        }
    }
}

fn report_batch_outcome(outcome: docforge::infrastructure::runtime::BatchOutcome) {
    match outcome.task_id {
        Some(task_id) => println!("batch task {task_id} queued: processed={} successful={} failed={}", outcome.processed, outcome.successful, outcome.failed),
        None => println!("batch applied synchronously: processed={} successful={} failed={}", outcome.processed, outcome.successful, outcome.failed),
    }
}

fn parse_document_id(raw: &str) -> anyhow::Result<DocumentId> {
    raw.parse().map_err(|e: DomainError| anyhow::Error::from(e))
}

fn parse_stage(raw: &str) -> anyhow::Result<StageName> {
    raw.parse().map_err(|e: DomainError| anyhow::Error::from(e))
}

fn parse_uuid(raw: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| anyhow::anyhow!("invalid uuid {raw}: {e}"))
}

fn parse_batch_resource(raw: &str) -> anyhow::Result<BatchResource> {
    match raw {
        "documents" => Ok(BatchResource::Documents),
        "error-codes" => Ok(BatchResource::ErrorCodes),
        other => anyhow::bail!("unknown batch resource: {other} (expected `documents` or `error-codes`)"),
    }
}

fn parse_batch_mutation(operation: &str, column: Option<String>, value: Option<String>) -> anyhow::Result<BatchMutation> {
    match operation {
        "delete" => Ok(BatchMutation::Delete),
        "set-field" => {
            let column = column.ok_or_else(|| anyhow::anyhow!("`--column` is required for set-field"))?;
            let value = value.ok_or_else(|| anyhow::anyhow!("`--value` is required for set-field"))?;
            let value: Json = serde_json::from_str(&value).unwrap_or(Json::String(value));
            Ok(BatchMutation::FieldUpdate { column, value })
        }
        "set-status" => {
            let value = value.ok_or_else(|| anyhow::anyhow!("`--value` is required for set-status"))?;
            let value: Json = serde_json::from_str(&value).unwrap_or(Json::String(value));
            Ok(BatchMutation::StatusChange { value })
        }
        other => anyhow::bail!("unknown batch operation: {other} (expected `delete`, `set-field`, or `set-status`)"),
    }
}
