// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! Bootstrap-layer CLI handling with security-first design.
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse_cli()             │  Parse CLI with clap
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  Security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  Safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! `ValidatedCommand` carries only generic values (`String`/`PathBuf`) - the
//! composition root is the one place that knows how to turn a document-id
//! string into a `DocumentId`, a stage name into a `StageName`, and so on.

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, BatchAction, Cli, Commands, PipelineMode, QueueAction};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// Validated CLI configuration: every path is canonicalized and every
/// string argument has passed the dangerous-pattern check.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: u8,
    pub quiet: bool,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Ingest {
        path: PathBuf,
        mode: PipelineMode,
    },
    Resume {
        document_id: String,
        file_reference: String,
    },
    RunStage {
        document_id: String,
        stage: String,
        file_reference: String,
        force: bool,
    },
    RunStages {
        document_id: String,
        stages: Vec<String>,
        file_reference: String,
        force: bool,
        stop_on_error: bool,
    },
    BatchApply {
        resource: String,
        operation: String,
        ids: Vec<String>,
        column: Option<String>,
        value: Option<String>,
        rollback_on_error: bool,
        actor: String,
    },
    BatchRollback {
        batch_task_id: String,
        resource: String,
    },
    QueueStatus {
        task_type: String,
    },
    Migrate,
}

/// Parse and validate CLI arguments: parse with clap, then run every
/// argument through [`SecureArgParser`].
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let config = match &cli.config {
        Some(path) => {
            SecureArgParser::validate_argument(&path.to_string_lossy())?;
            Some(path.clone())
        }
        None => None,
    };

    let command = match cli.command {
        Commands::Ingest { path, mode } => {
            let validated_path = SecureArgParser::validate_path(&path.to_string_lossy())?;
            ValidatedCommand::Ingest { path: validated_path, mode }
        }

        Commands::Resume { document_id, file_reference } => {
            SecureArgParser::validate_argument(&document_id)?;
            SecureArgParser::validate_argument(&file_reference)?;
            ValidatedCommand::Resume { document_id, file_reference }
        }

        Commands::RunStage { document_id, stage, file_reference, force } => {
            SecureArgParser::validate_argument(&document_id)?;
            SecureArgParser::validate_argument(&stage)?;
            SecureArgParser::validate_argument(&file_reference)?;
            ValidatedCommand::RunStage { document_id, stage, file_reference, force }
        }

        Commands::RunStages { document_id, stages, file_reference, force, stop_on_error } => {
            SecureArgParser::validate_argument(&document_id)?;
            if stages.is_empty() {
                return Err(ParseError::MissingArgument("stages".to_string()));
            }
            for stage in &stages {
                SecureArgParser::validate_argument(stage)?;
            }
            SecureArgParser::validate_argument(&file_reference)?;
            ValidatedCommand::RunStages { document_id, stages, file_reference, force, stop_on_error }
        }

        Commands::Batch { action } => match action {
            BatchAction::Apply { resource, operation, ids, column, value, rollback_on_error, actor } => {
                SecureArgParser::validate_argument(&resource)?;
                SecureArgParser::validate_argument(&operation)?;
                if ids.is_empty() {
                    return Err(ParseError::MissingArgument("ids".to_string()));
                }
                for id in &ids {
                    SecureArgParser::validate_argument(id)?;
                }
                if let Some(ref column) = column {
                    SecureArgParser::validate_argument(column)?;
                }
                if let Some(ref value) = value {
                    SecureArgParser::validate_argument(value)?;
                }
                SecureArgParser::validate_argument(&actor)?;

                if operation == "set-field" && column.is_none() {
                    return Err(ParseError::MissingArgument("column".to_string()));
                }
                if (operation == "set-field" || operation == "set-status") && value.is_none() {
                    return Err(ParseError::MissingArgument("value".to_string()));
                }

                ValidatedCommand::BatchApply { resource, operation, ids, column, value, rollback_on_error, actor }
            }
            BatchAction::Rollback { batch_task_id, resource } => {
                SecureArgParser::validate_argument(&batch_task_id)?;
                SecureArgParser::validate_argument(&resource)?;
                ValidatedCommand::BatchRollback { batch_task_id, resource }
            }
        },

        Commands::Queue { action } => match action {
            QueueAction::Status { task_type } => {
                SecureArgParser::validate_argument(&task_type)?;
                ValidatedCommand::QueueStatus { task_type }
            }
        },

        Commands::Migrate => ValidatedCommand::Migrate,
    };

    Ok(ValidatedCli { command, verbose: cli.verbose, quiet: cli.quiet, config })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_batch_set_field_without_column() {
        let cli = Cli {
            command: Commands::Batch {
                action: BatchAction::Apply {
                    resource: "documents".to_string(),
                    operation: "set-field".to_string(),
                    ids: vec!["11111111-1111-1111-1111-111111111111".to_string()],
                    column: None,
                    value: Some("\"engineering\"".to_string()),
                    rollback_on_error: false,
                    actor: "operator".to_string(),
                },
            },
            verbose: 0,
            quiet: false,
            config: None,
        };

        assert!(matches!(validate_cli(cli), Err(ParseError::MissingArgument(arg)) if arg == "column"));
    }

    #[test]
    fn rejects_run_stages_with_no_stages() {
        let cli = Cli {
            command: Commands::RunStages {
                document_id: "11111111-1111-1111-1111-111111111111".to_string(),
                stages: vec![],
                file_reference: "documents/doc/file.pdf".to_string(),
                force: false,
                stop_on_error: false,
            },
            verbose: 0,
            quiet: false,
            config: None,
        };

        assert!(matches!(validate_cli(cli), Err(ParseError::MissingArgument(arg)) if arg == "stages"));
    }

    #[test]
    fn accepts_migrate_with_no_further_validation() {
        let cli = Cli { command: Commands::Migrate, verbose: 0, quiet: false, config: None };
        assert!(matches!(validate_cli(cli), Ok(ValidatedCli { command: ValidatedCommand::Migrate, .. })));
    }
}
