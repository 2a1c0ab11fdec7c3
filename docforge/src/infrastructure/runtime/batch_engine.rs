// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Batch Operations Engine (§4.H): a uniform mutation (delete / field-update
//! / status-change) applied to N records of a named resource. Batches below
//! `sync_threshold` (default 50) run synchronously inside one transaction;
//! larger batches are handed to a `BatchTask` queue entry for a background
//! worker, consistent with how the donor's `BasicStageExecutor` favors a
//! synchronous fast path with a queued fallback for larger workloads.
//!
//! Column/table names are never built from caller-supplied strings: each
//! `BatchResource` maps to a fixed, whitelisted table and a fixed set of
//! mutable columns, closing the SQL-injection hole a fully generic
//! "resource name to table name" mapping would otherwise open.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value as Json};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use docforge_domain::entities::QueueTask;
use docforge_domain::error::DomainError;
use docforge_domain::repositories::ProcessingQueue;
use docforge_domain::value_objects::{CorrelationId, Priority};

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Named resources the batch engine is allowed to mutate. Each variant maps
/// to exactly one whitelisted table and id column (§4.H, §6 `core.*` /
/// `intelligence.*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchResource {
    Documents,
    ErrorCodes,
}

impl BatchResource {
    fn table(self) -> &'static str {
        match self {
            BatchResource::Documents => "core.documents",
            BatchResource::ErrorCodes => "intelligence.error_codes",
        }
    }

    fn id_column(self) -> &'static str {
        "id"
    }

    /// Columns a `FieldUpdate`/`StatusChange` mutation may target for this
    /// resource. Anything outside this list is rejected before any SQL is
    /// built.
    fn mutable_columns(self) -> &'static [&'static str] {
        match self {
            BatchResource::Documents => &["priority", "document_type", "manufacturer_id"],
            BatchResource::ErrorCodes => &["validation_status", "verified", "description", "solution"],
        }
    }

    fn status_column(self) -> &'static str {
        match self {
            BatchResource::Documents => "document_type",
            BatchResource::ErrorCodes => "validation_status",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            BatchResource::Documents => "documents",
            BatchResource::ErrorCodes => "error_codes",
        }
    }
}

#[derive(Debug, Clone)]
pub enum BatchMutation {
    Delete,
    FieldUpdate { column: String, value: Json },
    StatusChange { value: Json },
}

#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub processed: u32,
    pub successful: u32,
    pub failed: u32,
    /// Set when the batch was handed off to the queue instead of running
    /// synchronously (§4.H: "a BatchTask is created in the queue").
    pub task_id: Option<Uuid>,
}

pub struct BatchEngine {
    pool: PgPool,
    queue: Arc<dyn ProcessingQueue>,
    sync_threshold: usize,
}

impl BatchEngine {
    pub fn new(pool: PgPool, queue: Arc<dyn ProcessingQueue>, sync_threshold: usize) -> Self {
        Self { pool, queue, sync_threshold }
    }

    /// Applies `mutation` to `record_ids` of `resource`. Batches smaller
    /// than `sync_threshold` run inline and return a populated
    /// `BatchOutcome`; larger batches are queued and return only `task_id`
    /// (§4.H).
    pub async fn apply(
        &self,
        resource: BatchResource,
        record_ids: Vec<Uuid>,
        mutation: BatchMutation,
        rollback_on_error: bool,
        actor_id: &str,
        correlation_id: CorrelationId,
    ) -> Result<BatchOutcome, DomainError> {
        if let BatchMutation::FieldUpdate { column, .. } = &mutation {
            if !resource.mutable_columns().contains(&column.as_str()) {
                return Err(DomainError::invalid_config(format!("column {column} is not mutable for resource {}", resource.as_str())));
            }
        }

        if record_ids.len() < self.sync_threshold {
            self.apply_sync(resource, record_ids, mutation, rollback_on_error, actor_id, correlation_id).await
        } else {
            self.apply_async(resource, record_ids, mutation, rollback_on_error, actor_id, correlation_id).await
        }
    }

    async fn apply_sync(
        &self,
        resource: BatchResource,
        record_ids: Vec<Uuid>,
        mutation: BatchMutation,
        rollback_on_error: bool,
        actor_id: &str,
        correlation_id: CorrelationId,
    ) -> Result<BatchOutcome, DomainError> {
        let task_id = Uuid::new_v4();
        let record_count = record_ids.len() as i32;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            "INSERT INTO system.batch_tasks
                (id, resource, operation, record_count, processed, successful, failed,
                 rollback_on_error, status, actor_id, correlation_id, created_at)
             VALUES ($1, $2, $3, $4, 0, 0, 0, $5, 'processing', $6, $7, $8)",
        )
        .bind(task_id)
        .bind(resource.as_str())
        .bind(mutation_name(&mutation))
        .bind(record_count)
        .bind(rollback_on_error)
        .bind(actor_id)
        .bind(correlation_id.as_str())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let mut outcome = BatchOutcome::default();

        for record_id in &record_ids {
            match apply_one(&mut tx, resource, *record_id, &mutation, task_id, actor_id, correlation_id.as_str()).await {
                Ok(()) => outcome.successful += 1,
                Err(e) => {
                    outcome.failed += 1;
                    if rollback_on_error {
                        tx.rollback().await.map_err(db_err)?;
                        return Err(e);
                    }
                }
            }
            outcome.processed += 1;
        }

        sqlx::query("UPDATE system.batch_tasks SET processed = $1, successful = $2, failed = $3, status = 'completed' WHERE id = $4")
            .bind(outcome.processed as i32)
            .bind(outcome.successful as i32)
            .bind(outcome.failed as i32)
            .bind(task_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        outcome.task_id = Some(task_id);
        Ok(outcome)
    }

    async fn apply_async(
        &self,
        resource: BatchResource,
        record_ids: Vec<Uuid>,
        mutation: BatchMutation,
        rollback_on_error: bool,
        actor_id: &str,
        correlation_id: CorrelationId,
    ) -> Result<BatchOutcome, DomainError> {
        let task_id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO system.batch_tasks
                (id, resource, operation, record_count, processed, successful, failed,
                 rollback_on_error, status, actor_id, correlation_id, created_at)
             VALUES ($1, $2, $3, $4, 0, 0, 0, $5, 'queued', $6, $7, $8)",
        )
        .bind(task_id)
        .bind(resource.as_str())
        .bind(mutation_name(&mutation))
        .bind(record_ids.len() as i32)
        .bind(rollback_on_error)
        .bind(actor_id)
        .bind(correlation_id.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let payload = json!({
            "batch_task_id": task_id,
            "resource": resource.as_str(),
            "record_ids": record_ids,
            "mutation": mutation_payload(&mutation),
            "rollback_on_error": rollback_on_error,
            "actor_id": actor_id,
        });
        let task = QueueTask::new("batch_task", payload, Priority::Other.as_u8(), Utc::now(), correlation_id);
        self.queue.enqueue(task).await?;

        Ok(BatchOutcome { task_id: Some(task_id), ..Default::default() })
    }

    /// Applies the compensating action from `system.batch_audit_log`'s
    /// `rollback_data` for every audited record of `batch_task_id`, most
    /// recent first. Best-effort: failures are counted, not propagated
    /// (§4.H: "no global transactional guarantee is claimed").
    pub async fn rollback(&self, batch_task_id: Uuid, resource: BatchResource) -> Result<BatchOutcome, DomainError> {
        let rows = sqlx::query(
            "SELECT record_id, operation, rollback_data FROM system.batch_audit_log
             WHERE batch_task_id = $1 ORDER BY id DESC",
        )
        .bind(batch_task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut outcome = BatchOutcome::default();
        for row in rows {
            let record_id: String = row.try_get("record_id").map_err(db_err)?;
            let operation: String = row.try_get("operation").map_err(db_err)?;
            let rollback_data: Option<Json> = row.try_get("rollback_data").map_err(db_err)?;
            outcome.processed += 1;

            let Ok(id) = record_id.parse::<Uuid>() else {
                outcome.failed += 1;
                continue;
            };
            let Some(rollback_data) = rollback_data else {
                outcome.failed += 1;
                continue;
            };

            match restore_row(&self.pool, resource, id, &operation, &rollback_data).await {
                Ok(()) => outcome.successful += 1,
                Err(_) => outcome.failed += 1,
            }
        }

        Ok(outcome)
    }
}

fn mutation_name(mutation: &BatchMutation) -> &'static str {
    match mutation {
        BatchMutation::Delete => "delete",
        BatchMutation::FieldUpdate { .. } => "field_update",
        BatchMutation::StatusChange { .. } => "status_change",
    }
}

fn mutation_payload(mutation: &BatchMutation) -> Json {
    match mutation {
        BatchMutation::Delete => json!({ "kind": "delete" }),
        BatchMutation::FieldUpdate { column, value } => json!({ "kind": "field_update", "column": column, "value": value }),
        BatchMutation::StatusChange { value } => json!({ "kind": "status_change", "value": value }),
    }
}

async fn apply_one(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    resource: BatchResource,
    record_id: Uuid,
    mutation: &BatchMutation,
    batch_task_id: Uuid,
    actor_id: &str,
    correlation_id: &str,
) -> Result<(), DomainError> {
    let table = resource.table();
    let id_column = resource.id_column();

    let before_row = sqlx::query(&format!("SELECT row_to_json({t}) AS snapshot FROM {t} WHERE {id} = $1", t = table, id = id_column))
        .bind(record_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)?;
    let old_values: Option<Json> = match before_row {
        Some(row) => row.try_get("snapshot").map_err(db_err)?,
        None => return Err(DomainError::NotFound(format!("{} record {record_id} not found", resource.as_str()))),
    };

    let new_values = match mutation {
        BatchMutation::Delete => {
            sqlx::query(&format!("DELETE FROM {t} WHERE {id} = $1", t = table, id = id_column))
                .bind(record_id)
                .execute(&mut **tx)
                .await
                .map_err(db_err)?;
            Json::Null
        }
        BatchMutation::FieldUpdate { column, value } => {
            sqlx::query(&format!("UPDATE {t} SET {c} = $1 WHERE {id} = $2", t = table, c = column, id = id_column))
                .bind(value)
                .bind(record_id)
                .execute(&mut **tx)
                .await
                .map_err(db_err)?;
            json!({ column.as_str(): value })
        }
        BatchMutation::StatusChange { value } => {
            let column = resource.status_column();
            sqlx::query(&format!("UPDATE {t} SET {c} = $1 WHERE {id} = $2", t = table, c = column, id = id_column))
                .bind(value)
                .bind(record_id)
                .execute(&mut **tx)
                .await
                .map_err(db_err)?;
            json!({ column: value })
        }
    };

    sqlx::query(
        "INSERT INTO system.batch_audit_log
            (batch_task_id, resource, record_id, operation, old_values, new_values, rollback_data, actor_id, correlation_id, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(batch_task_id)
    .bind(resource.as_str())
    .bind(record_id.to_string())
    .bind(mutation_name(mutation))
    .bind(&old_values)
    .bind(&new_values)
    .bind(&old_values)
    .bind(actor_id)
    .bind(correlation_id)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await
    .map_err(db_err)?;

    Ok(())
}

async fn restore_row(
    pool: &PgPool,
    resource: BatchResource,
    record_id: Uuid,
    operation: &str,
    rollback_data: &Json,
) -> Result<(), DomainError> {
    let table = resource.table();
    let id_column = resource.id_column();

    // A deleted row has no record left to UPDATE; re-insert the full
    // row from the snapshot `row_to_json` took before the delete ran.
    if operation == "delete" {
        sqlx::query(&format!(
            "INSERT INTO {t} SELECT * FROM json_populate_record(NULL::{t}, $1) ON CONFLICT ({id}) DO NOTHING",
            t = table,
            id = id_column,
        ))
        .bind(rollback_data)
        .execute(pool)
        .await
        .map_err(db_err)?;
        return Ok(());
    }

    let Some(snapshot) = rollback_data.as_object() else {
        return Err(DomainError::invalid_config("rollback_data snapshot is not an object"));
    };

    let mutable = resource.mutable_columns();

    for (column, value) in snapshot {
        if !mutable.contains(&column.as_str()) {
            continue;
        }
        sqlx::query(&format!("UPDATE {t} SET {c} = $1 WHERE {id} = $2", t = table, c = column, id = id_column))
            .bind(value)
            .bind(record_id)
            .execute(pool)
            .await
            .map_err(db_err)?;
    }

    Ok(())
}
