// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres implementation of `ProcessingQueue` (§4.G).
//!
//! `dequeue` uses `SELECT ... FOR UPDATE SKIP LOCKED` to let multiple worker
//! processes pop from the same table without blocking each other - the
//! standard Postgres queue idiom, the closest SQL-level analogue to the
//! donor's in-process work-stealing queue.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::{PgPool, Row};

use docforge_domain::entities::{QueueTask, QueueTaskStatus};
use docforge_domain::error::DomainError;
use docforge_domain::repositories::{ProcessingQueue, QueueDepth, ReclaimSummary};
use docforge_domain::value_objects::{CorrelationId, QueueTaskId};

use super::enum_codec::{from_text, to_text};

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

pub struct PostgresQueue {
    pool: PgPool,
}

impl PostgresQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_task(row: &sqlx::postgres::PgRow) -> Result<QueueTask, DomainError> {
    Ok(QueueTask {
        id: QueueTaskId::from_uuid(row.try_get("id").map_err(db_err)?),
        task_type: row.try_get("task_type").map_err(db_err)?,
        payload: row.try_get("payload").map_err(db_err)?,
        status: from_text(&row.try_get::<String, _>("status").map_err(db_err)?)?,
        priority: row.try_get::<i16, _>("priority").map_err(db_err)? as u8,
        scheduled_at: row.try_get("scheduled_at").map_err(db_err)?,
        leased_until: row.try_get("leased_until").map_err(db_err)?,
        lessor: row.try_get("lessor").map_err(db_err)?,
        attempt_count: row.try_get::<i32, _>("attempt_count").map_err(db_err)? as u32,
        correlation_id: CorrelationId::from_raw(row.try_get::<String, _>("correlation_id").map_err(db_err)?),
    })
}

#[async_trait]
impl ProcessingQueue for PostgresQueue {
    async fn enqueue(&self, task: QueueTask) -> Result<QueueTaskId, DomainError> {
        sqlx::query(
            "INSERT INTO system.processing_queue
                (id, task_type, payload, status, priority, scheduled_at, leased_until, lessor,
                 attempt_count, correlation_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(task.id.as_uuid())
        .bind(&task.task_type)
        .bind(&task.payload)
        .bind(to_text(&task.status))
        .bind(task.priority as i16)
        .bind(task.scheduled_at)
        .bind(task.leased_until)
        .bind(&task.lessor)
        .bind(task.attempt_count as i32)
        .bind(task.correlation_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(task.id)
    }

    async fn dequeue(&self, worker_id: &str, visibility_timeout: Duration) -> Result<Option<QueueTask>, DomainError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row = sqlx::query(
            "SELECT * FROM system.processing_queue
             WHERE status = 'queued' AND scheduled_at <= $1
             ORDER BY priority ASC, scheduled_at ASC
             FOR UPDATE SKIP LOCKED
             LIMIT 1",
        )
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let Some(row) = row else {
            tx.commit().await.map_err(db_err)?;
            return Ok(None);
        };

        let mut task = row_to_task(&row)?;
        task.status = QueueTaskStatus::Processing;
        task.leased_until = Some(now + visibility_timeout);
        task.lessor = Some(worker_id.to_string());
        task.attempt_count += 1;

        sqlx::query(
            "UPDATE system.processing_queue SET status = $2, leased_until = $3, lessor = $4, attempt_count = $5
             WHERE id = $1",
        )
        .bind(task.id.as_uuid())
        .bind(to_text(&task.status))
        .bind(task.leased_until)
        .bind(&task.lessor)
        .bind(task.attempt_count as i32)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(Some(task))
    }

    async fn extend(&self, task_id: QueueTaskId, additional: Duration) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE system.processing_queue SET leased_until = COALESCE(leased_until, $2) + $3 WHERE id = $1",
        )
        .bind(task_id.as_uuid())
        .bind(Utc::now())
        .bind(additional)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn ack(&self, task_id: QueueTaskId) -> Result<(), DomainError> {
        sqlx::query("UPDATE system.processing_queue SET status = 'completed', leased_until = NULL, lessor = NULL WHERE id = $1")
            .bind(task_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn nack(&self, task_id: QueueTaskId, _reason: &str) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE system.processing_queue SET status = 'queued', leased_until = NULL, lessor = NULL WHERE id = $1",
        )
        .bind(task_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn defer(&self, task_id: QueueTaskId, until: chrono::DateTime<chrono::Utc>) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE system.processing_queue
             SET status = 'queued', scheduled_at = $2, leased_until = NULL, lessor = NULL
             WHERE id = $1",
        )
        .bind(task_id.as_uuid())
        .bind(until)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn reclaim_expired(&self, max_attempts: u32) -> Result<ReclaimSummary, DomainError> {
        let now = Utc::now();

        let dead_lettered = sqlx::query(
            "UPDATE system.processing_queue
             SET status = 'failed', leased_until = NULL, lessor = NULL
             WHERE status = 'processing' AND leased_until < $1 AND attempt_count >= $2",
        )
        .bind(now)
        .bind(max_attempts as i32)
        .execute(&self.pool)
        .await
        .map_err(db_err)?
        .rows_affected();

        let requeued = sqlx::query(
            "UPDATE system.processing_queue
             SET status = 'queued', leased_until = NULL, lessor = NULL
             WHERE status = 'processing' AND leased_until < $1 AND attempt_count < $2",
        )
        .bind(now)
        .bind(max_attempts as i32)
        .execute(&self.pool)
        .await
        .map_err(db_err)?
        .rows_affected();

        Ok(ReclaimSummary { requeued, dead_lettered })
    }

    async fn depth(&self, task_type: &str) -> Result<QueueDepth, DomainError> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) AS n FROM system.processing_queue WHERE task_type = $1 GROUP BY status",
        )
        .bind(task_type)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut depth = QueueDepth::default();
        for row in rows {
            let status: String = row.try_get("status").map_err(db_err)?;
            let n: i64 = row.try_get("n").map_err(db_err)?;
            match status.as_str() {
                "queued" => depth.pending = n as u64,
                "processing" => depth.processing = n as u64,
                "failed" => depth.failed = n as u64,
                _ => {}
            }
        }
        Ok(depth)
    }
}
