// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres implementation of `ErrorRecordStore` (§4.C).

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use docforge_domain::entities::ErrorRecord;
use docforge_domain::error::DomainError;
use docforge_domain::repositories::ErrorRecordStore;
use docforge_domain::value_objects::{CorrelationId, DocumentId, ErrorRecordId, StageName};

use super::enum_codec::{from_text, to_text};

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

pub struct PostgresErrorRecordStore {
    pool: PgPool,
}

impl PostgresErrorRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ErrorRecordStore for PostgresErrorRecordStore {
    async fn save(&self, record: &ErrorRecord) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO system.error_records
                (error_id, correlation_id, document_id, stage, error_kind, message, attempt,
                 retry_scheduled_at, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT (error_id) DO UPDATE SET
                retry_scheduled_at = EXCLUDED.retry_scheduled_at,
                status = EXCLUDED.status",
        )
        .bind(record.error_id.as_uuid())
        .bind(record.correlation_id.as_str())
        .bind(record.document_id.as_uuid())
        .bind(to_text(&record.stage))
        .bind(to_text(&record.error_kind))
        .bind(&record.message)
        .bind(record.attempt as i32)
        .bind(record.retry_scheduled_at)
        .bind(to_text(&record.status))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, id: ErrorRecordId) -> Result<Option<ErrorRecord>, DomainError> {
        let row = sqlx::query("SELECT * FROM system.error_records WHERE error_id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        let Some(row) = row else { return Ok(None) };

        Ok(Some(ErrorRecord {
            error_id: ErrorRecordId::from_uuid(row.try_get("error_id").map_err(db_err)?),
            correlation_id: CorrelationId::from_raw(row.try_get::<String, _>("correlation_id").map_err(db_err)?),
            document_id: DocumentId::from_uuid(row.try_get("document_id").map_err(db_err)?),
            stage: from_text::<StageName>(&row.try_get::<String, _>("stage").map_err(db_err)?)?,
            error_kind: from_text(&row.try_get::<String, _>("error_kind").map_err(db_err)?)?,
            message: row.try_get("message").map_err(db_err)?,
            attempt: row.try_get::<i32, _>("attempt").map_err(db_err)? as u32,
            retry_scheduled_at: row.try_get("retry_scheduled_at").map_err(db_err)?,
            status: from_text(&row.try_get::<String, _>("status").map_err(db_err)?)?,
        }))
    }
}
