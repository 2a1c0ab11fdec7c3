// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres implementation of `StageStatusStore`.
//!
//! Every transition reads the current row with `FOR UPDATE`, replays it
//! through `StageStatus`'s own state machine (`begin`/`complete`/`fail`/
//! `extend_lease`/`reset`), then writes the result back in the same
//! transaction - the row lock is what makes the lease-compare-and-swap in
//! `StageStatus::begin` race-free across processes, mirroring the locking
//! discipline the advisory-lock pair uses elsewhere in this crate.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value as Json;
use sqlx::{PgPool, Row};

use docforge_domain::entities::{StageState, StageStatus};
use docforge_domain::error::DomainError;
use docforge_domain::repositories::StageStatusStore;
use docforge_domain::value_objects::{DocumentId, ErrorRecordId, LeaseToken, StageName, ALL_STAGES};

use super::enum_codec::{from_text, to_text};

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

pub struct PostgresStageStatusStore {
    pool: PgPool,
}

impl PostgresStageStatusStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_status(document_id: DocumentId, stage: StageName, row: &sqlx::postgres::PgRow) -> Result<StageStatus, DomainError> {
    Ok(StageStatus {
        document_id,
        stage,
        state: from_text(&row.try_get::<String, _>("state").map_err(db_err)?)?,
        attempt_count: row.try_get::<i32, _>("attempt_count").map_err(db_err)? as u32,
        first_attempt_at: row.try_get("first_attempt_at").map_err(db_err)?,
        last_transition_at: row.try_get("last_transition_at").map_err(db_err)?,
        last_error_ref: row
            .try_get::<Option<uuid::Uuid>, _>("last_error_ref")
            .map_err(db_err)?
            .map(ErrorRecordId::from_uuid),
        lease_token: row
            .try_get::<Option<uuid::Uuid>, _>("lease_token")
            .map_err(db_err)?
            .map(LeaseToken::from_uuid),
        leased_until: row.try_get("leased_until").map_err(db_err)?,
        result_metadata: row.try_get::<Option<Json>, _>("result_metadata").map_err(db_err)?,
    })
}

async fn upsert(tx: &mut sqlx::Transaction<'_, sqlx::Postgres>, status: &StageStatus) -> Result<(), DomainError> {
    sqlx::query(
        "INSERT INTO system.stage_status
            (document_id, stage, state, attempt_count, first_attempt_at, last_transition_at,
             last_error_ref, lease_token, leased_until, result_metadata)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (document_id, stage) DO UPDATE SET
            state = EXCLUDED.state,
            attempt_count = EXCLUDED.attempt_count,
            first_attempt_at = EXCLUDED.first_attempt_at,
            last_transition_at = EXCLUDED.last_transition_at,
            last_error_ref = EXCLUDED.last_error_ref,
            lease_token = EXCLUDED.lease_token,
            leased_until = EXCLUDED.leased_until,
            result_metadata = COALESCE(EXCLUDED.result_metadata, system.stage_status.result_metadata)",
    )
    .bind(status.document_id.as_uuid())
    .bind(status.stage.as_str())
    .bind(to_text(&status.state))
    .bind(status.attempt_count as i32)
    .bind(status.first_attempt_at)
    .bind(status.last_transition_at)
    .bind(status.last_error_ref.map(|e| e.as_uuid()))
    .bind(status.lease_token.map(|l| l.as_uuid()))
    .bind(status.leased_until)
    .bind(&status.result_metadata)
    .execute(&mut **tx)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn load_for_update(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    document_id: DocumentId,
    stage: StageName,
) -> Result<StageStatus, DomainError> {
    let row = sqlx::query("SELECT * FROM system.stage_status WHERE document_id = $1 AND stage = $2 FOR UPDATE")
        .bind(document_id.as_uuid())
        .bind(stage.as_str())
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)?;

    match row {
        Some(r) => row_to_status(document_id, stage, &r),
        None => Ok(StageStatus::pending(document_id, stage, Utc::now())),
    }
}

#[async_trait]
impl StageStatusStore for PostgresStageStatusStore {
    async fn initialize(&self, document_id: DocumentId) -> Result<(), DomainError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for stage in ALL_STAGES {
            sqlx::query(
                "INSERT INTO system.stage_status (document_id, stage, state, attempt_count, last_transition_at)
                 VALUES ($1, $2, 'pending', 0, $3)
                 ON CONFLICT (document_id, stage) DO NOTHING",
            )
            .bind(document_id.as_uuid())
            .bind(stage.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get(&self, document_id: DocumentId, stage: StageName) -> Result<StageStatus, DomainError> {
        let row = sqlx::query("SELECT * FROM system.stage_status WHERE document_id = $1 AND stage = $2")
            .bind(document_id.as_uuid())
            .bind(stage.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(r) => row_to_status(document_id, stage, &r),
            None => Ok(StageStatus::pending(document_id, stage, Utc::now())),
        }
    }

    async fn get_all(&self, document_id: DocumentId) -> Result<Vec<StageStatus>, DomainError> {
        let rows = sqlx::query("SELECT * FROM system.stage_status WHERE document_id = $1")
            .bind(document_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter()
            .map(|r| {
                let stage: String = r.try_get("stage").map_err(db_err)?;
                let stage: StageName = from_text(&stage)?;
                row_to_status(document_id, stage, r)
            })
            .collect()
    }

    async fn begin(
        &self,
        document_id: DocumentId,
        stage: StageName,
        visibility_timeout: Duration,
    ) -> Result<LeaseToken, DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut status = load_for_update(&mut tx, document_id, stage).await?;
        let now = Utc::now();
        let token = status.begin(visibility_timeout, now)?;
        upsert(&mut tx, &status).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(token)
    }

    async fn complete(&self, document_id: DocumentId, stage: StageName, lease: LeaseToken) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut status = load_for_update(&mut tx, document_id, stage).await?;
        status.complete(lease, Utc::now())?;
        upsert(&mut tx, &status).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn fail(
        &self,
        document_id: DocumentId,
        stage: StageName,
        lease: LeaseToken,
        error_ref: ErrorRecordId,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut status = load_for_update(&mut tx, document_id, stage).await?;
        status.fail(lease, error_ref, Utc::now())?;
        upsert(&mut tx, &status).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn extend_lease(
        &self,
        document_id: DocumentId,
        stage: StageName,
        lease: LeaseToken,
        additional: Duration,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut status = load_for_update(&mut tx, document_id, stage).await?;
        status.extend_lease(lease, additional, Utc::now())?;
        upsert(&mut tx, &status).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn save_result_metadata(&self, document_id: DocumentId, stage: StageName, metadata: Json) -> Result<(), DomainError> {
        sqlx::query("UPDATE system.stage_status SET result_metadata = $1 WHERE document_id = $2 AND stage = $3")
            .bind(&metadata)
            .bind(document_id.as_uuid())
            .bind(stage.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn reset(&self, document_id: DocumentId, stage: StageName) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut status = load_for_update(&mut tx, document_id, stage).await?;
        status.reset(Utc::now());
        upsert(&mut tx, &status).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }
}

/// Evaluated for smart-resume (§4.F): which dependencies of `stage` are not
/// yet `completed`/`skipped` for `document_id`.
pub async fn dependency_states(
    pool: &PgPool,
    document_id: DocumentId,
    stage: StageName,
) -> Result<Vec<StageState>, DomainError> {
    let mut states = Vec::new();
    for dep in stage.dependencies() {
        let row = sqlx::query_scalar::<_, String>(
            "SELECT state FROM system.stage_status WHERE document_id = $1 AND stage = $2",
        )
        .bind(document_id.as_uuid())
        .bind(dep.as_str())
        .fetch_optional(pool)
        .await
        .map_err(db_err)?;

        states.push(match row {
            Some(s) => from_text(&s)?,
            None => StageState::Pending,
        });
    }
    Ok(states)
}
