// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Postgres schema helpers shared by the repository implementations.
//!
//! Applies migrations on start-up so integration tests and the running
//! service always see a consistent set of `core`/`content`/`intelligence`/
//! `system` tables.

use sqlx::PgPool;
use tracing::{debug, info};

/// Runs pending migrations against the provided Postgres pool.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    debug!("ensuring database schema is up to date");
    sqlx::migrate!("../migrations").run(pool).await?;
    info!("database schema is up to date");
    Ok(())
}

/// Connects to `database_url` and applies pending migrations, returning a
/// ready-to-use pool. Convenience wrapper for `docforge migrate` and for
/// bootstrap start-up.
pub async fn connect_and_migrate(database_url: &str, min: u32, max: u32) -> Result<PgPool, sqlx::Error> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(min)
        .max_connections(max)
        .connect(database_url)
        .await?;

    ensure_schema(&pool).await?;
    Ok(pool)
}
