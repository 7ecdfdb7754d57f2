//! Database schema management for `climate-compliance`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs` (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `locations` table for monitored rooms and the `readings` table
/// for raw sensor samples. Safe to call on every startup; no-op if objects
/// already exist.
///
/// `readings.reading_type` is 1 for temperature and 2 for humidity;
/// `readings.unit` is one of `C`, `F` or `%RH`.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS locations (
            location_guid UUID        PRIMARY KEY,
            location_name VARCHAR(64) NOT NULL UNIQUE CHECK (location_name <> ''),
            active        BOOLEAN,
            deleted       BOOLEAN,
            notes         TEXT
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS readings (
            reading_guid  UUID             PRIMARY KEY,
            location_guid UUID             NOT NULL REFERENCES locations (location_guid),
            reading_type  SMALLINT         NOT NULL,
            reading       DOUBLE PRECISION NOT NULL,
            unit          TEXT             NOT NULL,
            time_stamp    TIMESTAMPTZ      NOT NULL,
            channel       SMALLINT         NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Every report query filters on location and time range
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_readings_location_time
            ON readings (location_guid, time_stamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
