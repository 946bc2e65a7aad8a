//! Database operations for `pipeline_runs` and `pipeline_run_products`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `pipeline_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PipelineRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub run_type: String,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `pipeline_run_products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PipelineRunProductRow {
    pub id: i64,
    pub pipeline_run_id: i64,
    pub product_id: i64,
    pub status: String,
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// pipeline_runs operations
// ---------------------------------------------------------------------------

/// Creates a new pipeline run in `queued` status.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or fetch fails.
pub async fn create_pipeline_run(
    pool: &PgPool,
    run_type: &str,
    trigger_source: &str,
) -> Result<PipelineRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, PipelineRunRow>(
        "INSERT INTO pipeline_runs (public_id, run_type, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING id, public_id, run_type, trigger_source, status, \
                   started_at, completed_at, records_processed, error_message, created_at",
    )
    .bind(public_id)
    .bind(run_type)
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `queued`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn start_pipeline_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE pipeline_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded`, sets `completed_at = NOW()` and `records_processed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_pipeline_run(
    pool: &PgPool,
    id: i64,
    records_processed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE pipeline_runs \
         SET status = 'succeeded', completed_at = NOW(), records_processed = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(records_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed` with an error message, from any status.
///
/// Unlike the other transitions this is unconditional: failure recording
/// must not itself fail because the run was still `queued`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn fail_pipeline_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE pipeline_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches a run by internal id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no such run exists, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_pipeline_run(pool: &PgPool, id: i64) -> Result<PipelineRunRow, DbError> {
    let row = sqlx::query_as::<_, PipelineRunRow>(
        "SELECT id, public_id, run_type, trigger_source, status, \
                started_at, completed_at, records_processed, error_message, created_at \
         FROM pipeline_runs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

// ---------------------------------------------------------------------------
// pipeline_run_products operations
// ---------------------------------------------------------------------------

/// Records (or overwrites) the outcome of one product within a run.
///
/// Conflicts on `(pipeline_run_id, product_id)` update the status, count,
/// and error message in place, so retry paths never duplicate rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_pipeline_run_product(
    pool: &PgPool,
    pipeline_run_id: i64,
    product_id: i64,
    status: &str,
    records_processed: Option<i32>,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO pipeline_run_products \
             (pipeline_run_id, product_id, status, records_processed, error_message) \
         VALUES ($1, $2, $3, COALESCE($4, 0), $5) \
         ON CONFLICT (pipeline_run_id, product_id) DO UPDATE SET \
             status            = EXCLUDED.status, \
             records_processed = EXCLUDED.records_processed, \
             error_message     = EXCLUDED.error_message",
    )
    .bind(pipeline_run_id)
    .bind(product_id)
    .bind(status)
    .bind(records_processed)
    .bind(error_message)
    .execute(pool)
    .await?;

    Ok(())
}
