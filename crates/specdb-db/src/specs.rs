//! Database operations for `spec_groups`, `spec_keys`, and `spec_values`.
//!
//! Every upsert is a single `INSERT ... ON CONFLICT ... DO UPDATE ...
//! RETURNING id` statement against the table's natural-key constraint.
//! The no-op `DO UPDATE` makes `RETURNING` yield the id on the conflict
//! path too, so concurrent callers for the same natural key all get the
//! one canonical row, with no read-then-write window.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `spec_groups` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SpecGroupRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A row from the `spec_keys` table. Unique by `(group_id, name)`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SpecKeyRow {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A row from the `spec_values` table. Unique by `(key_id, value)`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SpecValueRow {
    pub id: i64,
    pub key_id: i64,
    pub value: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Upserts
// ---------------------------------------------------------------------------

/// Returns the id of the spec group named `name`, creating it if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_spec_group(pool: &PgPool, name: &str) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO spec_groups (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the id of the spec key `(group_id, name)`, creating it if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails, including when
/// `group_id` does not exist (FK violation).
pub async fn upsert_spec_key(pool: &PgPool, group_id: i64, name: &str) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO spec_keys (group_id, name) VALUES ($1, $2) \
         ON CONFLICT (group_id, name) DO UPDATE SET name = EXCLUDED.name \
         RETURNING id",
    )
    .bind(group_id)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the id of the spec value `(key_id, value)`, creating it if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails, including when `key_id`
/// does not exist (FK violation).
pub async fn upsert_spec_value(pool: &PgPool, key_id: i64, value: &str) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO spec_values (key_id, value) VALUES ($1, $2) \
         ON CONFLICT (key_id, value) DO UPDATE SET value = EXCLUDED.value \
         RETURNING id",
    )
    .bind(key_id)
    .bind(value)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns all spec groups, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_spec_groups(pool: &PgPool) -> Result<Vec<SpecGroupRow>, DbError> {
    let rows = sqlx::query_as::<_, SpecGroupRow>(
        "SELECT id, name, created_at FROM spec_groups ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns all keys of a group, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_spec_keys(pool: &PgPool, group_id: i64) -> Result<Vec<SpecKeyRow>, DbError> {
    let rows = sqlx::query_as::<_, SpecKeyRow>(
        "SELECT id, group_id, name, created_at \
         FROM spec_keys \
         WHERE group_id = $1 \
         ORDER BY name",
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns all values recorded for a key, ordered by value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_spec_values(pool: &PgPool, key_id: i64) -> Result<Vec<SpecValueRow>, DbError> {
    let rows = sqlx::query_as::<_, SpecValueRow>(
        "SELECT id, key_id, value, created_at \
         FROM spec_values \
         WHERE key_id = $1 \
         ORDER BY value",
    )
    .bind(key_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
