//! Database operations for `products` and `product_variants`.
//!
//! The catalog itself is managed outside this pipeline; these are the
//! reads the batch jobs and API need.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `product_variants` table.
///
/// `spec_sheet` is the raw vendor blob, present only for variants whose
/// sheet has been loaded and not yet cleared by an admin.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariantRow {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub sku: String,
    pub spec_sheet: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all active products, ordered by slug.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_products(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, slug, is_active, created_at, updated_at \
         FROM products \
         WHERE is_active = TRUE \
         ORDER BY slug",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Looks up a single product by slug.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_slug(pool: &PgPool, slug: &str) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, slug, is_active, created_at, updated_at \
         FROM products \
         WHERE slug = $1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all variants of a product, ordered by sku.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_variants(pool: &PgPool, product_id: i64) -> Result<Vec<VariantRow>, DbError> {
    let rows = sqlx::query_as::<_, VariantRow>(
        "SELECT id, product_id, name, sku, spec_sheet, created_at, updated_at \
         FROM product_variants \
         WHERE product_id = $1 \
         ORDER BY sku",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
