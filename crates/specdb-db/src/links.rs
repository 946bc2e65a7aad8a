//! Database operations for the `product_specs` and `variant_specs` join
//! tables, plus the transactional promote-and-prune unit used by the
//! deduplication engine.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A spec value with its key and group resolved, as served by the API.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SpecDetailRow {
    pub spec_value_id: i64,
    pub value: String,
    pub key_id: i64,
    pub key_name: String,
    pub group_id: i64,
    pub group_name: String,
    pub linked_at: DateTime<Utc>,
}

/// A variant-level spec link reduced to what the dedup intersection needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VariantSpecEntryRow {
    pub spec_value_id: i64,
    pub key_id: i64,
    pub value: String,
}

/// One promotion unit: the canonical value id to link at product level and
/// every content-equal value id to prune from the variants.
#[derive(Debug, Clone)]
pub struct SpecPromotion {
    pub spec_value_id: i64,
    pub matching_value_ids: Vec<i64>,
}

/// Write counts from [`promote_common_specs`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PromotionCounts {
    pub promoted: i32,
    pub pruned: i32,
}

// ---------------------------------------------------------------------------
// Link / unlink (conflict-tolerant)
// ---------------------------------------------------------------------------

/// Links a spec value to a product. Returns `false` if the link already
/// existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including when either
/// id does not exist (FK violation).
pub async fn link_product_spec(
    pool: &PgPool,
    product_id: i64,
    spec_value_id: i64,
) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "INSERT INTO product_specs (product_id, spec_value_id) VALUES ($1, $2) \
         ON CONFLICT (product_id, spec_value_id) DO NOTHING",
    )
    .bind(product_id)
    .bind(spec_value_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Removes a product-level spec link. Returns `false` if no link existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn unlink_product_spec(
    pool: &PgPool,
    product_id: i64,
    spec_value_id: i64,
) -> Result<bool, DbError> {
    let rows_affected =
        sqlx::query("DELETE FROM product_specs WHERE product_id = $1 AND spec_value_id = $2")
            .bind(product_id)
            .bind(spec_value_id)
            .execute(pool)
            .await?
            .rows_affected();

    Ok(rows_affected > 0)
}

/// Links a spec value to a variant. Returns `false` if the link already
/// existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including when either
/// id does not exist (FK violation).
pub async fn link_variant_spec(
    pool: &PgPool,
    variant_id: i64,
    spec_value_id: i64,
) -> Result<bool, DbError> {
    let rows_affected = sqlx::query(
        "INSERT INTO variant_specs (variant_id, spec_value_id) VALUES ($1, $2) \
         ON CONFLICT (variant_id, spec_value_id) DO NOTHING",
    )
    .bind(variant_id)
    .bind(spec_value_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(rows_affected > 0)
}

/// Removes a variant-level spec link. Returns `false` if no link existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn unlink_variant_spec(
    pool: &PgPool,
    variant_id: i64,
    spec_value_id: i64,
) -> Result<bool, DbError> {
    let rows_affected =
        sqlx::query("DELETE FROM variant_specs WHERE variant_id = $1 AND spec_value_id = $2")
            .bind(variant_id)
            .bind(spec_value_id)
            .execute(pool)
            .await?
            .rows_affected();

    Ok(rows_affected > 0)
}

// ---------------------------------------------------------------------------
// Joined reads
// ---------------------------------------------------------------------------

/// Returns a product's promoted spec values with nested key and group.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_specs(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<SpecDetailRow>, DbError> {
    let rows = sqlx::query_as::<_, SpecDetailRow>(
        "SELECT sv.id AS spec_value_id, sv.value, \
                sk.id AS key_id, sk.name AS key_name, \
                sg.id AS group_id, sg.name AS group_name, \
                ps.created_at AS linked_at \
         FROM product_specs ps \
         JOIN spec_values sv ON sv.id = ps.spec_value_id \
         JOIN spec_keys sk ON sk.id = sv.key_id \
         JOIN spec_groups sg ON sg.id = sk.group_id \
         WHERE ps.product_id = $1 \
         ORDER BY sg.name, sk.name, sv.value",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a variant's spec values with nested key and group.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_variant_specs(
    pool: &PgPool,
    variant_id: i64,
) -> Result<Vec<SpecDetailRow>, DbError> {
    let rows = sqlx::query_as::<_, SpecDetailRow>(
        "SELECT sv.id AS spec_value_id, sv.value, \
                sk.id AS key_id, sk.name AS key_name, \
                sg.id AS group_id, sg.name AS group_name, \
                vs.created_at AS linked_at \
         FROM variant_specs vs \
         JOIN spec_values sv ON sv.id = vs.spec_value_id \
         JOIN spec_keys sk ON sk.id = sv.key_id \
         JOIN spec_groups sg ON sg.id = sk.group_id \
         WHERE vs.variant_id = $1 \
         ORDER BY sg.name, sk.name, sv.value",
    )
    .bind(variant_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Loads a variant's spec links as `(spec_value_id, key_id, value)`
/// triples for the dedup intersection.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn load_variant_spec_entries(
    pool: &PgPool,
    variant_id: i64,
) -> Result<Vec<VariantSpecEntryRow>, DbError> {
    let rows = sqlx::query_as::<_, VariantSpecEntryRow>(
        "SELECT vs.spec_value_id, sv.key_id, sv.value \
         FROM variant_specs vs \
         JOIN spec_values sv ON sv.id = vs.spec_value_id \
         WHERE vs.variant_id = $1 \
         ORDER BY sv.key_id, sv.value",
    )
    .bind(variant_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Promotion
// ---------------------------------------------------------------------------

/// Promotes the given common specs to product level and prunes the
/// now-redundant variant links, in one transaction.
///
/// A crash can therefore never leave a value linked at neither level: the
/// `product_specs` insert and the `variant_specs` delete commit together
/// or not at all. Pruning covers every `matching_value_ids` entry across
/// all of the product's variants, not just the canonical id, so a
/// defensive duplicate cannot survive as a stray variant link.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement or the commit fails; the
/// transaction rolls back on drop.
pub async fn promote_common_specs(
    pool: &PgPool,
    product_id: i64,
    promotions: &[SpecPromotion],
) -> Result<PromotionCounts, DbError> {
    if promotions.is_empty() {
        return Ok(PromotionCounts::default());
    }

    let mut tx = pool.begin().await?;
    let mut counts = PromotionCounts::default();

    for promotion in promotions {
        let inserted = sqlx::query(
            "INSERT INTO product_specs (product_id, spec_value_id) VALUES ($1, $2) \
             ON CONFLICT (product_id, spec_value_id) DO NOTHING",
        )
        .bind(product_id)
        .bind(promotion.spec_value_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        counts.promoted = counts.promoted.saturating_add(i32::try_from(inserted).unwrap_or(0));
    }

    let all_matching: Vec<i64> = promotions
        .iter()
        .flat_map(|p| p.matching_value_ids.iter().copied())
        .collect();

    let pruned = sqlx::query(
        "DELETE FROM variant_specs vs \
         USING product_variants pv \
         WHERE vs.variant_id = pv.id \
           AND pv.product_id = $1 \
           AND vs.spec_value_id = ANY($2)",
    )
    .bind(product_id)
    .bind(&all_matching)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    counts.pruned = i32::try_from(pruned).unwrap_or(i32::MAX);

    tx.commit().await?;
    Ok(counts)
}
