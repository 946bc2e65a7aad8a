//! Per-product deduplication: promote spec values shared by every variant
//! up to product level and prune the redundant variant links.

use specdb_db::{ProductRow, SpecPromotion};
use specdb_ingest::VariantSpecEntry;
use sqlx::PgPool;

use super::runner::ProductOutcome;

/// Runs the dedup unit for one product, recording its status row in
/// `pipeline_run_products` on both paths. `records` counts promoted
/// spec values.
pub(super) async fn process_product(
    pool: &PgPool,
    run_id: i64,
    product: &ProductRow,
) -> ProductOutcome {
    match dedup_product(pool, product).await {
        Ok(promoted) => {
            if let Err(e) = specdb_db::upsert_pipeline_run_product(
                pool,
                run_id,
                product.id,
                "succeeded",
                Some(promoted),
                None,
            )
            .await
            {
                tracing::error!(
                    product = %product.slug,
                    run_id,
                    error = %e,
                    "promotion committed but failed to record product success; audit trail incomplete"
                );
                return ProductOutcome::Err(e.into());
            }
            ProductOutcome::Ok {
                records: promoted,
                succeeded: true,
            }
        }
        Err(e) => {
            let err_string = format!("{e:#}");
            tracing::error!(
                product = %product.slug,
                error = %err_string,
                "dedup failed for product"
            );
            if let Err(mark_err) = specdb_db::upsert_pipeline_run_product(
                pool,
                run_id,
                product.id,
                "failed",
                None,
                Some(&err_string),
            )
            .await
            {
                tracing::error!(
                    run_id,
                    product = %product.slug,
                    error = %mark_err,
                    "failed to record product failure"
                );
            }
            ProductOutcome::Ok {
                records: 0,
                succeeded: false,
            }
        }
    }
}

/// Computes and applies the common-spec promotion for one product.
///
/// Products with fewer than two variants are a no-op, as is an empty
/// intersection. Promotion and pruning commit in a single transaction
/// inside `promote_common_specs`.
pub(crate) async fn dedup_product(pool: &PgPool, product: &ProductRow) -> anyhow::Result<i32> {
    let variants = specdb_db::list_variants(pool, product.id).await?;
    if variants.len() < 2 {
        tracing::debug!(
            product = %product.slug,
            variant_count = variants.len(),
            "fewer than two variants; nothing to deduplicate"
        );
        return Ok(0);
    }

    let mut variant_sets: Vec<Vec<VariantSpecEntry>> = Vec::with_capacity(variants.len());
    for variant in &variants {
        let rows = specdb_db::load_variant_spec_entries(pool, variant.id).await?;
        variant_sets.push(
            rows.into_iter()
                .map(|r| VariantSpecEntry {
                    spec_value_id: r.spec_value_id,
                    key_id: r.key_id,
                    value: r.value,
                })
                .collect(),
        );
    }

    let common = specdb_ingest::common_specs(&variant_sets);
    if common.is_empty() {
        tracing::info!(product = %product.slug, "no specs common to all variants");
        return Ok(0);
    }

    let promotions: Vec<SpecPromotion> = common
        .into_iter()
        .map(|c| SpecPromotion {
            spec_value_id: c.spec_value_id,
            matching_value_ids: c.matching_value_ids,
        })
        .collect();

    let counts = specdb_db::promote_common_specs(pool, product.id, &promotions).await?;
    tracing::info!(
        product = %product.slug,
        promoted = counts.promoted,
        pruned = counts.pruned,
        "promoted common specs to product level"
    );

    Ok(counts.promoted)
}
