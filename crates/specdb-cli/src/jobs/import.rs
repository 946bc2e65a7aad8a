//! Per-product spec sheet import.
//!
//! For each variant carrying a raw vendor sheet: parse → normalize →
//! upsert group/key/value → link to the variant. A malformed sheet fails
//! the whole product (its status row records the parse error); the batch
//! moves on to the next product.

use specdb_db::ProductRow;
use sqlx::PgPool;

use super::runner::ProductOutcome;

/// Imports one product's variant spec sheets, recording the product's
/// status row in `pipeline_run_products` on both paths.
pub(super) async fn process_product(
    pool: &PgPool,
    run_id: i64,
    product: &ProductRow,
) -> ProductOutcome {
    match import_product(pool, product).await {
        Ok(links_written) => {
            if let Err(e) = specdb_db::upsert_pipeline_run_product(
                pool,
                run_id,
                product.id,
                "succeeded",
                Some(links_written),
                None,
            )
            .await
            {
                tracing::error!(
                    product = %product.slug,
                    run_id,
                    error = %e,
                    "spec links saved but failed to record product success; audit trail incomplete"
                );
                return ProductOutcome::Err(e.into());
            }
            ProductOutcome::Ok {
                records: links_written,
                succeeded: true,
            }
        }
        Err(e) => {
            let err_string = format!("{e:#}");
            tracing::error!(
                product = %product.slug,
                error = %err_string,
                "spec sheet import failed for product"
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

/// Parses and persists every sheet-bearing variant of one product.
///
/// Returns the number of new variant spec links written. Entries whose
/// normalized value is empty are skipped (logged inside
/// `normalized_entries`); variants without a sheet are ignored.
async fn import_product(pool: &PgPool, product: &ProductRow) -> anyhow::Result<i32> {
    let variants = specdb_db::list_variants(pool, product.id).await?;

    let mut links_written: i32 = 0;

    for variant in &variants {
        let Some(raw_sheet) = variant.spec_sheet.as_ref() else {
            tracing::debug!(
                product = %product.slug,
                sku = %variant.sku,
                "variant has no spec sheet; skipping"
            );
            continue;
        };

        let sheet = specdb_ingest::parse_sheet(raw_sheet, &variant.sku)?;
        let (entries, skipped) = specdb_ingest::normalized_entries(&sheet);
        if skipped > 0 {
            tracing::warn!(
                product = %product.slug,
                sku = %variant.sku,
                skipped,
                "dropped spec entries with empty values"
            );
        }

        for entry in &entries {
            let group_id = specdb_db::upsert_spec_group(pool, &entry.group).await?;
            let key_id = specdb_db::upsert_spec_key(pool, group_id, &entry.key).await?;
            let value_id = specdb_db::upsert_spec_value(pool, key_id, &entry.value).await?;

            if specdb_db::link_variant_spec(pool, variant.id, value_id).await? {
                links_written = links_written.saturating_add(1);
            }
        }

        tracing::info!(
            product = %product.slug,
            sku = %variant.sku,
            entries = entries.len(),
            "imported variant spec sheet"
        );
    }

    Ok(links_written)
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
