//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring deduplication pass.

use sqlx::PgPool;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use specdb_db::SpecPromotion;
use specdb_ingest::VariantSpecEntry;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(pool: PgPool) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_dedup_job(&scheduler, pool).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the nightly deduplication job.
///
/// Runs every day at 03:00 UTC (`0 0 3 * * *`), after overnight catalog
/// imports have settled. Promotes spec values shared by every variant of
/// a product up to the product level, product by product.
async fn register_dedup_job(scheduler: &JobScheduler, pool: PgPool) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 0 3 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);

        Box::pin(async move {
            tracing::info!("scheduler: starting nightly dedup run");
            run_dedup_job(&pool).await;
            tracing::info!("scheduler: nightly dedup run complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Drive a full dedup pass over every active product.
///
/// Products are processed sequentially; a per-product failure is recorded
/// and skipped so the nightly pass always covers the rest of the catalog.
async fn run_dedup_job(pool: &PgPool) {
    let products = match specdb_db::list_active_products(pool).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load active products");
            return;
        }
    };

    if products.is_empty() {
        tracing::info!("scheduler: no active products; skipping dedup run");
        return;
    }

    let run = match specdb_db::create_pipeline_run(pool, "dedup", "scheduler").await {
        Ok(run) => run,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to create dedup run");
            return;
        }
    };
    if let Err(e) = specdb_db::start_pipeline_run(pool, run.id).await {
        tracing::error!(run_id = run.id, error = %e, "scheduler: failed to start dedup run");
        return;
    }

    let mut total_promoted: i32 = 0;
    let mut failed_products: usize = 0;

    for product in &products {
        match dedup_product(pool, product.id).await {
            Ok(promoted) => {
                total_promoted = total_promoted.saturating_add(promoted);
                let _ = specdb_db::upsert_pipeline_run_product(
                    pool,
                    run.id,
                    product.id,
                    "succeeded",
                    Some(promoted),
                    None,
                )
                .await;
            }
            Err(e) => {
                failed_products += 1;
                tracing::error!(
                    product = %product.slug,
                    error = %e,
                    "scheduler: dedup failed for product"
                );
                let _ = specdb_db::upsert_pipeline_run_product(
                    pool,
                    run.id,
                    product.id,
                    "failed",
                    None,
                    Some(&format!("{e:#}")),
                )
                .await;
            }
        }
    }

    if failed_products == products.len() {
        let message = format!("all {failed_products} products failed dedup");
        if let Err(e) = specdb_db::fail_pipeline_run(pool, run.id, &message).await {
            tracing::error!(run_id = run.id, error = %e, "scheduler: failed to mark run failed");
        }
        return;
    }

    if let Err(e) = specdb_db::complete_pipeline_run(pool, run.id, total_promoted).await {
        tracing::error!(run_id = run.id, error = %e, "scheduler: failed to complete dedup run");
    }
}

/// Dedup one product: intersect variant spec sets by content and apply
/// the transactional promote-and-prune. Mirrors the CLI's dedup unit.
async fn dedup_product(pool: &PgPool, product_id: i64) -> anyhow::Result<i32> {
    let variants = specdb_db::list_variants(pool, product_id).await?;
    if variants.len() < 2 {
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
        return Ok(0);
    }

    let promotions: Vec<SpecPromotion> = common
        .into_iter()
        .map(|c| SpecPromotion {
            spec_value_id: c.spec_value_id,
            matching_value_ids: c.matching_value_ids,
        })
        .collect();

    let counts = specdb_db::promote_common_specs(pool, product_id, &promotions).await?;
    Ok(counts.promoted)
}
