//! Shared orchestration for batch runs.
//!
//! Provides `ProductOutcome`, `BatchTotals`, and the `run_batch` skeleton
//! used by the ingest and dedup handlers: create → start → process
//! products with bounded concurrency and a per-product deadline →
//! complete/fail.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::fail_run_best_effort;

/// Outcome of processing a single product: a `records` count and a
/// `succeeded` flag for partial-failure tracking. `Err` wraps unexpected
/// per-product errors, including deadline overruns.
pub(super) enum ProductOutcome {
    Ok { records: i32, succeeded: bool },
    Err(anyhow::Error),
}

/// Aggregated totals returned by [`run_batch`].
pub(super) struct BatchTotals {
    pub records: i32,
}

/// Tally per-product outcomes into totals and a failed-product count.
fn tally(outcomes: &[ProductOutcome]) -> (BatchTotals, usize) {
    let mut records: i32 = 0;
    let mut failed: usize = 0;

    for outcome in outcomes {
        match outcome {
            ProductOutcome::Ok {
                records: r,
                succeeded,
            } => {
                records = records.saturating_add(*r);
                if !succeeded {
                    failed += 1;
                }
            }
            ProductOutcome::Err(_) => failed += 1,
        }
    }

    (BatchTotals { records }, failed)
}

/// Shared orchestration skeleton for batch runs.
///
/// Products are processed with at most `ingest_max_concurrent_products`
/// in flight; a product is never handed to two workers. Each product is
/// bounded by `ingest_product_timeout_secs` so one stuck product cannot
/// stall the run: an overrun is recorded as that product's failure and
/// the run continues. The run as a whole fails only when every product
/// fails.
pub(super) async fn run_batch<F>(
    pool: &sqlx::PgPool,
    config: &specdb_core::AppConfig,
    products: &[specdb_db::ProductRow],
    run_type: &'static str,
    trigger_source: &'static str,
    process_product: F,
) -> anyhow::Result<BatchTotals>
where
    F: for<'a> Fn(
        &'a sqlx::PgPool,
        i64,
        &'a specdb_db::ProductRow,
    ) -> Pin<Box<dyn Future<Output = ProductOutcome> + 'a>>,
{
    if products.is_empty() {
        tracing::info!(run_type, "no products to process; skipping run creation");
        return Ok(BatchTotals { records: 0 });
    }

    let run = specdb_db::create_pipeline_run(pool, run_type, trigger_source).await?;
    if let Err(e) = specdb_db::start_pipeline_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, run_type, format!("{e:#}")).await;
        return Err(e.into());
    }

    let max_concurrent = config.ingest_max_concurrent_products.max(1);
    let deadline = Duration::from_secs(config.ingest_product_timeout_secs);
    let product_count = products.len();

    let results: Vec<(&specdb_db::ProductRow, ProductOutcome)> = stream::iter(products)
        .map(|p| {
            let fut = process_product(pool, run.id, p);
            async move {
                match tokio::time::timeout(deadline, fut).await {
                    Ok(outcome) => (p, outcome),
                    Err(_) => (
                        p,
                        ProductOutcome::Err(anyhow::anyhow!(
                            "processing exceeded {}s deadline",
                            deadline.as_secs()
                        )),
                    ),
                }
            }
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    for (p, outcome) in &results {
        if let ProductOutcome::Err(e) = outcome {
            tracing::error!(
                product = %p.slug,
                error = %e,
                "unexpected error during {run_type} run"
            );
            if let Err(mark_err) = specdb_db::upsert_pipeline_run_product(
                pool,
                run.id,
                p.id,
                "failed",
                None,
                Some(&format!("{e:#}")),
            )
            .await
            {
                tracing::error!(
                    run_id = run.id,
                    product = %p.slug,
                    error = %mark_err,
                    "failed to record product failure"
                );
            }
        }
    }

    let outcomes: Vec<ProductOutcome> = results.into_iter().map(|(_, o)| o).collect();
    let (totals, failed_products) = tally(&outcomes);

    if failed_products > 0 {
        tracing::warn!(
            failed_products,
            total_products = product_count,
            "some products failed during {run_type} run"
        );
    }

    if failed_products == product_count {
        let message = format!("all {failed_products} products failed {run_type} run");
        fail_run_best_effort(pool, run.id, run_type, message.clone()).await;
        anyhow::bail!("{message}");
    }

    if let Err(err) = specdb_db::complete_pipeline_run(pool, run.id, totals.records).await {
        let message = format!("{err:#}");
        fail_run_best_effort(pool, run.id, run_type, message).await;
        return Err(err.into());
    }

    Ok(totals)
}
