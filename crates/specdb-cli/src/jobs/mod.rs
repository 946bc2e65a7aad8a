//! Batch job handlers for the CLI.
//!
//! These are called from `main` after the database pool and config are
//! established. Per-product failures are logged and skipped rather than
//! propagated so a single bad product does not abort the full run.

mod dedup;
mod import;
mod runner;

use runner::run_batch;

/// Load the products to process for a batch run.
///
/// If `product_filter` is `Some(slug)`, fetches that single product and
/// returns an error if not found. If `None`, returns all active products.
pub(crate) async fn load_products(
    pool: &sqlx::PgPool,
    product_filter: Option<&str>,
) -> anyhow::Result<Vec<specdb_db::ProductRow>> {
    if let Some(slug) = product_filter {
        let product = specdb_db::get_product_by_slug(pool, slug)
            .await?
            .ok_or_else(|| anyhow::anyhow!("product '{slug}' not found"))?;
        Ok(vec![product])
    } else {
        Ok(specdb_db::list_active_products(pool).await?)
    }
}

/// Import vendor spec sheets for all (or one) product's variants into the
/// normalized entity store.
///
/// When `dry_run` is `true` the function prints what would be imported and
/// returns without touching the database.
///
/// # Errors
///
/// Returns an error if the product filter resolves to nothing or the run
/// cannot be created. Per-product parse/persist failures are logged and
/// skipped, not propagated.
pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    config: &specdb_core::AppConfig,
    product_filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let products = load_products(pool, product_filter).await?;
    if products.is_empty() {
        println!("no active products found; skipping run creation");
        return Ok(());
    }

    if dry_run {
        let slugs: Vec<&str> = products.iter().map(|p| p.slug.as_str()).collect();
        println!(
            "dry-run: would import spec sheets for {} products: [{}]",
            products.len(),
            slugs.join(", ")
        );
        return Ok(());
    }

    let totals = run_batch(
        pool,
        config,
        &products,
        "ingest",
        "cli",
        |pool, run_id, product| Box::pin(import::process_product(pool, run_id, product)),
    )
    .await?;

    println!(
        "ingest complete: {} variant spec links written across {} products",
        totals.records,
        products.len()
    );
    Ok(())
}

/// Promote spec values shared by every variant of a product up to product
/// level, for all (or one) products.
///
/// # Errors
///
/// Returns an error if the product filter resolves to nothing or the run
/// cannot be created. Per-product failures are logged and skipped.
pub(crate) async fn run_dedup(
    pool: &sqlx::PgPool,
    config: &specdb_core::AppConfig,
    product_filter: Option<&str>,
) -> anyhow::Result<()> {
    let products = load_products(pool, product_filter).await?;
    if products.is_empty() {
        println!("no active products found; skipping run creation");
        return Ok(());
    }

    let totals = run_batch(
        pool,
        config,
        &products,
        "dedup",
        "cli",
        |pool, run_id, product| Box::pin(dedup::process_product(pool, run_id, product)),
    )
    .await?;

    println!(
        "dedup complete: {} spec values promoted across {} products",
        totals.records,
        products.len()
    );
    Ok(())
}
