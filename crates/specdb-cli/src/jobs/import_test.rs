use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use specdb_core::{AppConfig, Environment};
use sqlx::PgPool;

use crate::jobs::runner::{run_batch, BatchTotals};

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 10,
        db_min_connections: 1,
        db_acquire_timeout_secs: 10,
        ingest_max_concurrent_products: 4,
        ingest_product_timeout_secs: 30,
        api_keys: Vec::new(),
        api_rate_limit_max_requests: 120,
        api_rate_limit_window_secs: 60,
    }
}

async fn seed_product(pool: &PgPool, slug: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (name, slug, is_active) VALUES ($1, $2, true) RETURNING id",
    )
    .bind(format!("Product {slug}"))
    .bind(slug)
    .fetch_one(pool)
    .await
    .expect("seed_product failed")
}

async fn seed_variant_with_sheet(pool: &PgPool, product_id: i64, sku: &str, sheet: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO product_variants (product_id, name, sku, spec_sheet) \
         VALUES ($1, $2, $3, $4::jsonb) RETURNING id",
    )
    .bind(product_id)
    .bind(format!("Variant {sku}"))
    .bind(sku)
    .bind(sheet)
    .fetch_one(pool)
    .await
    .expect("seed_variant_with_sheet failed")
}

async fn run_ingest_batch(pool: &PgPool) -> anyhow::Result<BatchTotals> {
    let products = specdb_db::list_active_products(pool)
        .await
        .expect("list products");
    run_batch(
        pool,
        &test_config(),
        &products,
        "ingest",
        "cli",
        |pool, run_id, product| Box::pin(super::process_product(pool, run_id, product)),
    )
    .await
}

#[sqlx::test(migrations = "../../migrations")]
async fn malformed_sheet_fails_product_but_run_continues(pool: PgPool) {
    let good_id = seed_product(&pool, "galaxfone-s30").await;
    let good_variant = seed_variant_with_sheet(
        &pool,
        good_id,
        "S30-128",
        r#"{"specs":[{"group_name":"Display","specs":[{"key":"Screen size","value":"6.1 inch"}]}]}"#,
    )
    .await;

    let bad_id = seed_product(&pool, "crackphone-z1").await;
    seed_variant_with_sheet(&pool, bad_id, "Z1-64", r#"{"specs": 42}"#).await;

    let totals = run_ingest_batch(&pool)
        .await
        .expect("one bad product must not abort the run");
    assert_eq!(totals.records, 1, "only the good variant's link counts");

    let run_id: i64 = sqlx::query_scalar("SELECT id FROM pipeline_runs")
        .fetch_one(&pool)
        .await
        .expect("run row");
    let run = specdb_db::get_pipeline_run(&pool, run_id)
        .await
        .expect("run lookup");
    assert_eq!(run.status, "succeeded");
    assert_eq!(run.records_processed, 1);

    let bad_status: String =
        sqlx::query_scalar("SELECT status FROM pipeline_run_products WHERE product_id = $1")
            .bind(bad_id)
            .fetch_one(&pool)
            .await
            .expect("bad product status row");
    assert_eq!(bad_status, "failed");

    let good_status: String =
        sqlx::query_scalar("SELECT status FROM pipeline_run_products WHERE product_id = $1")
            .bind(good_id)
            .fetch_one(&pool)
            .await
            .expect("good product status row");
    assert_eq!(good_status, "succeeded");

    let links: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM variant_specs WHERE variant_id = $1")
            .bind(good_variant)
            .fetch_one(&pool)
            .await
            .expect("link count");
    assert_eq!(links, 1, "the good variant's specs must still be written");
}

#[sqlx::test(migrations = "../../migrations")]
async fn all_products_failing_fails_the_run(pool: PgPool) {
    let bad_id = seed_product(&pool, "crackphone-z1").await;
    seed_variant_with_sheet(&pool, bad_id, "Z1-64", r#"{"specs": 42}"#).await;

    let result = run_ingest_batch(&pool).await;
    assert!(result.is_err(), "a run where every product fails must error");

    let status: String = sqlx::query_scalar("SELECT status FROM pipeline_runs")
        .fetch_one(&pool)
        .await
        .expect("run row");
    assert_eq!(status, "failed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn empty_product_set_creates_no_run(pool: PgPool) {
    let totals = run_ingest_batch(&pool)
        .await
        .expect("empty batch must be a no-op");
    assert_eq!(totals.records, 0);

    let runs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pipeline_runs")
        .fetch_one(&pool)
        .await
        .expect("run count");
    assert_eq!(runs, 0, "an empty batch must not be recorded as a failed run");
}
