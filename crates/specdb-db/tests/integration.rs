//! Offline unit tests for specdb-db pool configuration and row types.
//! These tests do not require a live database connection.

use specdb_core::{AppConfig, Environment};
use specdb_db::{PipelineRunRow, PoolConfig, ProductRow, SpecPromotion};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        ingest_max_concurrent_products: 4,
        ingest_product_timeout_secs: 30,
        api_keys: Vec::new(),
        api_rate_limit_max_requests: 120,
        api_rate_limit_window_secs: 60,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`PipelineRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn pipeline_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = PipelineRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        run_type: "ingest".to_string(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        records_processed: 0_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.run_type, "ingest");
    assert_eq!(row.trigger_source, "cli");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.completed_at.is_none());
    assert_eq!(row.records_processed, 0);
    assert!(row.error_message.is_none());
}

/// Compile-time smoke test: confirm that [`ProductRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn product_row_has_expected_fields() {
    use chrono::Utc;

    let row = ProductRow {
        id: 42_i64,
        name: "Galaxfone S30".to_string(),
        slug: "galaxfone-s30".to_string(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.id, 42);
    assert_eq!(row.slug, "galaxfone-s30");
    assert!(row.is_active);
}

#[test]
fn spec_promotion_carries_all_matching_ids() {
    let promotion = SpecPromotion {
        spec_value_id: 7,
        matching_value_ids: vec![7, 20],
    };

    assert_eq!(promotion.spec_value_id, 7);
    assert!(promotion.matching_value_ids.contains(&20));
}
