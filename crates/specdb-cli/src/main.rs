mod jobs;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "specdb-cli")]
#[command(about = "Specification pipeline batch jobs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import vendor spec sheets into the normalized entity store
    Ingest {
        /// Restrict the run to a specific product (by slug)
        #[arg(long)]
        product: Option<String>,

        /// Preview what would be imported without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Promote spec values shared by every variant up to product level
    Dedup {
        /// Restrict the run to a specific product (by slug)
        #[arg(long)]
        product: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse before anything touches the environment or the database, so
    // `--help` and argument errors never need a live Postgres.
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = specdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = specdb_db::PoolConfig::from_app_config(&config);
    let pool = specdb_db::connect_pool(&config.database_url, pool_config).await?;

    match cli.command {
        Commands::Ingest { product, dry_run } => {
            // Dry runs read the catalog but must not write, migrations included.
            if !dry_run {
                specdb_db::run_migrations(&pool).await?;
            }
            jobs::run_ingest(&pool, &config, product.as_deref(), dry_run).await
        }
        Commands::Dedup { product } => {
            specdb_db::run_migrations(&pool).await?;
            jobs::run_dedup(&pool, &config, product.as_deref()).await
        }
    }
}

/// Mark a run as failed without letting the marking itself abort anything.
/// Used on error paths where the original error is the one worth surfacing.
pub(crate) async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    run_type: &str,
    message: String,
) {
    if let Err(e) = specdb_db::fail_pipeline_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            run_type,
            error = %e,
            "failed to mark pipeline run as failed"
        );
    }
}
