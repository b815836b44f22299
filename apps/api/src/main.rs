mod compensation;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod usage;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::compensation::benchmarks::{
    BenchmarkProvider, BuiltinBenchmarks, MemoizedBenchmarks, TableBenchmarks,
};
use crate::compensation::stage_defaults::StageDefaults;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::routes::build_router;
use crate::state::AppState;
use crate::usage::store::{InMemoryUsageStore, PgUsageStore, UsageStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Offerwise API v{}", env!("CARGO_PKG_VERSION"));

    let benchmarks = load_benchmarks(&config)?;
    let stage_defaults = match &config.stage_defaults_path {
        Some(path) => {
            let defaults = StageDefaults::from_path(path)
                .with_context(|| format!("loading stage defaults from {}", path.display()))?;
            info!("Stage defaults loaded from {}", path.display());
            defaults
        }
        None => StageDefaults::default(),
    };

    let usage: Arc<dyn UsageStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgUsageStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set; usage counters are kept in memory");
            Arc::new(InMemoryUsageStore::new())
        }
    };

    let state = AppState {
        benchmarks,
        stage_defaults: Arc::new(stage_defaults),
        usage,
    };

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Built-in table unless a JSON table is configured. Either way lookups are memoized.
fn load_benchmarks(config: &Config) -> Result<Arc<dyn BenchmarkProvider>> {
    match &config.benchmark_table_path {
        Some(path) => {
            let table = TableBenchmarks::from_path(path)
                .with_context(|| format!("loading benchmark table from {}", path.display()))?;
            if table.is_empty() {
                warn!(
                    "Benchmark table {} has no rows; every offer will be scored without market data",
                    path.display()
                );
            } else {
                info!("Benchmark table loaded: {} rows", table.len());
            }
            Ok(Arc::new(MemoizedBenchmarks::new(table)))
        }
        None => {
            info!("Using built-in benchmark table");
            Ok(Arc::new(MemoizedBenchmarks::new(BuiltinBenchmarks)))
        }
    }
}
