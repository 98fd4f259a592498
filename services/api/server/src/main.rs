use std::sync::Arc;

use anyhow::Context;
use hvac_api::shutdown::listen_for_shutdown_signals;
use hvac_api::store::{MaintenanceStore, PgMaintenanceStore};
use postgres_models::connection::PoolSettings;

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./../../../db/migrations");

fn main() {
    let config = match hvac_api::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let _sentry = config.sentry_dsn().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to initialize tracing: {e:#}");
        std::process::exit(1);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to build tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async {
        if let Err(e) = setup(config).await {
            tracing::error!("Fatal error during setup: {e:#}");
            std::process::exit(1);
        }
    });
}

/// `RUST_LOG` wins when it parses; otherwise the configured directives are used.
fn tracing_filter(
    env_directives: Option<&str>,
    fallback: &str,
) -> anyhow::Result<EnvFilter> {
    match env_directives.and_then(|d| EnvFilter::try_new(d).ok()) {
        Some(filter) => Ok(filter),
        None => EnvFilter::try_new(fallback)
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Invalid log filter `{fallback}`")),
    }
}

fn init_tracing(config: &hvac_api::Config) -> anyhow::Result<()> {
    let filter_layer = tracing_filter(
        std::env::var("RUST_LOG").ok().as_deref(),
        &config.rust_log,
    )?;

    let use_json = config.log_format != "pretty";

    if use_json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_timer(UtcTime::rfc_3339())
            .with_target(true)
            .with_level(true)
            .json();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
            .pretty();
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    };

    Ok(())
}

async fn setup(config: hvac_api::Config) -> anyhow::Result<()> {
    let addr: String = format!("0.0.0.0:{}", config.port);
    tracing::info!(
        version = hvac_api::VERSION.unwrap_or("unknown"),
        "Starting hvac-api service at: {addr}"
    );

    let db_pool = postgres_models::connection::establish_connection(
        config.database_url.clone(),
        PoolSettings {
            max_size: config.database_max_pool_size,
            ..Default::default()
        },
    )
    .await
    .context("Failed to connect to Postgres")?;

    let db_pool_conn = db_pool
        .get_owned()
        .await
        .context("Failed to get connection from pool for migrations")?;

    postgres_models::connection::run_migrations(db_pool_conn, MIGRATIONS)
        .await
        .context("Failed to run database migrations")?;

    let store: Arc<dyn MaintenanceStore> =
        Arc::new(PgMaintenanceStore::new(db_pool));

    let seed_demo_data = config.seed_demo_data;
    let app_state = hvac_api::AppState::new(store, config)
        .context("Failed to create application state")?;

    if seed_demo_data {
        hvac_api::seed::seed_demo_data(&app_state.gateway)
            .await
            .context("Failed to seed demo data")?;
    }

    let shutdown = app_state.shutdown.clone();
    let app = hvac_api::build_router(app_state)
        .context("Failed to build router")?;

    // Spawn shutdown signal handler
    let shutdown_handle = shutdown.clone();
    tokio::spawn(async move {
        listen_for_shutdown_signals().await;
        shutdown_handle.shutdown().await;
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait_for_shutdown().await })
        .await
        .context("Server exited with error")?;

    Ok(())
}
