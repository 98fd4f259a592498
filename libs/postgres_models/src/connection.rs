use diesel::pg::Pg;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio_postgres::Client as TokioPgClient;
use tracing::Instrument;
use tracing::{info, instrument, warn};

pub type Pool = bb8::Pool<AsyncPgConnection>;
pub type PooledConnection = bb8::PooledConnection<'static, AsyncPgConnection>;

pub const MAX_POOL_SIZE: u32 = 50;
pub const MIN_RESERVED_CONNECTIONS: u32 = 10;

/// Pool tuning knobs. `max_size` overrides the size derived from the
/// server's `max_connections`.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_size: Option<u32>,
    pub connection_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: None,
            connection_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(180),
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

pub async fn create_tokio_pg_client(
    db_url: &str,
) -> Result<TokioPgClient, tokio_postgres::Error> {
    let (client, connection) =
        tokio_postgres::connect(db_url, tokio_postgres::NoTls).await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    Ok(client)
}

pub async fn get_max_connections(
    client: &TokioPgClient,
) -> Result<i32, anyhow::Error> {
    let row = client
        .query_one("SELECT current_setting('max_connections')", &[])
        .await?;

    let raw: String = row.get(0);
    raw.parse().map_err(|e| {
        anyhow::anyhow!("Failed to parse max_connections '{}': {}", raw, e)
    })
}

pub fn calculate_optimal_pool_size(
    db_max_connections: i32,
    num_app_instances: u32,
    reserved_for_admin: u32,
) -> u32 {
    let available =
        db_max_connections.saturating_sub(reserved_for_admin as i32).max(1);

    let per_instance =
        (available as f32 / num_app_instances.max(1) as f32).floor() as u32;

    per_instance.clamp(1, MAX_POOL_SIZE)
}

pub async fn establish_connection(
    db_url: String,
    settings: PoolSettings,
) -> Result<Pool, anyhow::Error> {
    let max_pool_size = match settings.max_size {
        Some(size) => size,
        None => {
            let client = create_tokio_pg_client(&db_url).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create PostgreSQL tokio client: {}",
                    e
                )
            })?;
            let max_conn = get_max_connections(&client).await?;
            info!("PostgreSQL max_connections: {}", max_conn);
            calculate_optimal_pool_size(max_conn, 1, MIN_RESERVED_CONNECTIONS)
        }
    };
    info!("PostgreSQL max_pool_size: {}", max_pool_size);

    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    let pool = bb8::Pool::builder()
        .max_size(max_pool_size)
        .connection_timeout(settings.connection_timeout)
        .idle_timeout(Some(settings.idle_timeout))
        .retry_connection(true)
        .max_lifetime(Some(settings.max_lifetime))
        .build(manager)
        .await?;

    ping(&pool).await?;

    Ok(pool)
}

/// Round-trips `SELECT 1` on a pooled connection.
pub async fn ping(pool: &Pool) -> Result<(), anyhow::Error> {
    let mut conn = pool.get_owned().await?;
    diesel::sql_query("SELECT 1").execute(&mut conn).await?;
    Ok(())
}

#[instrument(skip(pool))]
pub async fn shutdown_pool_with_timeout(
    pool: Arc<Pool>,
    shutdown_timeout: Duration,
) -> Result<(), String> {
    info!("Starting graceful PostgreSQL pool shutdown with timeout");

    let state = pool.state();
    info!(
        "Current pool state - total: {}, idle: {}, active: {}",
        state.connections,
        state.idle_connections,
        state.connections - state.idle_connections
    );

    if state.connections > state.idle_connections {
        warn!(
            "Waiting for {} active database connections to finish",
            state.connections - state.idle_connections
        );

        let start = tokio::time::Instant::now();
        loop {
            tokio::time::sleep(Duration::from_millis(100)).await;

            let current = pool.state();
            let active = current.connections - current.idle_connections;

            if active == 0 {
                info!("All database connections are now idle");
                break;
            }

            if start.elapsed() > shutdown_timeout {
                warn!(
                    "Shutdown timeout reached with {} active connections remaining",
                    active
                );
                break;
            }
        }
    }

    drop(pool);

    info!("PostgreSQL pool shutdown complete");
    Ok(())
}

pub async fn run_migrations<A>(
    async_connection: A,
    migrations: EmbeddedMigrations,
) -> Result<(), anyhow::Error>
where
    A: AsyncConnection<Backend = Pg> + 'static,
{
    let mut async_wrapper: AsyncConnectionWrapper<A> =
        AsyncConnectionWrapper::from(async_connection);

    if tokio::runtime::Handle::try_current().is_err() {
        anyhow::bail!("This function must be called from within a Tokio runtime");
    }

    let applied = task::spawn_blocking(move || {
        async_wrapper
            .run_pending_migrations(migrations)
            .map(|versions| versions.len())
            .map_err(|e| anyhow::anyhow!("failed to run migrations: {e}"))
    })
    .await??;

    info!(applied, "Database migrations complete");
    Ok(())
}

/// Execute a database operation with a scoped connection.
///
/// The connection is acquired from the pool only when this function is called
/// and returned to the pool when the operation completes, so handlers never
/// hold a connection for their whole lifecycle.
///
/// # Example
///
/// ```rust,ignore
/// use postgres_models::connection::with_connection;
///
/// let logs = with_connection(&pool, |mut conn| async move {
///     MaintenanceLog::list_recent_first(&mut conn).await
/// }).await?;
/// ```
///
/// # Tracing
///
/// - `acquiring_pooled_connection` span: time waiting for a connection
/// - `holding_db_connection` span: time the connection is held and used
pub async fn with_connection<F, Fut, T, E>(
    pool: &Pool,
    operation: F,
) -> Result<T, WithConnectionError<E>>
where
    F: FnOnce(PooledConnection) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let pool_state_before = pool.state();
    let acquire_span = tracing::info_span!(
        "acquiring_pooled_connection",
        pool.connections = pool_state_before.connections,
        pool.idle_connections = pool_state_before.idle_connections,
    );

    let conn =
        async { pool.get_owned().await.map_err(WithConnectionError::Pool) }
            .instrument(acquire_span)
            .await?;

    let hold_span = tracing::info_span!("holding_db_connection");
    let result = async {
        operation(conn)
            .await
            .map_err(WithConnectionError::Operation)
    }
    .instrument(hold_span)
    .await;

    let pool_state_after = pool.state();
    tracing::debug!(
        pool.connections = pool_state_after.connections,
        pool.idle_connections = pool_state_after.idle_connections,
        "connection_returned_to_pool"
    );

    result
}

/// Error type for `with_connection` that distinguishes pool and operation errors
#[derive(Debug)]
pub enum WithConnectionError<E> {
    /// Error acquiring connection from the pool
    Pool(diesel_async::pooled_connection::bb8::RunError),
    /// Error from the database operation itself
    Operation(E),
}

impl<E: std::fmt::Display> std::fmt::Display for WithConnectionError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithConnectionError::Pool(e) => {
                write!(f, "Failed to acquire connection: {}", e)
            }
            WithConnectionError::Operation(e) => {
                write!(f, "Database operation failed: {}", e)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error
    for WithConnectionError<E>
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WithConnectionError::Pool(e) => Some(e),
            WithConnectionError::Operation(e) => Some(e),
        }
    }
}
