//! Storage backends for buildings and maintenance logs.

use std::time::Duration;

use async_trait::async_trait;
use postgres_models::connection::WithConnectionError;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::InMemoryMaintenanceStore;
pub use models::{LogChanges, MaintenanceLog, MaintenanceType, NewMaintenanceLog};
pub use postgres::PgMaintenanceStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Failed to get database connection: {0}")]
    Pool(String),

    #[error("Building does not exist: {0}")]
    MissingBuilding(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<WithConnectionError<diesel::result::Error>> for StoreError {
    fn from(err: WithConnectionError<diesel::result::Error>) -> Self {
        match err {
            WithConnectionError::Pool(e) => StoreError::Pool(e.to_string()),
            WithConnectionError::Operation(e) => StoreError::Database(e),
        }
    }
}

/// Row-level access to the building and maintenance log tables.
///
/// Implementations do not auto-create buildings: inserting or saving a log
/// that names an unknown building fails, mirroring the foreign key. The
/// auto-creation policy lives in [`crate::gateway::MaintenanceGateway`].
#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    /// Short backend label used in health output.
    fn backend(&self) -> &'static str;

    /// Insert the building if absent. Idempotent and safe under races.
    async fn ensure_building(&self, name: &str) -> StoreResult<()>;

    async fn building_exists(&self, name: &str) -> StoreResult<bool>;

    /// All logs, most recent timestamp first.
    async fn list_logs(&self) -> StoreResult<Vec<MaintenanceLog>>;

    async fn insert_log(
        &self,
        log: NewMaintenanceLog,
    ) -> StoreResult<MaintenanceLog>;

    async fn get_log(&self, id: i64) -> StoreResult<Option<MaintenanceLog>>;

    /// Overwrite the mutable fields. `None` when the row does not exist.
    async fn update_log(
        &self,
        id: i64,
        changes: LogChanges,
    ) -> StoreResult<Option<MaintenanceLog>>;

    /// Delete by id, returning whether a row was removed.
    async fn delete_log(&self, id: i64) -> StoreResult<bool>;

    async fn count_logs(&self) -> StoreResult<i64>;

    async fn ping(&self) -> StoreResult<()>;

    /// Release backend resources, waiting at most `timeout`.
    async fn close(&self, timeout: Duration);
}
