use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use postgres_models::connection::{Pool, with_connection};
use postgres_models::models::buildings::Building;
use postgres_models::models::maintenance_logs::{
    MaintenanceLog as LogRow, MaintenanceLogChanges, NewMaintenanceLog as NewLogRow,
};
use tracing::{info, warn};

use super::{
    LogChanges, MaintenanceLog, MaintenanceStore, NewMaintenanceLog, StoreError,
    StoreResult,
};

/// Postgres backend over a shared bb8 pool.
#[derive(Clone)]
pub struct PgMaintenanceStore {
    pool: Pool,
}

impl PgMaintenanceStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl From<LogRow> for MaintenanceLog {
    fn from(row: LogRow) -> Self {
        MaintenanceLog {
            id: row.id,
            building_name: row.building_name,
            maintenance_type: row.maintenance_type.into(),
            energy_draw_kw: row.energy_draw_kw,
            timestamp: row.timestamp,
        }
    }
}

impl From<NewMaintenanceLog> for NewLogRow {
    fn from(log: NewMaintenanceLog) -> Self {
        NewLogRow {
            building_name: log.building_name,
            maintenance_type: log.maintenance_type.into(),
            energy_draw_kw: log.energy_draw_kw,
            timestamp: log.timestamp,
        }
    }
}

impl From<LogChanges> for MaintenanceLogChanges {
    fn from(changes: LogChanges) -> Self {
        MaintenanceLogChanges {
            building_name: changes.building_name,
            maintenance_type: changes.maintenance_type.into(),
            energy_draw_kw: changes.energy_draw_kw,
        }
    }
}

#[async_trait]
impl MaintenanceStore for PgMaintenanceStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ensure_building(&self, name: &str) -> StoreResult<()> {
        let name = name.to_owned();
        let inserted = with_connection(&self.pool, |mut conn| async move {
            Building::ensure(&name, &mut conn).await
        })
        .await?;

        if inserted > 0 {
            info!("Created building on first reference");
        }
        Ok(())
    }

    async fn building_exists(&self, name: &str) -> StoreResult<bool> {
        let name = name.to_owned();
        let building = with_connection(&self.pool, |mut conn| async move {
            Building::find(&name, &mut conn).await
        })
        .await?;

        Ok(building.is_some())
    }

    async fn list_logs(&self) -> StoreResult<Vec<MaintenanceLog>> {
        let rows = with_connection(&self.pool, |mut conn| async move {
            LogRow::list_recent_first(&mut conn).await
        })
        .await?;

        Ok(rows.into_iter().map(MaintenanceLog::from).collect())
    }

    async fn insert_log(
        &self,
        log: NewMaintenanceLog,
    ) -> StoreResult<MaintenanceLog> {
        let building_name = log.building_name.clone();
        let row = with_connection(&self.pool, |mut conn| async move {
            LogRow::create(log.into(), &mut conn).await
        })
        .await
        .map_err(|e| missing_building_or(e, &building_name))?;

        Ok(row.into())
    }

    async fn get_log(&self, id: i64) -> StoreResult<Option<MaintenanceLog>> {
        let row = with_connection(&self.pool, |mut conn| async move {
            LogRow::find(id, &mut conn).await
        })
        .await?;

        Ok(row.map(MaintenanceLog::from))
    }

    async fn update_log(
        &self,
        id: i64,
        changes: LogChanges,
    ) -> StoreResult<Option<MaintenanceLog>> {
        let building_name = changes.building_name.clone();
        let row = with_connection(&self.pool, |mut conn| async move {
            LogRow::update(id, changes.into(), &mut conn).await
        })
        .await
        .map_err(|e| missing_building_or(e, &building_name))?;

        Ok(row.map(MaintenanceLog::from))
    }

    async fn delete_log(&self, id: i64) -> StoreResult<bool> {
        let deleted = with_connection(&self.pool, |mut conn| async move {
            LogRow::delete(id, &mut conn).await
        })
        .await?;

        Ok(deleted > 0)
    }

    async fn count_logs(&self) -> StoreResult<i64> {
        let count = with_connection(&self.pool, |mut conn| async move {
            LogRow::count(&mut conn).await
        })
        .await?;

        Ok(count)
    }

    async fn ping(&self) -> StoreResult<()> {
        postgres_models::connection::ping(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn close(&self, timeout: Duration) {
        if let Err(e) = postgres_models::connection::shutdown_pool_with_timeout(
            Arc::new(self.pool.clone()),
            timeout,
        )
        .await
        {
            warn!("Database pool shutdown error: {e}");
        }
    }
}

/// Foreign key violations on the building column become
/// [`StoreError::MissingBuilding`]; everything else passes through.
fn missing_building_or(
    err: postgres_models::connection::WithConnectionError<diesel::result::Error>,
    building_name: &str,
) -> StoreError {
    use diesel::result::{DatabaseErrorKind, Error};
    use postgres_models::connection::WithConnectionError;

    match err {
        WithConnectionError::Operation(Error::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            _,
        )) => StoreError::MissingBuilding(building_name.to_owned()),
        other => other.into(),
    }
}
