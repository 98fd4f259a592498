//! Building and maintenance log operations exposed to the HTTP handlers.
//!
//! Buildings are auto-created whenever a log names one that does not exist
//! yet; they are never removed.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use crate::store::{
    LogChanges, MaintenanceLog, MaintenanceStore, MaintenanceType,
    NewMaintenanceLog, StoreError,
};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to create building: {0}")]
    Building(#[source] StoreError),

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("maintenance log {0} not found")]
    NotFound(i64),
}

/// Log to create. A missing timestamp is filled with the current time.
#[derive(Debug, Clone)]
pub struct CreateLog {
    pub building_name: String,
    pub maintenance_type: MaintenanceType,
    pub energy_draw_kw: BigDecimal,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct MaintenanceGateway {
    store: Arc<dyn MaintenanceStore>,
}

impl MaintenanceGateway {
    pub fn new(store: Arc<dyn MaintenanceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn MaintenanceStore> {
        &self.store
    }

    #[instrument(skip(self))]
    pub async fn ensure_building(&self, name: &str) -> Result<(), GatewayError> {
        self.store
            .ensure_building(name)
            .await
            .map_err(GatewayError::Building)
    }

    pub async fn list_logs(&self) -> Result<Vec<MaintenanceLog>, GatewayError> {
        Ok(self.store.list_logs().await?)
    }

    #[instrument(skip_all, fields(building = %log.building_name))]
    pub async fn create_log(
        &self,
        log: CreateLog,
    ) -> Result<MaintenanceLog, GatewayError> {
        self.ensure_building(&log.building_name).await?;

        let created = self
            .store
            .insert_log(NewMaintenanceLog {
                building_name: log.building_name,
                maintenance_type: log.maintenance_type,
                energy_draw_kw: log.energy_draw_kw,
                timestamp: resolve_timestamp(log.timestamp, Utc::now()),
            })
            .await?;

        Ok(created)
    }

    pub async fn get_log(&self, id: i64) -> Result<MaintenanceLog, GatewayError> {
        self.store
            .get_log(id)
            .await?
            .ok_or(GatewayError::NotFound(id))
    }

    /// Overwrite building, type and energy draw of an existing log.
    ///
    /// Creating the target building is best effort: a failure is logged and
    /// the update carries on.
    #[instrument(skip(self, changes), fields(building = %changes.building_name))]
    pub async fn update_log(
        &self,
        id: i64,
        changes: LogChanges,
    ) -> Result<MaintenanceLog, GatewayError> {
        let existing = self.get_log(id).await?;

        if let Err(e) = self.store.ensure_building(&changes.building_name).await {
            warn!(
                error = %e,
                log_id = existing.id,
                "Could not create building for updated log, continuing"
            );
        }

        self.store
            .update_log(id, changes)
            .await?
            .ok_or(GatewayError::NotFound(id))
    }

    /// Delete a log. Deleting an id that does not exist is not an error.
    pub async fn delete_log(&self, id: i64) -> Result<(), GatewayError> {
        let removed = self.store.delete_log(id).await?;
        if !removed {
            tracing::debug!(log_id = id, "Delete matched no maintenance log");
        }
        Ok(())
    }

    pub async fn count_logs(&self) -> Result<i64, GatewayError> {
        Ok(self.store.count_logs().await?)
    }
}

/// `0001-01-01T00:00:00Z` is treated like an absent timestamp, since some
/// clients send the zero date instead of omitting the field.
pub fn resolve_timestamp(
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match requested {
        Some(ts) if !is_zero_date(&ts) => ts,
        _ => now,
    }
}

fn is_zero_date(ts: &DateTime<Utc>) -> bool {
    use chrono::{Datelike, Timelike};

    ts.year() == 1
        && ts.ordinal() == 1
        && ts.num_seconds_from_midnight() == 0
        && ts.nanosecond() == 0
}
