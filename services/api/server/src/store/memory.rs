use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use super::{
    LogChanges, MaintenanceLog, MaintenanceStore, NewMaintenanceLog, StoreError,
    StoreResult,
};

#[derive(Debug, Default)]
struct Tables {
    buildings: BTreeSet<String>,
    logs: BTreeMap<i64, MaintenanceLog>,
    last_id: i64,
}

/// Process-local backend used by tests and local runs without Postgres.
///
/// Reads and writes can be made to fail on demand to exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMaintenanceStore {
    inner: Arc<RwLock<Tables>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    fail_building_writes: Arc<AtomicBool>,
}

impl InMemoryMaintenanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail only building inserts, leaving log writes working.
    pub fn set_fail_building_writes(&self, fail: bool) {
        self.fail_building_writes.store(fail, Ordering::SeqCst);
    }

    pub fn building_names(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|tables| tables.buildings.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn check_reads(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.inner.read().map_err(lock_error)
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.inner.write().map_err(lock_error)
    }
}

fn lock_error<T>(_: T) -> StoreError {
    StoreError::Unavailable("internal store lock error".to_string())
}

#[async_trait]
impl MaintenanceStore for InMemoryMaintenanceStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ensure_building(&self, name: &str) -> StoreResult<()> {
        self.check_writes()?;
        if self.fail_building_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "building writes disabled".to_string(),
            ));
        }

        let mut tables = self.write()?;
        if !tables.buildings.contains(name) {
            tables.buildings.insert(name.to_owned());
        }
        Ok(())
    }

    async fn building_exists(&self, name: &str) -> StoreResult<bool> {
        self.check_reads()?;
        Ok(self.read()?.buildings.contains(name))
    }

    async fn list_logs(&self) -> StoreResult<Vec<MaintenanceLog>> {
        self.check_reads()?;
        let mut logs: Vec<MaintenanceLog> =
            self.read()?.logs.values().cloned().collect();
        logs.sort_by(|a, b| {
            b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id))
        });
        Ok(logs)
    }

    async fn insert_log(
        &self,
        log: NewMaintenanceLog,
    ) -> StoreResult<MaintenanceLog> {
        self.check_writes()?;
        let mut tables = self.write()?;
        if !tables.buildings.contains(&log.building_name) {
            return Err(StoreError::MissingBuilding(log.building_name));
        }

        tables.last_id += 1;
        let stored = MaintenanceLog {
            id: tables.last_id,
            building_name: log.building_name,
            maintenance_type: log.maintenance_type,
            energy_draw_kw: log.energy_draw_kw,
            timestamp: log.timestamp,
        };
        tables.logs.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_log(&self, id: i64) -> StoreResult<Option<MaintenanceLog>> {
        self.check_reads()?;
        Ok(self.read()?.logs.get(&id).cloned())
    }

    async fn update_log(
        &self,
        id: i64,
        changes: LogChanges,
    ) -> StoreResult<Option<MaintenanceLog>> {
        self.check_writes()?;
        let mut tables = self.write()?;
        if !tables.buildings.contains(&changes.building_name) {
            return Err(StoreError::MissingBuilding(changes.building_name));
        }

        Ok(tables.logs.get_mut(&id).map(|log| {
            log.apply(changes);
            log.clone()
        }))
    }

    async fn delete_log(&self, id: i64) -> StoreResult<bool> {
        self.check_writes()?;
        Ok(self.write()?.logs.remove(&id).is_some())
    }

    async fn count_logs(&self) -> StoreResult<i64> {
        self.check_reads()?;
        Ok(self.read()?.logs.len() as i64)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_reads()
    }

    async fn close(&self, _timeout: Duration) {}
}
