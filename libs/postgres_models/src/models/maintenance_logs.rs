use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

#[derive(Queryable, Selectable, Debug, Clone, serde::Serialize)]
#[diesel(table_name = crate::schema::maintenance_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MaintenanceLog {
    pub id: i64,
    pub building_name: String,
    pub maintenance_type: String,
    pub energy_draw_kw: BigDecimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::maintenance_logs)]
pub struct NewMaintenanceLog {
    pub building_name: String,
    pub maintenance_type: String,
    pub energy_draw_kw: BigDecimal,
    pub timestamp: DateTime<Utc>,
}

/// Fields a log update may overwrite. The timestamp is fixed at creation.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::maintenance_logs)]
pub struct MaintenanceLogChanges {
    pub building_name: String,
    pub maintenance_type: String,
    pub energy_draw_kw: BigDecimal,
}

impl MaintenanceLog {
    pub async fn create(
        entry: NewMaintenanceLog,
        conn: &mut AsyncPgConnection,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::maintenance_logs::dsl::*;

        diesel::insert_into(maintenance_logs)
            .values(&entry)
            .returning(MaintenanceLog::as_returning())
            .get_result(conn)
            .await
    }

    /// All logs, most recent first. Equal timestamps fall back to newest id.
    pub async fn list_recent_first(
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::maintenance_logs::dsl::*;

        maintenance_logs
            .select(MaintenanceLog::as_select())
            .order((timestamp.desc(), id.desc()))
            .load(conn)
            .await
    }

    pub async fn find(
        log_id: i64,
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::maintenance_logs::dsl::*;

        maintenance_logs
            .find(log_id)
            .select(MaintenanceLog::as_select())
            .first(conn)
            .await
            .optional()
    }

    /// Overwrite the mutable fields of a log. `None` when the row is gone.
    pub async fn update(
        log_id: i64,
        changes: MaintenanceLogChanges,
        conn: &mut AsyncPgConnection,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::maintenance_logs::dsl::*;

        diesel::update(maintenance_logs.find(log_id))
            .set(&changes)
            .returning(MaintenanceLog::as_returning())
            .get_result(conn)
            .await
            .optional()
    }

    /// Delete by primary key, returning the number of rows removed.
    pub async fn delete(
        log_id: i64,
        conn: &mut AsyncPgConnection,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::maintenance_logs::dsl::*;

        diesel::delete(maintenance_logs.find(log_id))
            .execute(conn)
            .await
    }

    /// Count total rows in the table.
    pub async fn count(
        conn: &mut AsyncPgConnection,
    ) -> Result<i64, diesel::result::Error> {
        use crate::schema::maintenance_logs::dsl::*;

        maintenance_logs.count().get_result(conn).await
    }
}
