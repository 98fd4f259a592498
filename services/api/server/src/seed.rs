use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use tracing::info;

use crate::gateway::{CreateLog, GatewayError, MaintenanceGateway};
use crate::store::MaintenanceType;

pub const DEMO_BUILDINGS: [&str; 2] = ["Building A", "Building B"];

/// Insert the demo buildings and logs when no log exists yet.
///
/// Returns the number of logs inserted.
pub async fn seed_demo_data(
    gateway: &MaintenanceGateway,
) -> Result<usize, GatewayError> {
    let existing = gateway.count_logs().await?;
    if existing > 0 {
        info!(existing, "Maintenance logs present, skipping demo data");
        return Ok(0);
    }

    for name in DEMO_BUILDINGS {
        gateway.ensure_building(name).await?;
    }

    let now = Utc::now();
    let logs = [
        ("Building A", MaintenanceType::Preventive, 10_050_i64, now),
        (
            "Building B",
            MaintenanceType::Corrective,
            25_000,
            now - Duration::hours(24),
        ),
        (
            "Building A",
            MaintenanceType::Emergency,
            5_000,
            now - Duration::hours(48),
        ),
    ];

    let count = logs.len();
    for (building, kind, cents, timestamp) in logs {
        gateway
            .create_log(CreateLog {
                building_name: building.to_string(),
                maintenance_type: kind,
                energy_draw_kw: BigDecimal::new(cents.into(), 2),
                timestamp: Some(timestamp),
            })
            .await?;
    }

    info!(logs = count, "Seeded demo maintenance data");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMaintenanceStore;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeds_empty_store_once() {
        let store = InMemoryMaintenanceStore::new();
        let gateway = MaintenanceGateway::new(Arc::new(store.clone()));

        assert_eq!(seed_demo_data(&gateway).await.unwrap(), 3);
        assert_eq!(seed_demo_data(&gateway).await.unwrap(), 0);

        assert_eq!(gateway.count_logs().await.unwrap(), 3);
        assert_eq!(
            store.building_names(),
            vec!["Building A".to_string(), "Building B".to_string()]
        );
    }

    #[tokio::test]
    async fn demo_logs_are_newest_first() {
        let gateway =
            MaintenanceGateway::new(Arc::new(InMemoryMaintenanceStore::new()));
        seed_demo_data(&gateway).await.unwrap();

        let logs = gateway.list_logs().await.unwrap();
        let draws: Vec<BigDecimal> =
            logs.iter().map(|log| log.energy_draw_kw.clone()).collect();

        assert_eq!(
            draws,
            vec![
                BigDecimal::from_str("100.50").unwrap(),
                BigDecimal::from_str("250.00").unwrap(),
                BigDecimal::from_str("50.00").unwrap(),
            ]
        );
        assert_eq!(logs[1].maintenance_type, MaintenanceType::Corrective);
    }

    #[tokio::test]
    async fn leaves_existing_data_alone() {
        let gateway =
            MaintenanceGateway::new(Arc::new(InMemoryMaintenanceStore::new()));
        gateway
            .create_log(CreateLog {
                building_name: "Depot".to_string(),
                maintenance_type: MaintenanceType::Preventive,
                energy_draw_kw: BigDecimal::from(1),
                timestamp: None,
            })
            .await
            .unwrap();

        assert_eq!(seed_demo_data(&gateway).await.unwrap(), 0);
        assert_eq!(gateway.count_logs().await.unwrap(), 1);
    }
}
