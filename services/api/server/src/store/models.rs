use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of maintenance performed.
///
/// The three named kinds are a labelling convention only: any other label a
/// client sends is kept verbatim in [`MaintenanceType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaintenanceType {
    Preventive,
    Corrective,
    Emergency,
    Other(String),
}

impl MaintenanceType {
    pub fn as_str(&self) -> &str {
        match self {
            MaintenanceType::Preventive => "PREVENTIVE",
            MaintenanceType::Corrective => "CORRECTIVE",
            MaintenanceType::Emergency => "EMERGENCY",
            MaintenanceType::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MaintenanceType::Other(_))
    }
}

impl From<String> for MaintenanceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PREVENTIVE" => MaintenanceType::Preventive,
            "CORRECTIVE" => MaintenanceType::Corrective,
            "EMERGENCY" => MaintenanceType::Emergency,
            _ => MaintenanceType::Other(value),
        }
    }
}

impl From<&str> for MaintenanceType {
    fn from(value: &str) -> Self {
        MaintenanceType::from(value.to_owned())
    }
}

impl From<MaintenanceType> for String {
    fn from(value: MaintenanceType) -> Self {
        match value {
            MaintenanceType::Other(label) => label,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceLog {
    pub id: i64,
    pub building_name: String,
    pub maintenance_type: MaintenanceType,
    pub energy_draw_kw: BigDecimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMaintenanceLog {
    pub building_name: String,
    pub maintenance_type: MaintenanceType,
    pub energy_draw_kw: BigDecimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogChanges {
    pub building_name: String,
    pub maintenance_type: MaintenanceType,
    pub energy_draw_kw: BigDecimal,
}

impl MaintenanceLog {
    pub fn apply(&mut self, changes: LogChanges) {
        self.building_name = changes.building_name;
        self.maintenance_type = changes.maintenance_type;
        self.energy_draw_kw = changes.energy_draw_kw;
    }
}
