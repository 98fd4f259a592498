use std::borrow::Cow;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::gateway::CreateLog;
use crate::shared::decimal::{integer_digits, to_energy_scale};
use crate::store::{LogChanges, MaintenanceLog, MaintenanceType};

/// Largest magnitude a `NUMERIC(10, 2)` column accepts is just below 10^8.
const ENERGY_DRAW_LIMIT: i64 = 100_000_000;
const ENERGY_DRAW_INTEGER_DIGITS: i64 = 8;

/// A maintenance log as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LogRecord {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Building A")]
    pub building_name: String,

    /// PREVENTIVE, CORRECTIVE or EMERGENCY by convention; other labels are kept
    #[schema(value_type = String, example = "PREVENTIVE")]
    pub maintenance_type: MaintenanceType,

    /// Energy draw in kW, as a decimal string
    #[serde(with = "crate::shared::decimal")]
    #[schema(value_type = String, example = "100.5")]
    pub energy_draw_kw: BigDecimal,

    #[schema(example = "2025-06-01T12:00:00Z")]
    pub timestamp: DateTime<Utc>,
}

impl From<MaintenanceLog> for LogRecord {
    fn from(log: MaintenanceLog) -> Self {
        Self {
            id: log.id,
            building_name: log.building_name,
            maintenance_type: log.maintenance_type,
            energy_draw_kw: log.energy_draw_kw,
            timestamp: log.timestamp,
        }
    }
}

/// Request payload for creating a maintenance log
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLogRequest {
    /// Building the work was done in; created if unknown
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    #[schema(example = "Building A")]
    pub building_name: String,

    #[schema(value_type = String, example = "PREVENTIVE")]
    pub maintenance_type: MaintenanceType,

    /// String or number; rounded half-up to two decimal places
    #[serde(with = "crate::shared::decimal")]
    #[validate(custom(function = "validate_energy_draw"))]
    #[schema(value_type = String, example = "100.50")]
    pub energy_draw_kw: BigDecimal,

    /// Defaults to the current time when omitted
    #[serde(default)]
    #[schema(example = "2025-06-01T12:00:00Z")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<CreateLogRequest> for CreateLog {
    fn from(request: CreateLogRequest) -> Self {
        CreateLog {
            building_name: request.building_name,
            maintenance_type: request.maintenance_type,
            energy_draw_kw: to_energy_scale(&request.energy_draw_kw),
            timestamp: request.timestamp,
        }
    }
}

/// Request payload for replacing the mutable fields of a maintenance log.
///
/// The timestamp is fixed at creation and cannot be changed.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLogRequest {
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    #[schema(example = "Building B")]
    pub building_name: String,

    #[schema(value_type = String, example = "CORRECTIVE")]
    pub maintenance_type: MaintenanceType,

    #[serde(with = "crate::shared::decimal")]
    #[validate(custom(function = "validate_energy_draw"))]
    #[schema(value_type = String, example = "250.00")]
    pub energy_draw_kw: BigDecimal,
}

impl From<UpdateLogRequest> for LogChanges {
    fn from(request: UpdateLogRequest) -> Self {
        LogChanges {
            building_name: request.building_name,
            maintenance_type: request.maintenance_type,
            energy_draw_kw: to_energy_scale(&request.energy_draw_kw),
        }
    }
}

fn validate_energy_draw(value: &BigDecimal) -> Result<(), ValidationError> {
    // Checked before rounding so huge exponents are never expanded.
    if integer_digits(value) > ENERGY_DRAW_INTEGER_DIGITS
        || to_energy_scale(value).abs() >= BigDecimal::from(ENERGY_DRAW_LIMIT)
    {
        return Err(ValidationError::new("range").with_message(Cow::Borrowed(
            "must be less than 100000000 in absolute value",
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn create_request_accepts_minimal_body() {
        let request: CreateLogRequest = serde_json::from_str(
            r#"{"building_name":"Building A","maintenance_type":"PREVENTIVE","energy_draw_kw":"100.50"}"#,
        )
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.timestamp, None);
        assert_eq!(request.maintenance_type, MaintenanceType::Preventive);
    }

    #[test]
    fn create_request_rounds_energy_draw() {
        let request: CreateLogRequest = serde_json::from_str(
            r#"{"building_name":"A","maintenance_type":"X","energy_draw_kw":12.345}"#,
        )
        .unwrap();

        let create = CreateLog::from(request);
        assert_eq!(create.energy_draw_kw.to_string(), "12.35");
    }

    #[test]
    fn accepts_empty_labels() {
        let request = UpdateLogRequest {
            building_name: String::new(),
            maintenance_type: MaintenanceType::from(""),
            energy_draw_kw: dec("1"),
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_overlong_building_name() {
        let request = UpdateLogRequest {
            building_name: "x".repeat(256),
            maintenance_type: MaintenanceType::Preventive,
            energy_draw_kw: dec("1"),
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("building_name"));
        assert!(!fields.contains_key("energy_draw_kw"));
    }

    #[test]
    fn energy_draw_must_fit_storage() {
        assert!(validate_energy_draw(&dec("99999999.99")).is_ok());
        assert!(validate_energy_draw(&dec("-99999999.99")).is_ok());
        assert!(validate_energy_draw(&dec("99999999.995")).is_err());
        assert!(validate_energy_draw(&dec("100000000")).is_err());
    }

    #[test]
    fn huge_exponents_are_rejected_without_rounding() {
        assert!(validate_energy_draw(&dec("1e1000000000")).is_err());
        assert!(validate_energy_draw(&dec("-1e200000000")).is_err());
        assert!(validate_energy_draw(&dec("0e200000000")).is_ok());
    }

    #[test]
    fn negative_draws_are_allowed() {
        let request = UpdateLogRequest {
            building_name: "Building A".to_string(),
            maintenance_type: MaintenanceType::Corrective,
            energy_draw_kw: dec("-12.5"),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn record_serializes_wire_shape() {
        let timestamp = DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = LogRecord {
            id: 3,
            building_name: "Building B".to_string(),
            maintenance_type: MaintenanceType::Corrective,
            energy_draw_kw: dec("250.00"),
            timestamp,
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "id": 3,
                "building_name": "Building B",
                "maintenance_type": "CORRECTIVE",
                "energy_draw_kw": "250",
                "timestamp": "2025-06-01T12:00:00Z",
            })
        );
    }
}
