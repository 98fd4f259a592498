use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CURRENCY: &str = "USD";

/// Money saved per kW of maintained energy draw.
pub fn rate_per_unit() -> BigDecimal {
    BigDecimal::new(18i64.into(), 2)
}

/// Aggregate return on investment over every maintenance log.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RoiResponse {
    /// Sum of all energy draws, in kW
    #[serde(with = "crate::shared::decimal")]
    #[schema(value_type = String, example = "400.5")]
    pub total_energy_units: BigDecimal,

    #[serde(with = "crate::shared::decimal")]
    #[schema(value_type = String, example = "0.18")]
    pub rate_per_unit: BigDecimal,

    /// `total_energy_units * rate_per_unit`, unrounded
    #[serde(with = "crate::shared::decimal")]
    #[schema(value_type = String, example = "72.09")]
    pub total_money_saved: BigDecimal,

    #[schema(example = "USD")]
    pub currency: String,
}

impl RoiResponse {
    pub fn from_draws<'a>(draws: impl IntoIterator<Item = &'a BigDecimal>) -> Self {
        let total: BigDecimal = draws.into_iter().sum();
        let rate = rate_per_unit();
        let saved = &total * &rate;

        Self {
            total_energy_units: total,
            rate_per_unit: rate,
            total_money_saved: saved,
            currency: CURRENCY.to_string(),
        }
    }
}
