//! Wire representation of exact decimals.
//!
//! Decimals leave the API as JSON strings with trailing fractional zeros
//! trimmed (`"100.5"`, `"250"`). They are accepted as strings or as JSON
//! numbers; numbers are parsed from their literal text so binary floating
//! point never touches the value.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use serde::{Deserialize, Deserializer, Serializer};

/// Fractional digits kept for energy draw values, matching `NUMERIC(10, 2)`.
pub const ENERGY_SCALE: i64 = 2;

/// Render without trailing fractional zeros and without exponent notation.
pub fn to_plain_string(value: &BigDecimal) -> String {
    let normalized = value.normalized();
    let (_, scale) = normalized.as_bigint_and_exponent();
    if scale < 0 {
        normalized.with_scale(0).to_string()
    } else {
        normalized.to_string()
    }
}

/// Digits left of the decimal point, read from the unscaled representation.
///
/// Zero has none. Nothing is expanded, so `1e200000000` is answered without
/// materialising its digits.
pub fn integer_digits(value: &BigDecimal) -> i64 {
    if value.is_zero() {
        return 0;
    }
    let (_, scale) = value.as_bigint_and_scale();
    value.digits() as i64 - scale
}

/// Round half away from zero to the storage scale.
pub fn to_energy_scale(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(ENERGY_SCALE, RoundingMode::HalfUp)
}

pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_plain_string(value))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalInput {
    Text(String),
    Number(serde_json::Number),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match DecimalInput::deserialize(deserializer)? {
        DecimalInput::Text(text) => text,
        DecimalInput::Number(number) => number.to_string(),
    };

    BigDecimal::from_str(raw.trim()).map_err(|_| {
        serde::de::Error::custom(format!("`{raw}` is not a decimal number"))
    })
}
