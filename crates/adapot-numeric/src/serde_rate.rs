//! Serde adapter for [`Rate`](crate::Rate) fields.
//!
//! Rates are written as decimal strings. JSON numbers are accepted on input
//! and converted through [`rate_from_f64`], so `0.003` stays `0.003`.

use std::fmt;

use bigdecimal::BigDecimal;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

use crate::kernel::{lovelace_to_rate, parse_rate, rate_from_f64};

/// Serialize a rate as a decimal string.
pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Deserialize a rate from a string or a number.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
    deserializer.deserialize_any(RateVisitor)
}

struct RateVisitor;

impl<'de> Visitor<'de> for RateVisitor {
    type Value = BigDecimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal rate as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<BigDecimal, E> {
        parse_rate(v).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<BigDecimal, E> {
        rate_from_f64(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigDecimal, E> {
        Ok(lovelace_to_rate(&v.into()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigDecimal, E> {
        Ok(lovelace_to_rate(&v.into()))
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Serialize};

    use crate::kernel::parse_rate;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Params {
        #[serde(with = "crate::serde_rate")]
        rho: BigDecimal,
    }

    #[test]
    fn test_rate_from_json_number_is_exact() {
        let params: Params = serde_json::from_str(r#"{"rho":0.003}"#).expect("number");
        assert_eq!(params.rho, parse_rate("0.003").expect("decimal"));
    }

    #[test]
    fn test_rate_round_trips_as_string() {
        let params: Params = serde_json::from_str(r#"{"rho":"0.78"}"#).expect("string");
        let json = serde_json::to_string(&params).expect("serialize");
        assert_eq!(json, r#"{"rho":"0.78"}"#);
    }

    #[test]
    fn test_integer_rate() {
        let params: Params = serde_json::from_str(r#"{"rho":1}"#).expect("integer");
        assert_eq!(params.rho, BigDecimal::from(1));
    }
}
