//! Serde adapter for [`Lovelace`](crate::Lovelace) fields.
//!
//! Amounts are written as decimal strings so that JSON readers limited to
//! double precision keep every digit. Reading accepts strings and plain JSON
//! integers.
//!
//! ```ignore
//! #[serde(with = "adapot_numeric::serde_lovelace")]
//! pub treasury: Lovelace,
//! ```

use std::fmt;

use num_bigint::BigInt;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

use crate::kernel::parse_lovelace;

/// Serialize an amount as a decimal string.
pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Deserialize an amount from a string or an integer.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
    deserializer.deserialize_any(LovelaceVisitor)
}

struct LovelaceVisitor;

impl<'de> Visitor<'de> for LovelaceVisitor {
    type Value = BigInt;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<BigInt, E> {
        parse_lovelace(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<BigInt, E> {
        Ok(BigInt::from(v))
    }
}

/// Adapter for `Option<Lovelace>` fields.
pub mod option {
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize `Some(amount)` as a string and `None` as null.
    pub fn serialize<S: Serializer>(
        value: &Option<BigInt>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(amount) => serializer.collect_str(amount),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional amount.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BigInt>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super")] BigInt);

        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(amount)| amount))
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Pot {
        #[serde(with = "crate::serde_lovelace")]
        amount: BigInt,
    }

    #[test]
    fn test_amount_written_as_string() {
        let pot = Pot {
            amount: BigInt::from(45_000_000_000_000_000_u64),
        };
        let json = serde_json::to_string(&pot).expect("serialize");
        assert_eq!(json, r#"{"amount":"45000000000000000"}"#);
    }

    #[test]
    fn test_amount_read_from_number_or_string() {
        let from_number: Pot = serde_json::from_str(r#"{"amount":500000000}"#).expect("number");
        let from_string: Pot = serde_json::from_str(r#"{"amount":"500000000"}"#).expect("string");
        assert_eq!(from_number, from_string);
        assert!(serde_json::from_str::<Pot>(r#"{"amount":"0.5"}"#).is_err());
    }
}
