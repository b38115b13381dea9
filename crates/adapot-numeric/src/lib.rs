//! # adapot-numeric
//!
//! Exact arithmetic for ledger reward formulas.
//!
//! Amounts are whole lovelace held as [`BigInt`]. Rates and intermediate
//! ratios are [`BigDecimal`]. Every amount-times-rate product is floored, and
//! every division is carried at [`PRECISION`] significant digits.
//!
//! ## Modules
//!
//! - [`kernel`] — Division, floor and boundary conversions
//! - [`serde_lovelace`] — String/number serde for amounts
//! - [`serde_rate`] — String/number serde for rates

pub mod kernel;
pub mod serde_lovelace;
pub mod serde_rate;

pub use bigdecimal::BigDecimal;
pub use num_bigint::BigInt;

pub use kernel::{
    divide, ensure_non_negative, floor, lovelace_to_rate, min_rate, multiply_and_floor,
    parse_lovelace, parse_rate, rate_from_f64, ratio, PRECISION,
};

/// A ledger amount in the smallest currency unit.
pub type Lovelace = BigInt;

/// A fraction, rate or intermediate ratio.
pub type Rate = BigDecimal;

/// Error types for numeric operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumericError {
    /// A ratio had a zero denominator.
    #[error("division by zero")]
    DivisionByZero,

    /// A decimal string could not be parsed.
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    /// An amount that must never be negative was negative.
    #[error("{what} is negative: {value}")]
    NegativeAmount {
        /// What the amount represents.
        what: String,
        /// The offending value.
        value: String,
    },
}

/// Convenience result type for numeric operations.
pub type Result<T> = std::result::Result<T, NumericError>;
