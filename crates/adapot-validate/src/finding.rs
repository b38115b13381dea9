//! Classification of a single offset.

use std::fmt;

use adapot_numeric::Lovelace;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

/// What an offset between recorded and computed values suggests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
    /// No offset.
    Match,
    /// The offset is an exact multiple of the pool deposit, most likely
    /// retired-pool deposits settled differently. Negative when the
    /// computation holds more than the chain.
    UnreconciledDeposits {
        /// Signed number of deposits.
        count: i64,
    },
    /// Any other offset.
    FormulaDeviation,
}

impl Finding {
    /// Classify `offset` against the pool deposit amount.
    pub fn classify(offset: &Lovelace, pool_deposit: &Lovelace) -> Self {
        if offset.is_zero() {
            return Self::Match;
        }
        if pool_deposit.is_zero() {
            return Self::FormulaDeviation;
        }
        let (count, remainder) = offset.div_rem(pool_deposit);
        match (remainder.is_zero(), count.to_i64()) {
            (true, Some(count)) => Self::UnreconciledDeposits { count },
            _ => Self::FormulaDeviation,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match => write!(f, "match"),
            Self::UnreconciledDeposits { count } => {
                write!(f, "{count} unreconciled retired-pool deposits")
            }
            Self::FormulaDeviation => write!(f, "formula deviation"),
        }
    }
}
