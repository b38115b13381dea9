//! Protocol parameters that drive the reward formulas.

use adapot_numeric::{serde_rate, Rate};
use num_traits::{One, Signed};
use serde::{Deserialize, Serialize};

use crate::{Result, TypesError};

/// Reward-relevant protocol parameters of one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParameters {
    /// Decentralisation `d` in [0, 1]; 1 means fully federated.
    #[serde(with = "serde_rate")]
    pub decentralisation: Rate,
    /// Treasury growth rate `tau`.
    #[serde(with = "serde_rate")]
    pub treasury_growth_rate: Rate,
    /// Monetary expansion rate `rho`.
    #[serde(with = "serde_rate")]
    pub monetary_expansion_rate: Rate,
    /// Target number of pools `k`.
    pub optimal_pool_count: u32,
    /// Pledge influence `a0`.
    #[serde(with = "serde_rate")]
    pub pool_owner_influence: Rate,
}

impl ProtocolParameters {
    /// Check every parameter against its permitted range.
    ///
    /// # Errors
    ///
    /// - [`TypesError::InvalidParameterRange`] naming the first bad field
    pub fn validate(&self) -> Result<()> {
        ensure_unit_interval("decentralisation", &self.decentralisation)?;
        ensure_unit_interval("treasury_growth_rate", &self.treasury_growth_rate)?;
        ensure_unit_interval("monetary_expansion_rate", &self.monetary_expansion_rate)?;
        if self.optimal_pool_count == 0 {
            return Err(TypesError::InvalidParameterRange {
                name: "optimal_pool_count",
                value: "0".to_string(),
            });
        }
        if self.pool_owner_influence.is_negative() {
            return Err(TypesError::InvalidParameterRange {
                name: "pool_owner_influence",
                value: self.pool_owner_influence.to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn ensure_unit_interval(name: &'static str, value: &Rate) -> Result<()> {
    if value.is_negative() || value > &Rate::one() {
        return Err(TypesError::InvalidParameterRange {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}
