//! Eta, reward pot and treasury cut.

use adapot_numeric::{
    divide, ensure_non_negative, min_rate, multiply_and_floor, serde_lovelace, serde_rate, Lovelace,
    Rate,
};
use adapot_types::{EpochInfo, NetworkConfig, ProtocolParameters};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Decentralisation at or above which eta is fixed at 1.
fn eta_threshold() -> Rate {
    Rate::new(8.into(), 1)
}

/// Block-production correction factor.
///
/// `eta = 1` while `d >= 0.8`. Otherwise it is the ratio of blocks minted
/// by pools to the blocks expected from them, capped at 1:
///
/// ```text
/// eta = min(1, blocks / (slots_per_epoch * f * (1 - d)))
/// ```
///
/// # Errors
///
/// - [`PotError::Numeric`](crate::PotError::Numeric) if the expected block
///   count is zero
pub fn eta(params: &ProtocolParameters, info: &EpochInfo, network: &NetworkConfig) -> Result<Rate> {
    let d = &params.decentralisation;
    if d >= &eta_threshold() {
        return Ok(Rate::one());
    }

    let blocks = Rate::from(info.blocks_produced_by_pools(d));
    let expected = Rate::from(network.expected_slots_per_epoch)
        * &network.active_slot_coefficient
        * (Rate::one() - d);
    let ratio = divide(&blocks, &expected)?;
    Ok(min_rate(&ratio, &Rate::one()))
}

/// `floor(reserves * rho * eta) + fees`.
pub fn reward_pot(
    reserves: &Lovelace,
    params: &ProtocolParameters,
    eta: &Rate,
    fees: &Lovelace,
) -> Lovelace {
    multiply_and_floor(reserves, &[&params.monetary_expansion_rate, eta]) + fees
}

/// `floor(reward_pot * tau)`.
pub fn treasury_cut(reward_pot: &Lovelace, params: &ProtocolParameters) -> Lovelace {
    multiply_and_floor(reward_pot, &[&params.treasury_growth_rate])
}

/// Reward pot of one epoch boundary, split between treasury and pools.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPot {
    /// Block-production correction factor.
    #[serde(with = "serde_rate")]
    pub eta: Rate,
    /// Fees included in the pot.
    #[serde(with = "serde_lovelace")]
    pub fees: Lovelace,
    /// Monetary expansion plus fees.
    #[serde(with = "serde_lovelace")]
    pub reward_pot: Lovelace,
    /// Treasury share.
    #[serde(with = "serde_lovelace")]
    pub treasury_cut: Lovelace,
    /// What the pools share.
    #[serde(with = "serde_lovelace")]
    pub stake_pool_rewards_pot: Lovelace,
}

impl RewardPot {
    /// Compute the pot from the previous reserves and the lagged facts.
    ///
    /// # Errors
    ///
    /// - [`PotError::InvalidParameterRange`](crate::PotError::InvalidParameterRange)
    ///   if a parameter is out of range
    /// - [`PotError::Numeric`](crate::PotError::Numeric) on a zero divisor or a
    ///   negative result
    pub fn compute(
        previous_reserves: &Lovelace,
        params: &ProtocolParameters,
        info: &EpochInfo,
        network: &NetworkConfig,
    ) -> Result<Self> {
        params.validate()?;
        ensure_non_negative("reserves", previous_reserves)?;
        ensure_non_negative("fees", &info.fees)?;

        let eta = eta(params, info, network)?;
        let pot = reward_pot(previous_reserves, params, &eta, &info.fees);
        let cut = treasury_cut(&pot, params);
        let stake_pool_rewards_pot = &pot - &cut;
        ensure_non_negative("stake pool rewards pot", &stake_pool_rewards_pot)?;

        tracing::debug!(
            epoch = info.number,
            eta = %eta,
            reward_pot = %pot,
            treasury_cut = %cut,
            "reward pot computed"
        );

        Ok(Self {
            eta,
            fees: info.fees.clone(),
            reward_pot: pot,
            treasury_cut: cut,
            stake_pool_rewards_pot,
        })
    }

    /// The empty pot of the first Shelley epoch.
    pub fn empty() -> Self {
        Self {
            eta: Rate::one(),
            fees: Lovelace::zero(),
            reward_pot: Lovelace::zero(),
            treasury_cut: Lovelace::zero(),
            stake_pool_rewards_pot: Lovelace::zero(),
        }
    }
}
