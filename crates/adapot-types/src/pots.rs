//! Ada pot snapshot.

use adapot_numeric::{serde_lovelace, Lovelace};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::network::NetworkConfig;
use crate::Epoch;

/// Balances of every ledger pot at an epoch boundary.
///
/// `treasury + reserves + rewards + deposits + fees_accrued +
/// circulating_supply` equals the network's total supply once the Shelley
/// genesis has been applied. Fees paid during an epoch leave circulation
/// at its end and sit in the fee pot until the next boundary sweeps them
/// into a reward pot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaPots {
    /// Epoch the balances belong to.
    pub epoch: Epoch,
    /// Treasury balance.
    #[serde(with = "serde_lovelace")]
    pub treasury: Lovelace,
    /// Reserves balance.
    #[serde(with = "serde_lovelace")]
    pub reserves: Lovelace,
    /// Sum of reward account balances.
    #[serde(with = "serde_lovelace")]
    pub rewards: Lovelace,
    /// Outstanding key and pool deposits.
    #[serde(with = "serde_lovelace")]
    pub deposits: Lovelace,
    /// Fee pot: fees paid in the previous epoch, not yet swept.
    #[serde(with = "serde_lovelace")]
    pub fees_accrued: Lovelace,
    /// Value held in UTxO.
    #[serde(with = "serde_lovelace")]
    pub circulating_supply: Lovelace,
}

impl AdaPots {
    /// All-zero pots, used before the reward system exists.
    pub fn zero(epoch: Epoch) -> Self {
        Self {
            epoch,
            treasury: Lovelace::zero(),
            reserves: Lovelace::zero(),
            rewards: Lovelace::zero(),
            deposits: Lovelace::zero(),
            fees_accrued: Lovelace::zero(),
            circulating_supply: Lovelace::zero(),
        }
    }

    /// Pots at the Shelley start epoch.
    pub fn genesis(network: &NetworkConfig) -> Self {
        Self {
            epoch: network.shelley_start_epoch,
            treasury: network.shelley_initial_treasury.clone(),
            reserves: network.shelley_initial_reserves.clone(),
            rewards: Lovelace::zero(),
            deposits: Lovelace::zero(),
            fees_accrued: Lovelace::zero(),
            circulating_supply: network.shelley_initial_utxo.clone(),
        }
    }

    /// Sum of every pot that partitions total supply.
    pub fn conserved_total(&self) -> Lovelace {
        &self.treasury
            + &self.reserves
            + &self.rewards
            + &self.deposits
            + &self.fees_accrued
            + &self.circulating_supply
    }

    /// Whether the pots add up to `total_supply`.
    pub fn is_conserved(&self, total_supply: &Lovelace) -> bool {
        &self.conserved_total() == total_supply
    }
}
