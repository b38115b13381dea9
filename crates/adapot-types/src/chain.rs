//! Chain facts consumed by the reward engines.
//!
//! These are read-only snapshots supplied by a data provider. None of them
//! is modified once it enters the engines.

use std::collections::BTreeSet;

use adapot_numeric::{serde_lovelace, serde_rate, Lovelace, Rate};
use num_traits::Signed;
use serde::{Deserialize, Serialize};

use crate::params::ensure_unit_interval;
use crate::{Epoch, PoolId, Result, StakeAddress};

/// Per-epoch block and stake totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochInfo {
    /// Epoch number.
    pub number: Epoch,
    /// Fees collected in the epoch.
    #[serde(with = "serde_lovelace")]
    pub fees: Lovelace,
    /// All blocks, including those minted by genesis delegates.
    pub block_count: u64,
    /// Blocks minted by stake pools.
    pub non_obft_block_count: u64,
    /// Total active stake of the epoch's stake distribution.
    #[serde(with = "serde_lovelace")]
    pub active_stake: Lovelace,
}

impl EpochInfo {
    /// Facts for an epoch without blocks or fees.
    pub fn empty(number: Epoch) -> Self {
        Self {
            number,
            fees: Lovelace::from(0),
            block_count: 0,
            non_obft_block_count: 0,
            active_stake: Lovelace::from(0),
        }
    }

    /// Blocks attributed to stake pools under decentralisation `d`.
    ///
    /// While genesis delegates still mint part of the blocks (`0 < d < 0.8`)
    /// only pool-minted blocks count. Otherwise every block counts.
    pub fn blocks_produced_by_pools(&self, decentralisation: &Rate) -> u64 {
        let threshold = Rate::new(8.into(), 1);
        if decentralisation.is_positive() && decentralisation < &threshold {
            self.non_obft_block_count
        } else {
            self.block_count
        }
    }
}

/// A stake address and the stake it delegates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegator {
    /// Delegating stake address.
    pub stake_address: StakeAddress,
    /// Active stake in the snapshot.
    #[serde(with = "serde_lovelace")]
    pub active_stake: Lovelace,
}

/// Blocks minted by one pool in an epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBlocks {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Number of blocks minted.
    pub block_count: u64,
}

/// Registration snapshot of one pool in one epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Epoch of the stake snapshot.
    pub epoch: Epoch,
    /// Stake delegated to the pool.
    #[serde(with = "serde_lovelace")]
    pub active_stake: Lovelace,
    /// Reward account of the operator.
    pub reward_address: StakeAddress,
    /// Owner stake addresses.
    pub owners: BTreeSet<StakeAddress>,
    /// Stake delegated to the pool by its owners.
    #[serde(with = "serde_lovelace")]
    pub owner_active_stake: Lovelace,
    /// Operator margin in [0, 1].
    #[serde(with = "serde_rate")]
    pub margin: Rate,
    /// Fixed cost per epoch.
    #[serde(with = "serde_lovelace")]
    pub fixed_cost: Lovelace,
    /// Declared pledge.
    #[serde(with = "serde_lovelace")]
    pub pledge: Lovelace,
    /// Everyone delegating to the pool, owners included.
    pub delegators: Vec<Delegator>,
    /// Blocks minted by the pool.
    pub block_count: u64,
}

impl PoolState {
    /// Reject a margin outside [0, 1].
    ///
    /// # Errors
    ///
    /// - [`TypesError::InvalidParameterRange`](crate::TypesError::InvalidParameterRange)
    pub fn validate(&self) -> Result<()> {
        ensure_unit_interval("margin", &self.margin)
    }
}

/// Kind of stake-address certificate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountAction {
    /// Stake address registration.
    Registration,
    /// Stake address deregistration.
    Deregistration,
}

/// A registration or deregistration of a stake address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    /// Stake address the certificate applies to.
    pub stake_address: StakeAddress,
    /// What happened.
    pub action: AccountAction,
    /// Epoch of the block carrying the certificate.
    pub epoch: Epoch,
    /// Slot within that epoch.
    pub epoch_slot: u64,
    /// Slot since chain start.
    pub absolute_slot: u64,
    /// Block time in seconds since the Unix epoch.
    pub unix_block_time: u64,
}

/// A pool retirement taking effect in `retiring_epoch`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDeregistration {
    /// Retiring pool.
    pub pool_id: PoolId,
    /// Reward account that would receive the refund.
    pub reward_address: StakeAddress,
    /// Epoch the retirement takes effect.
    pub retiring_epoch: Epoch,
    /// Deposit held for the pool.
    #[serde(with = "serde_lovelace")]
    pub deposit_amount: Lovelace,
}

/// Pot a MIR certificate draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MirPot {
    /// Drawn from reserves.
    Reserves,
    /// Drawn from treasury.
    Treasury,
}

/// A move-instantaneous-rewards transfer into reward accounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirCertificate {
    /// Source pot.
    pub pot: MirPot,
    /// Total moved by the certificate.
    #[serde(with = "serde_lovelace")]
    pub total_amount: Lovelace,
}
