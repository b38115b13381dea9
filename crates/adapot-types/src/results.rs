//! Computed results.
//!
//! Results are built once by the engine that owns them and never modified
//! afterwards. Collections are kept in sorted order so identical inputs
//! serialize to identical bytes.

use adapot_numeric::{serde_lovelace, serde_rate, Lovelace, Rate};
use serde::{Deserialize, Serialize};

use crate::pots::AdaPots;
use crate::{Epoch, PoolId, StakeAddress};

/// A single reward payout.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reward {
    /// Receiving stake address.
    pub stake_address: StakeAddress,
    /// Pool the reward was earned with.
    pub pool_id: PoolId,
    /// Amount paid.
    #[serde(with = "serde_lovelace")]
    pub amount: Lovelace,
}

/// Reward breakdown of one pool for one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRewardResult {
    /// Pool identifier.
    pub pool_id: PoolId,
    /// Epoch in which the rewards were earned.
    pub epoch: Epoch,
    /// Operator reward account.
    pub reward_address: StakeAddress,
    /// Blocks minted relative to the pool's stake share.
    #[serde(with = "serde_rate")]
    pub apparent_performance: Rate,
    /// Reward at perfect performance.
    #[serde(with = "serde_lovelace")]
    pub optimal_reward: Lovelace,
    /// Optimal reward scaled by performance.
    #[serde(with = "serde_lovelace")]
    pub pool_reward: Lovelace,
    /// Operator reward actually paid.
    #[serde(with = "serde_lovelace")]
    pub operator_reward: Lovelace,
    /// Member rewards actually paid, sorted by stake address.
    pub member_rewards: Vec<Reward>,
    /// Operator plus member rewards paid.
    #[serde(with = "serde_lovelace")]
    pub distributed_reward: Lovelace,
    /// Earned by accounts deregistered after the stake snapshot settled.
    /// Moves to the treasury.
    #[serde(with = "serde_lovelace")]
    pub unspendable_earned_rewards: Lovelace,
    /// Rounding remainders and shares of filtered accounts. Returns to
    /// reserves.
    #[serde(with = "serde_lovelace")]
    pub undistributed_remainder: Lovelace,
}

impl PoolRewardResult {
    /// A result with every amount zero.
    pub fn zero(pool_id: PoolId, epoch: Epoch, reward_address: StakeAddress) -> Self {
        Self {
            pool_id,
            epoch,
            reward_address,
            apparent_performance: Rate::from(0),
            optimal_reward: Lovelace::from(0),
            pool_reward: Lovelace::from(0),
            operator_reward: Lovelace::from(0),
            member_rewards: Vec::new(),
            distributed_reward: Lovelace::from(0),
            unspendable_earned_rewards: Lovelace::from(0),
            undistributed_remainder: Lovelace::from(0),
        }
    }
}

/// Treasury side of an epoch transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryTransition {
    /// Block-production correction factor.
    #[serde(with = "serde_rate")]
    pub eta: Rate,
    /// Monetary expansion plus fees.
    #[serde(with = "serde_lovelace")]
    pub reward_pot: Lovelace,
    /// Share of the reward pot taken by the treasury.
    #[serde(with = "serde_lovelace")]
    pub treasury_cut: Lovelace,
    /// Pool deposits kept by the treasury.
    #[serde(with = "serde_lovelace")]
    pub escheated_deposits: Lovelace,
    /// MIR transfers out of the treasury.
    #[serde(with = "serde_lovelace")]
    pub treasury_withdrawals: Lovelace,
    /// MIR transfers out of the reserves.
    #[serde(with = "serde_lovelace")]
    pub reserve_withdrawals: Lovelace,
    /// Unspendable rewards moved to the treasury.
    #[serde(with = "serde_lovelace")]
    pub unspendable_earned_rewards: Lovelace,
    /// Resulting treasury balance.
    #[serde(with = "serde_lovelace")]
    pub treasury: Lovelace,
}

/// Where a retiring pool's deposit goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositDisposition {
    /// Paid back to the still-registered reward account.
    Refunded,
    /// Kept by the treasury because the reward account is gone.
    Escheated,
}

/// Deposit outcome of one retiring pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDeposit {
    /// Retiring pool.
    pub pool_id: PoolId,
    /// Reward account of the pool.
    pub reward_address: StakeAddress,
    /// Deposit amount.
    #[serde(with = "serde_lovelace")]
    pub amount: Lovelace,
    /// Outcome.
    pub disposition: DepositDisposition,
}

/// Deposit outcomes of every pool retiring in an epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositSettlement {
    /// Per-pool outcomes, sorted by pool id.
    pub pools: Vec<PoolDeposit>,
    /// Sum of escheated deposits.
    #[serde(with = "serde_lovelace")]
    pub escheated: Lovelace,
    /// Sum of refunded deposits.
    #[serde(with = "serde_lovelace")]
    pub refunded: Lovelace,
}

impl DepositSettlement {
    /// Every deposit released this epoch, whichever way it went.
    pub fn released(&self) -> Lovelace {
        &self.escheated + &self.refunded
    }
}

/// Why a pool could not be computed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PoolFailureKind {
    /// The pool minted blocks but has no matching history record.
    InconsistentPoolData,
    /// The pool's own data made a formula fail.
    Computation(String),
}

/// A per-pool problem that did not stop the epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFailure {
    /// Affected pool.
    pub pool_id: PoolId,
    /// What went wrong.
    pub kind: PoolFailureKind,
}

/// Complete, internally consistent outcome of one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochResult {
    /// Epoch whose boundary was computed.
    pub epoch: Epoch,
    /// Pots after the boundary.
    pub pots: AdaPots,
    /// Monetary expansion plus fees.
    #[serde(with = "serde_lovelace")]
    pub total_reward_pot: Lovelace,
    /// Reward pot minus the treasury cut.
    #[serde(with = "serde_lovelace")]
    pub stake_pool_rewards_pot: Lovelace,
    /// Sum of rewards paid to accounts.
    #[serde(with = "serde_lovelace")]
    pub total_distributed_rewards: Lovelace,
    /// Stake pool rewards pot minus distributed rewards.
    #[serde(with = "serde_lovelace")]
    pub total_undistributed_rewards: Lovelace,
    /// Unspendable rewards moved to the treasury.
    #[serde(with = "serde_lovelace")]
    pub total_unspendable_rewards: Lovelace,
    /// Per-pool results, sorted by pool id.
    pub pool_rewards: Vec<PoolRewardResult>,
    /// Treasury transition.
    pub treasury: TreasuryTransition,
    /// Retiring pool deposits.
    pub deposits: DepositSettlement,
    /// Pools that could not be computed.
    pub pool_failures: Vec<PoolFailure>,
}
