//! Typed stages of one epoch boundary.
//!
//! ```text
//! PendingEpoch --compute_pot--> PotComputed --compute_pools--> PoolsComputed --settle--> EpochResult
//! ```
//!
//! Each stage consumes the previous one, so a boundary cannot be settled
//! before its pools are computed, nor pools computed before the pot.

use std::collections::BTreeMap;

use adapot_deposits::{deposits_after_epoch, reconcile_deposits, RegistrationLedger};
use adapot_numeric::{ensure_non_negative, Lovelace, NumericError};
use adapot_pool::{calculate_pool_reward, PoolError, PoolRewardContext};
use adapot_pots::{settle_reserves, settle_treasury, ReserveSettlement, RewardPot, TreasurySettlement};
use adapot_types::{
    AdaPots, DepositSettlement, EpochResult, NetworkConfig, PoolFailure, PoolFailureKind, PoolId,
    PoolRewardResult, TreasuryTransition,
};
use num_traits::Zero;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::inputs::EpochInputs;
use crate::{EpochError, Result};

/// Inputs fetched, nothing computed yet.
#[derive(Debug)]
pub struct PendingEpoch<'a> {
    network: &'a NetworkConfig,
    inputs: EpochInputs,
    previous: &'a AdaPots,
}

impl<'a> PendingEpoch<'a> {
    pub fn new(network: &'a NetworkConfig, inputs: EpochInputs, previous: &'a AdaPots) -> Self {
        Self {
            network,
            inputs,
            previous,
        }
    }

    /// Compute the reward pot and treasury cut.
    ///
    /// # Errors
    ///
    /// - [`EpochError::InvalidParameterRange`] for out-of-range parameters
    /// - [`EpochError::NegativeAmount`] for negative reserves or fees
    pub fn compute_pot(self) -> Result<PotComputed<'a>> {
        let pot = RewardPot::compute(
            &self.previous.reserves,
            &self.inputs.params,
            &self.inputs.info,
            self.network,
        )?;
        tracing::debug!(
            epoch = self.inputs.epoch,
            reward_pot = %pot.reward_pot,
            stake_pool_rewards_pot = %pot.stake_pool_rewards_pot,
            "pot computed"
        );
        Ok(PotComputed {
            network: self.network,
            inputs: self.inputs,
            previous: self.previous,
            pot,
        })
    }
}

/// Reward pot known, pools not yet paid.
#[derive(Debug)]
pub struct PotComputed<'a> {
    network: &'a NetworkConfig,
    inputs: EpochInputs,
    previous: &'a AdaPots,
    pot: RewardPot,
}

impl<'a> PotComputed<'a> {
    pub fn pot(&self) -> &RewardPot {
        &self.pot
    }

    /// Compute every pool on `workers` and merge the results by pool id.
    ///
    /// A producer without a snapshot, or a pool whose own data breaks a
    /// formula, becomes a [`PoolFailure`] and earns nothing.
    ///
    /// # Errors
    ///
    /// - [`EpochError::InvalidParameterRange`] for a pool margin outside [0, 1]
    /// - [`EpochError::NegativeAmount`] for negative pool data or
    ///   overdrawn member rewards
    pub fn compute_pools(self, workers: &ThreadPool) -> Result<PoolsComputed<'a>> {
        let circulating_supply = &self.network.total_supply - &self.previous.reserves;
        let registrations = RegistrationLedger::new(
            &self.inputs.account_updates,
            self.inputs.earned_epoch,
            self.network,
        );
        let context = PoolRewardContext {
            earned_epoch: self.inputs.earned_epoch,
            stake_pool_rewards_pot: &self.pot.stake_pool_rewards_pot,
            circulating_supply: &circulating_supply,
            total_active_stake: &self.inputs.info.active_stake,
            total_blocks: self
                .inputs
                .info
                .blocks_produced_by_pools(&self.inputs.params.decentralisation),
            params: &self.inputs.params,
            network: self.network,
            registrations: &registrations,
            shared_reward_address_pools: &self.inputs.shared_reward_address_pools,
        };

        let outcomes: Vec<(PoolId, std::result::Result<PoolRewardResult, PoolError>)> =
            workers.install(|| {
                self.inputs
                    .pools
                    .par_iter()
                    .map(|(pool_id, pool)| (pool_id.clone(), calculate_pool_reward(pool, &context)))
                    .collect()
            });

        let mut rewards: BTreeMap<PoolId, PoolRewardResult> = BTreeMap::new();
        let mut failures: BTreeMap<PoolId, PoolFailureKind> = BTreeMap::new();
        for pool_id in &self.inputs.missing_pools {
            tracing::warn!(
                epoch = self.inputs.epoch,
                pool_id = %pool_id,
                "pool minted blocks but has no snapshot"
            );
            failures.insert(pool_id.clone(), PoolFailureKind::InconsistentPoolData);
        }
        for (pool_id, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    rewards.insert(pool_id, result);
                }
                Err(PoolError::InvalidParameterRange(err)) => return Err(err.into()),
                Err(PoolError::Numeric(err @ NumericError::NegativeAmount { .. })) => {
                    return Err(err.into())
                }
                Err(PoolError::Numeric(err)) => {
                    tracing::warn!(
                        epoch = self.inputs.epoch,
                        pool_id = %pool_id,
                        error = %err,
                        "pool reward could not be computed"
                    );
                    failures.insert(pool_id, PoolFailureKind::Computation(err.to_string()));
                }
            }
        }

        Ok(PoolsComputed {
            network: self.network,
            inputs: self.inputs,
            previous: self.previous,
            pot: self.pot,
            pool_rewards: rewards.into_values().collect(),
            pool_failures: failures
                .into_iter()
                .map(|(pool_id, kind)| PoolFailure { pool_id, kind })
                .collect(),
        })
    }

    /// Move on without paying any pool, for treasury-only calculations.
    pub fn skip_pools(self) -> PoolsComputed<'a> {
        PoolsComputed {
            network: self.network,
            inputs: self.inputs,
            previous: self.previous,
            pot: self.pot,
            pool_rewards: Vec::new(),
            pool_failures: Vec::new(),
        }
    }
}

/// Pools paid, pots not yet settled.
#[derive(Debug)]
pub struct PoolsComputed<'a> {
    network: &'a NetworkConfig,
    inputs: EpochInputs,
    previous: &'a AdaPots,
    pot: RewardPot,
    pool_rewards: Vec<PoolRewardResult>,
    pool_failures: Vec<PoolFailure>,
}

impl PoolsComputed<'_> {
    pub fn pool_rewards(&self) -> &[PoolRewardResult] {
        &self.pool_rewards
    }

    /// Settle deposits, treasury and reserves and build the new pots.
    ///
    /// # Errors
    ///
    /// - [`EpochError::NegativeAmount`] if any pot would go negative
    /// - [`EpochError::ConservationViolated`] if the pots do not add up to
    ///   the total supply
    pub fn settle(self) -> Result<EpochResult> {
        let epoch = self.inputs.epoch;
        let previous = self.previous;
        let pot = &self.pot;

        let deposits = reconcile_deposits(
            &self.inputs.retiring,
            &self.inputs.account_updates,
            epoch.saturating_sub(1),
        );

        let distributed: Lovelace = self.pool_rewards.iter().map(|r| &r.distributed_reward).sum();
        let unspendable: Lovelace = self
            .pool_rewards
            .iter()
            .map(|r| &r.unspendable_earned_rewards)
            .sum();
        let undistributed = &pot.stake_pool_rewards_pot - &distributed;
        ensure_non_negative("undistributed rewards", &undistributed)?;

        let treasury = settle_treasury(&TreasurySettlement {
            previous_treasury: &previous.treasury,
            pot,
            escheated_deposits: &deposits.escheated,
            mir_certificates: &self.inputs.mir_certificates,
            unspendable_earned_rewards: &unspendable,
        })?;

        let bootstrap_return = if epoch == self.network.allegra_hardfork_epoch {
            self.network.bootstrap_address_amount.clone()
        } else {
            Lovelace::zero()
        };
        let reserves = settle_reserves(&ReserveSettlement {
            previous_reserves: &previous.reserves,
            pot,
            reserve_withdrawals: &treasury.reserve_withdrawals,
            undistributed: &undistributed,
            unspendable_earned_rewards: &unspendable,
            bootstrap_return: &bootstrap_return,
        })?;

        let deposits_pot = deposits_after_epoch(
            &previous.deposits,
            &self.inputs.transaction_deposits,
            &deposits.released(),
        )?;
        let rewards = &previous.rewards
            + &distributed
            + &deposits.refunded
            + &treasury.treasury_withdrawals
            + &treasury.reserve_withdrawals
            - &self.inputs.withdrawals;
        ensure_non_negative("rewards", &rewards)?;
        let circulating_supply = &previous.circulating_supply
            - &self.inputs.transaction_deposits
            - &self.inputs.fees
            + &self.inputs.withdrawals
            - &bootstrap_return;
        ensure_non_negative("circulating supply", &circulating_supply)?;

        let pots = AdaPots {
            epoch,
            treasury: treasury.treasury.clone(),
            reserves,
            rewards,
            deposits: deposits_pot,
            fees_accrued: self.inputs.fees.clone(),
            circulating_supply,
        };
        if !pots.is_conserved(&self.network.total_supply) {
            return Err(EpochError::ConservationViolated {
                epoch,
                total: pots.conserved_total().to_string(),
                expected: self.network.total_supply.to_string(),
            });
        }

        tracing::info!(
            epoch,
            treasury = %pots.treasury,
            reserves = %pots.reserves,
            distributed = %distributed,
            unspendable = %unspendable,
            escheated = %deposits.escheated,
            pools = self.pool_rewards.len(),
            failures = self.pool_failures.len(),
            "epoch settled"
        );

        Ok(EpochResult {
            epoch,
            pots,
            total_reward_pot: pot.reward_pot.clone(),
            stake_pool_rewards_pot: pot.stake_pool_rewards_pot.clone(),
            total_distributed_rewards: distributed,
            total_undistributed_rewards: undistributed,
            total_unspendable_rewards: unspendable,
            pool_rewards: self.pool_rewards,
            treasury,
            deposits,
            pool_failures: self.pool_failures,
        })
    }
}

/// Result of a boundary that pays no rewards: before Shelley, or the
/// Shelley start itself.
pub(crate) fn unrewarded(pots: AdaPots) -> EpochResult {
    let pot = RewardPot::empty();
    EpochResult {
        epoch: pots.epoch,
        total_reward_pot: Lovelace::zero(),
        stake_pool_rewards_pot: Lovelace::zero(),
        total_distributed_rewards: Lovelace::zero(),
        total_undistributed_rewards: Lovelace::zero(),
        total_unspendable_rewards: Lovelace::zero(),
        pool_rewards: Vec::new(),
        treasury: TreasuryTransition {
            eta: pot.eta,
            reward_pot: pot.reward_pot,
            treasury_cut: pot.treasury_cut,
            escheated_deposits: Lovelace::zero(),
            treasury_withdrawals: Lovelace::zero(),
            reserve_withdrawals: Lovelace::zero(),
            unspendable_earned_rewards: Lovelace::zero(),
            treasury: pots.treasury.clone(),
        },
        deposits: DepositSettlement::default(),
        pool_failures: Vec::new(),
        pots,
    }
}
