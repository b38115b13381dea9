//! Facts needed to settle one epoch boundary.
//!
//! The boundary at the start of epoch `e` pays the rewards earned in
//! `e - 2`. Parameters, block counts, the fees swept into the reward pot and
//! pool snapshots therefore all come from `e - 2`. MIR certificates,
//! transaction deposits, the fees left in the fee pot and reward withdrawals
//! come from `e - 1`; retirements take effect in `e`. Everything is fetched
//! once, before any arithmetic starts.

use std::collections::{BTreeMap, BTreeSet};

use adapot_numeric::Lovelace;
use adapot_provider::DataProvider;
use adapot_types::{
    AccountUpdate, Epoch, EpochInfo, MirCertificate, NetworkConfig, PoolDeregistration, PoolId,
    PoolState, ProtocolParameters, StakeAddress,
};
use num_traits::Zero;

use crate::{EpochError, Result};

/// How much of an epoch's facts to fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchScope {
    /// Everything, including pool snapshots and their delegators.
    Full,
    /// Only what the treasury transition needs.
    TreasuryOnly,
}

/// Immutable facts of one epoch boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct EpochInputs {
    /// Epoch whose boundary is settled.
    pub epoch: Epoch,
    /// Epoch whose rewards are paid, `epoch - 2`.
    pub earned_epoch: Epoch,
    /// Parameters of the earned epoch.
    pub params: ProtocolParameters,
    /// Block and fee totals of the earned epoch.
    pub info: EpochInfo,
    /// Snapshots of the pools that minted in the earned epoch, by pool id.
    pub pools: BTreeMap<PoolId, PoolState>,
    /// Pools that minted in the earned epoch but have no snapshot.
    pub missing_pools: Vec<PoolId>,
    /// Pools retiring at this boundary.
    pub retiring: Vec<PoolDeregistration>,
    /// MIR certificates of the previous epoch.
    pub mir_certificates: Vec<MirCertificate>,
    /// Registration history of every relevant stake address up to the
    /// previous epoch.
    pub account_updates: Vec<AccountUpdate>,
    /// Pools sharing their reward address with another pool.
    pub shared_reward_address_pools: BTreeSet<PoolId>,
    /// Deposits paid in the previous epoch.
    pub transaction_deposits: Lovelace,
    /// Fees paid in the previous epoch, held in the fee pot at the boundary.
    pub fees: Lovelace,
    /// Reward withdrawals of the previous epoch.
    pub withdrawals: Lovelace,
}

impl EpochInputs {
    /// Fetch the facts for the boundary at the start of `epoch`.
    ///
    /// When the earned epoch precedes the Shelley start there is no stake
    /// distribution yet: genesis parameters and an empty epoch are used and
    /// no pool is paid.
    ///
    /// # Errors
    ///
    /// - [`EpochError::MissingUpstreamData`] if parameters or epoch facts of
    ///   an earned epoch at or after the Shelley start are absent
    /// - [`EpochError::Provider`] if the data source fails
    pub fn fetch<P: DataProvider>(
        provider: &P,
        network: &NetworkConfig,
        epoch: Epoch,
        scope: FetchScope,
    ) -> Result<Self> {
        let earned_epoch = epoch.saturating_sub(2);
        let previous_epoch = epoch.saturating_sub(1);
        let before_rewards = earned_epoch < network.shelley_start_epoch;

        let (params, info) = if before_rewards {
            (network.genesis_parameters.clone(), EpochInfo::empty(earned_epoch))
        } else {
            let params = provider
                .protocol_parameters(earned_epoch)?
                .ok_or(EpochError::MissingUpstreamData {
                    what: "protocol parameters",
                    epoch: earned_epoch,
                })?;
            let info = provider
                .epoch_info(earned_epoch)?
                .ok_or(EpochError::MissingUpstreamData {
                    what: "epoch info",
                    epoch: earned_epoch,
                })?;
            (params, info)
        };

        let (pools, missing_pools, shared_reward_address_pools) =
            if before_rewards || scope == FetchScope::TreasuryOnly {
                (BTreeMap::new(), Vec::new(), BTreeSet::new())
            } else {
                let (pools, missing) = fetch_pools(provider, earned_epoch)?;
                let shared = provider.shared_reward_address_pools(earned_epoch)?;
                (pools, missing, shared)
            };

        let retiring = provider.retired_pools(epoch)?;
        let mir_certificates = provider.mir_certificates(previous_epoch)?;
        let (transaction_deposits, fees) = if epoch > network.shelley_start_epoch {
            (
                provider.transaction_deposits(previous_epoch)?,
                provider.fees(previous_epoch)?,
            )
        } else {
            (Lovelace::zero(), Lovelace::zero())
        };
        // No reward account holds anything before the first reward payout.
        let withdrawals = if epoch > network.shelley_start_epoch.saturating_add(1) {
            provider.withdrawals(previous_epoch)?
        } else {
            Lovelace::zero()
        };

        let mut addresses: BTreeSet<StakeAddress> = retiring
            .iter()
            .map(|pool| pool.reward_address.clone())
            .collect();
        for pool in pools.values() {
            addresses.insert(pool.reward_address.clone());
            addresses.extend(pool.delegators.iter().map(|d| d.stake_address.clone()));
        }
        let account_updates = if addresses.is_empty() {
            Vec::new()
        } else {
            provider.account_updates_until(&addresses, previous_epoch)?
        };

        tracing::debug!(
            epoch,
            earned_epoch,
            pools = pools.len(),
            missing_pools = missing_pools.len(),
            retiring = retiring.len(),
            account_updates = account_updates.len(),
            "epoch inputs fetched"
        );

        Ok(Self {
            epoch,
            earned_epoch,
            params,
            info,
            pools,
            missing_pools,
            retiring,
            mir_certificates,
            account_updates,
            shared_reward_address_pools,
            transaction_deposits,
            fees,
            withdrawals,
        })
    }
}

/// Snapshots of every producing pool, plus the producers without one.
fn fetch_pools<P: DataProvider>(
    provider: &P,
    epoch: Epoch,
) -> Result<(BTreeMap<PoolId, PoolState>, Vec<PoolId>)> {
    let mut pools: BTreeMap<PoolId, PoolState> = provider
        .pool_states_producing_blocks(epoch)?
        .into_iter()
        .map(|pool| (pool.pool_id.clone(), pool))
        .collect();

    let mut missing = Vec::new();
    for producer in provider.pool_blocks(epoch)? {
        if pools.contains_key(&producer.pool_id) {
            continue;
        }
        match provider.pool_history(&producer.pool_id, epoch)? {
            Some(pool) => {
                pools.insert(pool.pool_id.clone(), pool);
            }
            None => missing.push(producer.pool_id),
        }
    }
    missing.sort();
    missing.dedup();
    Ok((pools, missing))
}
