//! In-memory chain facts.
//!
//! [`ChainFacts`] is the serialized form: flat lists and per-epoch maps
//! that a JSON export can fill directly. [`InMemoryProvider`] indexes it
//! once and answers every [`DataProvider`] call from memory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use adapot_numeric::{serde_lovelace, Lovelace};
use adapot_types::{
    AccountUpdate, AdaPots, Epoch, EpochInfo, MirCertificate, PoolBlocks, PoolDeregistration,
    PoolId, PoolState, ProtocolParameters, StakeAddress,
};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::{DataProvider, Result};

/// An amount moved by the transactions of one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochAmount {
    /// Epoch of the transactions.
    pub epoch: Epoch,
    /// Total amount.
    #[serde(with = "serde_lovelace")]
    pub amount: Lovelace,
}

/// Serialized set of chain facts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainFacts {
    #[serde(default)]
    pub ada_pots: Vec<AdaPots>,
    #[serde(default)]
    pub epoch_infos: Vec<EpochInfo>,
    /// Parameters keyed by the epoch they are in force.
    #[serde(default)]
    pub protocol_parameters: BTreeMap<Epoch, ProtocolParameters>,
    #[serde(default)]
    pub pool_states: Vec<PoolState>,
    /// Block counts keyed by epoch. Epochs without an entry derive them
    /// from `pool_states`.
    #[serde(default)]
    pub pool_blocks: BTreeMap<Epoch, Vec<PoolBlocks>>,
    #[serde(default)]
    pub retired_pools: Vec<PoolDeregistration>,
    #[serde(default)]
    pub account_updates: Vec<AccountUpdate>,
    /// MIR certificates keyed by the epoch they were issued in.
    #[serde(default)]
    pub mir_certificates: BTreeMap<Epoch, Vec<MirCertificate>>,
    #[serde(default)]
    pub shared_reward_address_pools: BTreeMap<Epoch, BTreeSet<PoolId>>,
    /// Net key and pool deposits per epoch.
    #[serde(default)]
    pub transaction_deposits: Vec<EpochAmount>,
    /// Reward withdrawals per epoch.
    #[serde(default)]
    pub withdrawals: Vec<EpochAmount>,
}

/// [`DataProvider`] over facts held in memory.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProvider {
    ada_pots: BTreeMap<Epoch, AdaPots>,
    epoch_infos: BTreeMap<Epoch, EpochInfo>,
    protocol_parameters: BTreeMap<Epoch, ProtocolParameters>,
    pool_states: BTreeMap<(Epoch, PoolId), PoolState>,
    pool_blocks: BTreeMap<Epoch, Vec<PoolBlocks>>,
    retired_pools: BTreeMap<Epoch, Vec<PoolDeregistration>>,
    account_updates: Vec<AccountUpdate>,
    mir_certificates: BTreeMap<Epoch, Vec<MirCertificate>>,
    shared_reward_address_pools: BTreeMap<Epoch, BTreeSet<PoolId>>,
    transaction_deposits: BTreeMap<Epoch, Lovelace>,
    withdrawals: BTreeMap<Epoch, Lovelace>,
}

impl InMemoryProvider {
    /// Empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a fact set. Later entries replace earlier ones for the same key.
    pub fn from_facts(facts: ChainFacts) -> Self {
        let mut provider = Self::new();
        for pots in facts.ada_pots {
            provider = provider.with_ada_pots(pots);
        }
        for info in facts.epoch_infos {
            provider = provider.with_epoch_info(info);
        }
        provider.protocol_parameters = facts.protocol_parameters;
        for pool in facts.pool_states {
            provider = provider.with_pool_state(pool);
        }
        provider.pool_blocks = facts.pool_blocks;
        for retirement in facts.retired_pools {
            provider = provider.with_retirement(retirement);
        }
        provider.account_updates = facts.account_updates;
        provider.mir_certificates = facts.mir_certificates;
        provider.shared_reward_address_pools = facts.shared_reward_address_pools;
        for deposits in facts.transaction_deposits {
            provider = provider.with_transaction_deposits(deposits.epoch, deposits.amount);
        }
        for withdrawals in facts.withdrawals {
            provider = provider.with_withdrawals(withdrawals.epoch, withdrawals.amount);
        }
        provider
    }

    /// Parse a JSON fact set.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Malformed`](crate::ProviderError::Malformed) if the
    ///   JSON does not describe a [`ChainFacts`]
    pub fn from_json(json: &str) -> Result<Self> {
        let facts: ChainFacts = serde_json::from_str(json)?;
        Ok(Self::from_facts(facts))
    }

    /// Read and parse a JSON fact file.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Backend`](crate::ProviderError::Backend) if the
    ///   file cannot be read
    /// - [`ProviderError::Malformed`](crate::ProviderError::Malformed) if it
    ///   cannot be parsed
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let provider = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            epochs = provider.epoch_infos.len(),
            pools = provider.pool_states.len(),
            "chain facts loaded"
        );
        Ok(provider)
    }

    pub fn with_ada_pots(mut self, pots: AdaPots) -> Self {
        self.ada_pots.insert(pots.epoch, pots);
        self
    }

    pub fn with_epoch_info(mut self, info: EpochInfo) -> Self {
        self.epoch_infos.insert(info.number, info);
        self
    }

    pub fn with_protocol_parameters(mut self, epoch: Epoch, params: ProtocolParameters) -> Self {
        self.protocol_parameters.insert(epoch, params);
        self
    }

    pub fn with_pool_state(mut self, pool: PoolState) -> Self {
        self.pool_states.insert((pool.epoch, pool.pool_id.clone()), pool);
        self
    }

    /// Record block counts for `epoch`, overriding those derived from
    /// pool snapshots.
    pub fn with_pool_blocks(mut self, epoch: Epoch, blocks: Vec<PoolBlocks>) -> Self {
        self.pool_blocks.insert(epoch, blocks);
        self
    }

    pub fn with_retirement(mut self, retirement: PoolDeregistration) -> Self {
        self.retired_pools
            .entry(retirement.retiring_epoch)
            .or_default()
            .push(retirement);
        self
    }

    pub fn with_account_update(mut self, update: AccountUpdate) -> Self {
        self.account_updates.push(update);
        self
    }

    pub fn with_mir_certificate(mut self, epoch: Epoch, certificate: MirCertificate) -> Self {
        self.mir_certificates.entry(epoch).or_default().push(certificate);
        self
    }

    pub fn with_shared_reward_address_pool(mut self, epoch: Epoch, pool_id: PoolId) -> Self {
        self.shared_reward_address_pools
            .entry(epoch)
            .or_default()
            .insert(pool_id);
        self
    }

    pub fn with_transaction_deposits(mut self, epoch: Epoch, amount: Lovelace) -> Self {
        self.transaction_deposits.insert(epoch, amount);
        self
    }

    pub fn with_withdrawals(mut self, epoch: Epoch, amount: Lovelace) -> Self {
        self.withdrawals.insert(epoch, amount);
        self
    }
}

impl DataProvider for InMemoryProvider {
    fn ada_pots(&self, epoch: Epoch) -> Result<Option<AdaPots>> {
        Ok(self.ada_pots.get(&epoch).cloned())
    }

    fn epoch_info(&self, epoch: Epoch) -> Result<Option<EpochInfo>> {
        Ok(self.epoch_infos.get(&epoch).cloned())
    }

    fn protocol_parameters(&self, epoch: Epoch) -> Result<Option<ProtocolParameters>> {
        Ok(self.protocol_parameters.get(&epoch).cloned())
    }

    fn pool_states_producing_blocks(&self, epoch: Epoch) -> Result<Vec<PoolState>> {
        Ok(self
            .pool_states
            .range((epoch, PoolId::new())..)
            .take_while(|((pool_epoch, _), _)| *pool_epoch == epoch)
            .map(|(_, pool)| pool)
            .filter(|pool| pool.block_count > 0)
            .cloned()
            .collect())
    }

    fn pool_history(&self, pool_id: &str, epoch: Epoch) -> Result<Option<PoolState>> {
        Ok(self.pool_states.get(&(epoch, pool_id.to_string())).cloned())
    }

    fn retired_pools(&self, epoch: Epoch) -> Result<Vec<PoolDeregistration>> {
        Ok(self.retired_pools.get(&epoch).cloned().unwrap_or_default())
    }

    fn account_updates_until(
        &self,
        addresses: &BTreeSet<StakeAddress>,
        epoch: Epoch,
    ) -> Result<Vec<AccountUpdate>> {
        Ok(self
            .account_updates
            .iter()
            .filter(|update| update.epoch <= epoch && addresses.contains(&update.stake_address))
            .cloned()
            .collect())
    }

    fn mir_certificates(&self, epoch: Epoch) -> Result<Vec<MirCertificate>> {
        Ok(self.mir_certificates.get(&epoch).cloned().unwrap_or_default())
    }

    fn pool_blocks(&self, epoch: Epoch) -> Result<Vec<PoolBlocks>> {
        if let Some(blocks) = self.pool_blocks.get(&epoch) {
            return Ok(blocks.clone());
        }
        Ok(self
            .pool_states_producing_blocks(epoch)?
            .into_iter()
            .map(|pool| PoolBlocks {
                pool_id: pool.pool_id,
                block_count: pool.block_count,
            })
            .collect())
    }

    fn shared_reward_address_pools(&self, epoch: Epoch) -> Result<BTreeSet<PoolId>> {
        Ok(self
            .shared_reward_address_pools
            .get(&epoch)
            .cloned()
            .unwrap_or_default())
    }

    fn transaction_deposits(&self, epoch: Epoch) -> Result<Lovelace> {
        Ok(self
            .transaction_deposits
            .get(&epoch)
            .cloned()
            .unwrap_or_else(Lovelace::zero))
    }

    fn withdrawals(&self, epoch: Epoch) -> Result<Lovelace> {
        Ok(self
            .withdrawals
            .get(&epoch)
            .cloned()
            .unwrap_or_else(Lovelace::zero))
    }
}
