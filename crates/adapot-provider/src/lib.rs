//! # adapot-provider
//!
//! Access to historical chain facts.
//!
//! The reward engines never perform I/O. Everything they read comes through
//! [`DataProvider`], which a deployment implements on top of whatever
//! source it has: an indexer API, a database snapshot, flat files.
//!
//! ## Modules
//!
//! - [`memory`] — In-memory provider, built in code or loaded from JSON

pub mod memory;

pub use memory::{ChainFacts, EpochAmount, InMemoryProvider};

use std::collections::BTreeSet;

use adapot_numeric::Lovelace;
use adapot_types::{
    AccountUpdate, AdaPots, Epoch, EpochInfo, MirCertificate, PoolBlocks, PoolDeregistration,
    PoolId, PoolState, ProtocolParameters, StakeAddress,
};
use num_traits::Zero;

/// Error types for data providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The backing source failed to answer.
    #[error("data source error: {0}")]
    Backend(String),

    /// The backing source answered with data that cannot be decoded.
    #[error("malformed chain data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Convenience result type for data providers.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Read-only source of chain facts.
///
/// `Ok(None)` means the source has no record; an `Err` means the source
/// could not be asked. Implementations must be shareable across the worker
/// threads of a calculation.
pub trait DataProvider: Send + Sync {
    /// Pots recorded at the end of `epoch`.
    fn ada_pots(&self, epoch: Epoch) -> Result<Option<AdaPots>>;

    /// Block, fee and stake totals of `epoch`.
    fn epoch_info(&self, epoch: Epoch) -> Result<Option<EpochInfo>>;

    /// Parameters in force during `epoch`.
    fn protocol_parameters(&self, epoch: Epoch) -> Result<Option<ProtocolParameters>>;

    /// Snapshots of the pools that minted blocks in `epoch`.
    fn pool_states_producing_blocks(&self, epoch: Epoch) -> Result<Vec<PoolState>>;

    /// Snapshot of one pool in `epoch`.
    fn pool_history(&self, pool_id: &str, epoch: Epoch) -> Result<Option<PoolState>>;

    /// Pools whose retirement takes effect at the start of `epoch`.
    fn retired_pools(&self, epoch: Epoch) -> Result<Vec<PoolDeregistration>>;

    /// Registration updates of `addresses` from any epoch up to and
    /// including `epoch`.
    fn account_updates_until(
        &self,
        addresses: &BTreeSet<StakeAddress>,
        epoch: Epoch,
    ) -> Result<Vec<AccountUpdate>>;

    /// MIR certificates issued in `epoch`.
    fn mir_certificates(&self, epoch: Epoch) -> Result<Vec<MirCertificate>>;

    /// Block counts of every pool that minted in `epoch`.
    ///
    /// Sources that index blocks separately from pool snapshots should
    /// override this, so that producers without a snapshot are detected.
    fn pool_blocks(&self, epoch: Epoch) -> Result<Vec<PoolBlocks>> {
        Ok(self
            .pool_states_producing_blocks(epoch)?
            .into_iter()
            .map(|pool| PoolBlocks {
                pool_id: pool.pool_id,
                block_count: pool.block_count,
            })
            .collect())
    }

    /// Pools of `epoch` whose reward address is shared with another pool.
    fn shared_reward_address_pools(&self, _epoch: Epoch) -> Result<BTreeSet<PoolId>> {
        Ok(BTreeSet::new())
    }

    /// Key and pool deposits paid by transactions in `epoch`, net of
    /// key deposit refunds.
    fn transaction_deposits(&self, _epoch: Epoch) -> Result<Lovelace> {
        Ok(Lovelace::zero())
    }

    /// Fees paid by transactions in `epoch`.
    ///
    /// Defaults to the fee total of [`epoch_info`](Self::epoch_info), zero
    /// when the epoch is unknown.
    fn fees(&self, epoch: Epoch) -> Result<Lovelace> {
        Ok(self
            .epoch_info(epoch)?
            .map_or_else(Lovelace::zero, |info| info.fees))
    }

    /// Reward account withdrawals made by transactions in `epoch`.
    fn withdrawals(&self, _epoch: Epoch) -> Result<Lovelace> {
        Ok(Lovelace::zero())
    }
}
