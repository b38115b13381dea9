//! # adapot-types
//!
//! Shared value types for epoch reward recomputation.
//!
//! Every type here is an immutable, epoch-scoped snapshot. Amounts are
//! [`Lovelace`] and fractions are [`Rate`], both exact.
//!
//! ## Modules
//!
//! - [`pots`] — Ada pot snapshot and conservation
//! - [`chain`] — Chain facts read from a data source
//! - [`params`] — Protocol parameters and range checks
//! - [`network`] — Per-network constants and hard-fork epochs
//! - [`results`] — Computed per-pool and per-epoch results

pub mod chain;
pub mod network;
pub mod params;
pub mod pots;
pub mod results;

pub use adapot_numeric::{Lovelace, Rate};

pub use chain::{
    AccountAction, AccountUpdate, Delegator, EpochInfo, MirCertificate, MirPot, PoolBlocks,
    PoolDeregistration, PoolState,
};
pub use network::NetworkConfig;
pub use params::ProtocolParameters;
pub use pots::AdaPots;
pub use results::{
    DepositDisposition, DepositSettlement, EpochResult, PoolDeposit, PoolFailure,
    PoolFailureKind, PoolRewardResult, Reward, TreasuryTransition,
};

/// Epoch number.
pub type Epoch = u32;

/// Bech32 pool identifier.
pub type PoolId = String;

/// Bech32 stake address.
pub type StakeAddress = String;

/// Error types for type-level checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    /// A parameter lies outside its permitted range.
    #[error("{name} out of range: {value}")]
    InvalidParameterRange {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: String,
    },

    /// No preset exists for the network magic.
    #[error("unknown network magic: {0}")]
    UnknownNetwork(u32),

    /// No preset exists for the network name.
    #[error("unknown network name: {0}")]
    UnknownNetworkName(String),
}

/// Convenience result type for type-level checks.
pub type Result<T> = std::result::Result<T, TypesError>;
