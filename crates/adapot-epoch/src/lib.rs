//! # adapot-epoch
//!
//! Epoch orchestration.
//!
//! An epoch boundary is settled in strict order: the reward pot first,
//! then every pool (in parallel), then deposits, treasury and reserves.
//! Epochs themselves are sequential because each one starts from the pots
//! the previous one produced.
//!
//! ## Modules
//!
//! - [`inputs`] — Facts fetched up front for one epoch, with the two-epoch lag
//! - [`stages`] — Typed stages of a single epoch boundary
//! - [`calculator`] — Epoch and range calculation over a data provider
//! - [`range`] — Epoch ranges, checkpoints and cancellation

pub mod calculator;
pub mod inputs;
pub mod range;
pub mod stages;

pub use calculator::EpochCalculator;
pub use inputs::{EpochInputs, FetchScope};
pub use range::{CancelToken, Checkpoint, EpochRange, RangeOutcome};
pub use stages::{PendingEpoch, PoolsComputed, PotComputed};

use adapot_deposits::DepositError;
use adapot_numeric::NumericError;
use adapot_pots::PotError;
use adapot_provider::ProviderError;
use adapot_types::{Epoch, TypesError};

/// Error types for epoch orchestration. Every variant halts the batch.
#[derive(Debug, thiserror::Error)]
pub enum EpochError {
    /// Lagged chain facts needed by the epoch are absent.
    #[error("missing {what} for epoch {epoch}")]
    MissingUpstreamData {
        /// Kind of fact.
        what: &'static str,
        /// Epoch the fact belongs to.
        epoch: Epoch,
    },

    /// A parameter from the data source lies outside its permitted range.
    #[error(transparent)]
    InvalidParameterRange(#[from] TypesError),

    /// A balance or intermediate amount went negative.
    #[error("{what} is negative: {value}")]
    NegativeAmount {
        /// Name of the amount.
        what: String,
        /// Offending value.
        value: String,
    },

    /// Arithmetic failed.
    #[error(transparent)]
    Numeric(NumericError),

    /// The data source failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The checkpoint does not end right before the requested range.
    #[error("checkpoint settles epoch {checkpoint}, range starts at {start}")]
    CheckpointMismatch {
        /// Last epoch settled by the checkpoint.
        checkpoint: Epoch,
        /// First epoch of the range.
        start: Epoch,
    },

    /// The computed pots do not add up to the total supply.
    #[error("pots of epoch {epoch} sum to {total}, expected {expected}")]
    ConservationViolated {
        /// Settled epoch.
        epoch: Epoch,
        /// Sum of the computed pots.
        total: String,
        /// Network total supply.
        expected: String,
    },

    /// An epoch range ends before it starts.
    #[error("invalid epoch range {start}..={end}")]
    InvalidRange {
        /// First epoch.
        start: Epoch,
        /// Last epoch.
        end: Epoch,
    },

    /// The worker pool could not be started.
    #[error("worker pool: {0}")]
    WorkerPool(String),
}

impl From<NumericError> for EpochError {
    fn from(err: NumericError) -> Self {
        match err {
            NumericError::NegativeAmount { what, value } => Self::NegativeAmount { what, value },
            other => Self::Numeric(other),
        }
    }
}

impl From<PotError> for EpochError {
    fn from(err: PotError) -> Self {
        match err {
            PotError::InvalidParameterRange(err) => Self::InvalidParameterRange(err),
            PotError::Numeric(err) => err.into(),
        }
    }
}

impl From<DepositError> for EpochError {
    fn from(err: DepositError) -> Self {
        match err {
            DepositError::Numeric(err) => err.into(),
        }
    }
}

/// Convenience result type for epoch orchestration.
pub type Result<T> = std::result::Result<T, EpochError>;
