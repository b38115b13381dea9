//! # adapot-pots
//!
//! Pot transition at an epoch boundary.
//!
//! Monetary expansion moves a share of the reserves, together with the
//! fees, into the reward pot. The treasury takes its cut and the remainder
//! is handed to the pool reward engine. Once the pools are settled, whatever
//! was not paid out flows back into the reserves.
//!
//! ## Modules
//!
//! - [`reward_pot`] — Eta, reward pot and treasury cut
//! - [`settle`] — New treasury and reserves balances

pub mod reward_pot;
pub mod settle;

pub use reward_pot::{eta, reward_pot, treasury_cut, RewardPot};
pub use settle::{
    mir_withdrawals, settle_reserves, settle_treasury, ReserveSettlement, TreasurySettlement,
};

use adapot_numeric::NumericError;
use adapot_types::TypesError;

/// Error types for pot transitions.
#[derive(Debug, thiserror::Error)]
pub enum PotError {
    /// A parameter lies outside its permitted range.
    #[error(transparent)]
    InvalidParameterRange(#[from] TypesError),

    /// Arithmetic failed or produced a negative balance.
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Convenience result type for pot transitions.
pub type Result<T> = std::result::Result<T, PotError>;
