//! # adapot-deposits
//!
//! Account registration state and pool deposit settlement.
//!
//! A retiring pool's deposit goes back to its reward account if that
//! account is still registered, and to the treasury otherwise. The same
//! registration history decides which reward accounts can receive rewards.
//!
//! ## Modules
//!
//! - [`latest`] — Latest update per stake address
//! - [`reconcile`] — Deposit refunds and escheats, deposits pot
//! - [`registration`] — Registration status at reward time

pub mod latest;
pub mod reconcile;
pub mod registration;

pub use latest::latest_updates;
pub use reconcile::{deposits_after_epoch, reconcile_deposits};
pub use registration::{AccountStatus, RegistrationLedger};

use adapot_numeric::NumericError;

/// Error types for deposit bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum DepositError {
    /// The deposits pot would go negative.
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Convenience result type for deposit bookkeeping.
pub type Result<T> = std::result::Result<T, DepositError>;
