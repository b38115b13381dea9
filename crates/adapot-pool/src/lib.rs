//! # adapot-pool
//!
//! Per-pool reward calculation.
//!
//! Each pool is computed independently from an immutable snapshot of its
//! stake, its blocks and the epoch's parameters, so pools can be processed
//! in any order and on any thread.
//!
//! ## Modules
//!
//! - [`formulas`] — Performance, optimal reward, operator and member shares
//! - [`engine`] — Full per-pool flow with registration and era rules

pub mod engine;
pub mod formulas;

pub use engine::{calculate_pool_reward, PoolRewardContext};
pub use formulas::{apparent_performance, member_reward, operator_reward, optimal_reward, pool_reward};

use adapot_numeric::NumericError;
use adapot_types::TypesError;

/// Error types for pool reward calculation.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Pool or protocol parameter outside its permitted range.
    #[error(transparent)]
    InvalidParameterRange(#[from] TypesError),

    /// Arithmetic failed or an amount went negative.
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Convenience result type for pool reward calculation.
pub type Result<T> = std::result::Result<T, PoolError>;
