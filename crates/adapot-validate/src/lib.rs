//! # adapot-validate
//!
//! Comparison of computed epochs with what the chain recorded.
//!
//! Differences are reported, never corrected. An offset that is an exact
//! multiple of the pool deposit points at deposit settlement rather than at
//! the reward formulas, and is reported as such.
//!
//! ## Modules
//!
//! - [`finding`] — Classification of a single offset
//! - [`diff`] — Per-pot, per-pool and per-member comparison

pub mod diff;
pub mod finding;

pub use diff::{compare_epoch, ActualEpoch, ActualPoolReward, EpochDiff, FieldDiff, RewardDiff};
pub use finding::Finding;
