//! Reward formulas of the delegation design.
//!
//! Each division is rounded to 32 significant digits before it is used
//! again and every amount is floored, in the same order as the ledger rules,
//! so results agree with the chain to the lovelace.

use adapot_numeric::{divide, floor, lovelace_to_rate, min_rate, multiply_and_floor, ratio, Lovelace, Rate};
use adapot_types::ProtocolParameters;
use num_traits::{One, Zero};

use crate::Result;

/// Blocks minted by the pool relative to its share of active stake.
///
/// Fixed at 1 while `d >= 0.8`. A pool or epoch without stake, or an epoch
/// without pool blocks, has performance 0.
///
/// # Errors
///
/// - [`PoolError::Numeric`](crate::PoolError::Numeric) on a zero divisor
pub fn apparent_performance(
    pool_stake: &Lovelace,
    total_active_stake: &Lovelace,
    pool_blocks: u64,
    total_blocks: u64,
    decentralisation: &Rate,
) -> Result<Rate> {
    if decentralisation >= &Rate::new(8.into(), 1) {
        return Ok(Rate::one());
    }
    if pool_stake.is_zero() || total_active_stake.is_zero() || total_blocks == 0 {
        return Ok(Rate::zero());
    }
    let relative_blocks = ratio(&Lovelace::from(pool_blocks), &Lovelace::from(total_blocks))?;
    let relative_stake = ratio(pool_stake, total_active_stake)?;
    Ok(divide(&relative_blocks, &relative_stake)?)
}

/// Reward of a pool at perfect performance.
///
/// With `z0 = 1/k`, `σ' = min(σ, z0)` and `s' = min(s, z0)`:
///
/// ```text
/// R / (1 + a0) * (σ' + s' * a0 * (σ' - s' * (z0 - σ') / z0) / z0)
/// ```
///
/// # Errors
///
/// - [`PoolError::Numeric`](crate::PoolError::Numeric) on a zero divisor
pub fn optimal_reward(
    stake_pool_rewards_pot: &Lovelace,
    params: &ProtocolParameters,
    relative_stake: &Rate,
    relative_pledge: &Rate,
) -> Result<Lovelace> {
    let z0 = divide(&Rate::one(), &Rate::from(params.optimal_pool_count))?;
    let sigma = min_rate(relative_stake, &z0);
    let pledge = min_rate(relative_pledge, &z0);
    let a0 = &params.pool_owner_influence;

    let scaled_pot = divide(
        &lovelace_to_rate(stake_pool_rewards_pot),
        &(Rate::one() + a0),
    )?;
    let unsaturated = divide(&(&z0 - &sigma), &z0)?;
    let weight = divide(&(&sigma - &pledge * &unsaturated), &z0)?;

    Ok(floor(&(scaled_pot * (&sigma + &pledge * a0 * &weight))))
}

/// `floor(optimal * performance)`.
pub fn pool_reward(optimal: &Lovelace, performance: &Rate) -> Lovelace {
    multiply_and_floor(optimal, &[performance])
}

/// Operator share of `pool_reward`, owners' stake share included.
///
/// `cost + floor((R - cost) * (m + (1 - m) * s / σ))`, or all of `R` when it
/// does not exceed the cost.
///
/// # Errors
///
/// - [`PoolError::Numeric`](crate::PoolError::Numeric) on a zero pool stake
pub fn operator_reward(
    pool_reward: &Lovelace,
    margin: &Rate,
    fixed_cost: &Lovelace,
    relative_owner_stake: &Rate,
    relative_pool_stake: &Rate,
) -> Result<Lovelace> {
    if pool_reward <= fixed_cost {
        return Ok(pool_reward.clone());
    }
    let owner_share = divide(relative_owner_stake, relative_pool_stake)?;
    let share = margin + (Rate::one() - margin) * owner_share;
    Ok(fixed_cost + multiply_and_floor(&(pool_reward - fixed_cost), &[&share]))
}

/// Member share of `pool_reward` for one delegator.
///
/// `floor((R - cost) * (1 - m) * t / σ)`, or 0 when `R` does not exceed the
/// cost.
///
/// # Errors
///
/// - [`PoolError::Numeric`](crate::PoolError::Numeric) on a zero pool stake
pub fn member_reward(
    pool_reward: &Lovelace,
    margin: &Rate,
    fixed_cost: &Lovelace,
    relative_member_stake: &Rate,
    relative_pool_stake: &Rate,
) -> Result<Lovelace> {
    if pool_reward <= fixed_cost {
        return Ok(Lovelace::zero());
    }
    let numerator =
        lovelace_to_rate(&(pool_reward - fixed_cost)) * (Rate::one() - margin) * relative_member_stake;
    Ok(floor(&divide(&numerator, relative_pool_stake)?))
}
