//! Deposit refunds and escheats.
//!
//! A pool's deposit is refunded at retirement only while its reward
//! account is still registered. Otherwise the treasury keeps it.

use adapot_numeric::{ensure_non_negative, Lovelace};
use adapot_types::{
    AccountAction, AccountUpdate, DepositDisposition, DepositSettlement, Epoch, PoolDeposit,
    PoolDeregistration,
};
use num_traits::Zero;

use crate::latest::latest_updates;
use crate::Result;

/// Settle the deposits of every pool in `retiring`.
///
/// Only updates from epochs up to and including `settled_through` are
/// considered. For each reward address the latest update decides:
/// a deregistration escheats the deposit, a registration or no update at
/// all refunds it. Pools sharing a reward address are settled one by one.
pub fn reconcile_deposits(
    retiring: &[PoolDeregistration],
    updates: &[AccountUpdate],
    settled_through: Epoch,
) -> DepositSettlement {
    let latest = latest_updates(
        updates
            .iter()
            .filter(|update| update.epoch <= settled_through)
            .filter(|update| {
                retiring
                    .iter()
                    .any(|pool| pool.reward_address == update.stake_address)
            }),
    );

    let mut pools: Vec<PoolDeposit> = retiring
        .iter()
        .map(|pool| {
            let disposition = match latest.get(&pool.reward_address).map(|update| update.action) {
                Some(AccountAction::Deregistration) => DepositDisposition::Escheated,
                Some(AccountAction::Registration) | None => DepositDisposition::Refunded,
            };
            if disposition == DepositDisposition::Escheated {
                tracing::info!(
                    pool_id = %pool.pool_id,
                    reward_address = %pool.reward_address,
                    deposit = %pool.deposit_amount,
                    "reward account deregistered, deposit goes to treasury"
                );
            }
            PoolDeposit {
                pool_id: pool.pool_id.clone(),
                reward_address: pool.reward_address.clone(),
                amount: pool.deposit_amount.clone(),
                disposition,
            }
        })
        .collect();
    pools.sort_by(|a, b| a.pool_id.cmp(&b.pool_id));

    let (escheated, refunded) = pools.iter().fold(
        (Lovelace::zero(), Lovelace::zero()),
        |(escheated, refunded), pool| match pool.disposition {
            DepositDisposition::Escheated => (escheated + &pool.amount, refunded),
            DepositDisposition::Refunded => (escheated, refunded + &pool.amount),
        },
    );

    DepositSettlement {
        pools,
        escheated,
        refunded,
    }
}

/// Deposits pot after an epoch: new deposits in, retired pool deposits out.
///
/// # Errors
///
/// - [`DepositError::Numeric`](crate::DepositError::Numeric) if the pot would
///   go negative
pub fn deposits_after_epoch(
    previous: &Lovelace,
    transaction_deposits: &Lovelace,
    released: &Lovelace,
) -> Result<Lovelace> {
    let deposits = previous + transaction_deposits - released;
    ensure_non_negative("deposits", &deposits)?;
    Ok(deposits)
}
