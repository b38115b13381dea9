//! New treasury and reserves balances.
//!
//! The treasury receives its cut, escheated pool deposits and unspendable
//! rewards, and pays out treasury-funded MIR transfers. The reserves lose
//! the monetary expansion and reserve-funded MIR transfers, and regain
//! whatever the pools did not distribute.

use adapot_numeric::{ensure_non_negative, Lovelace};
use adapot_types::{MirCertificate, MirPot, TreasuryTransition};
use num_traits::Zero;

use crate::reward_pot::RewardPot;
use crate::Result;

/// Totals of MIR transfers per source pot, as `(treasury, reserves)`.
pub fn mir_withdrawals(certificates: &[MirCertificate]) -> (Lovelace, Lovelace) {
    certificates.iter().fold(
        (Lovelace::zero(), Lovelace::zero()),
        |(treasury, reserves), mir| match mir.pot {
            MirPot::Treasury => (treasury + &mir.total_amount, reserves),
            MirPot::Reserves => (treasury, reserves + &mir.total_amount),
        },
    )
}

/// Inputs of the treasury update.
#[derive(Debug, Clone, Copy)]
pub struct TreasurySettlement<'a> {
    /// Treasury at the previous boundary.
    pub previous_treasury: &'a Lovelace,
    /// This boundary's reward pot.
    pub pot: &'a RewardPot,
    /// Pool deposits the treasury keeps.
    pub escheated_deposits: &'a Lovelace,
    /// MIR certificates issued in the previous epoch.
    pub mir_certificates: &'a [MirCertificate],
    /// Rewards earned by accounts that can no longer receive them.
    pub unspendable_earned_rewards: &'a Lovelace,
}

/// `treasury + cut + escheated - treasury MIRs + unspendable`.
///
/// # Errors
///
/// - [`PotError::Numeric`](crate::PotError::Numeric) if the result is negative
pub fn settle_treasury(settlement: &TreasurySettlement<'_>) -> Result<TreasuryTransition> {
    let (treasury_withdrawals, reserve_withdrawals) = mir_withdrawals(settlement.mir_certificates);

    let treasury = settlement.previous_treasury + &settlement.pot.treasury_cut
        + settlement.escheated_deposits
        - &treasury_withdrawals
        + settlement.unspendable_earned_rewards;
    ensure_non_negative("treasury", &treasury)?;

    Ok(TreasuryTransition {
        eta: settlement.pot.eta.clone(),
        reward_pot: settlement.pot.reward_pot.clone(),
        treasury_cut: settlement.pot.treasury_cut.clone(),
        escheated_deposits: settlement.escheated_deposits.clone(),
        treasury_withdrawals,
        reserve_withdrawals,
        unspendable_earned_rewards: settlement.unspendable_earned_rewards.clone(),
        treasury,
    })
}

/// Inputs of the reserves update.
#[derive(Debug, Clone, Copy)]
pub struct ReserveSettlement<'a> {
    /// Reserves at the previous boundary.
    pub previous_reserves: &'a Lovelace,
    /// This boundary's reward pot.
    pub pot: &'a RewardPot,
    /// Reserve-funded MIR transfers.
    pub reserve_withdrawals: &'a Lovelace,
    /// Stake pool rewards pot minus rewards paid.
    pub undistributed: &'a Lovelace,
    /// Part of `undistributed` that goes to the treasury instead.
    pub unspendable_earned_rewards: &'a Lovelace,
    /// Byron bootstrap-address value returned at the Allegra boundary.
    pub bootstrap_return: &'a Lovelace,
}

/// `reserves - (reward_pot - fees) - reserve MIRs + undistributed - unspendable + bootstrap`.
///
/// # Errors
///
/// - [`PotError::Numeric`](crate::PotError::Numeric) if the result is negative
pub fn settle_reserves(settlement: &ReserveSettlement<'_>) -> Result<Lovelace> {
    let expansion = &settlement.pot.reward_pot - &settlement.pot.fees;
    let reserves = settlement.previous_reserves - &expansion - settlement.reserve_withdrawals
        + settlement.undistributed
        - settlement.unspendable_earned_rewards
        + settlement.bootstrap_return;
    ensure_non_negative("reserves", &reserves)?;
    Ok(reserves)
}
