//! Per-pool reward flow.
//!
//! 1. pools without blocks earn nothing;
//! 2. apparent performance from blocks and stake;
//! 3. pools whose owners do not cover the pledge earn nothing;
//! 4. optimal reward from the saturation curve, scaled by performance;
//! 5. operator share, then one member share per non-owner delegator;
//! 6. shares of accounts that cannot receive them are either left
//!    undistributed or marked unspendable, depending on the era.

use std::collections::BTreeSet;

use adapot_deposits::{AccountStatus, RegistrationLedger};
use adapot_numeric::{ensure_non_negative, ratio, Lovelace};
use adapot_types::{
    Epoch, NetworkConfig, PoolId, PoolRewardResult, PoolState, ProtocolParameters, Reward,
};
use num_traits::Zero;

use crate::formulas::{apparent_performance, member_reward, operator_reward, optimal_reward, pool_reward};
use crate::Result;

/// Epoch-wide inputs shared by every pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolRewardContext<'a> {
    /// Epoch in which the rewards were earned.
    pub earned_epoch: Epoch,
    /// Reward pot minus the treasury cut.
    pub stake_pool_rewards_pot: &'a Lovelace,
    /// Total supply minus previous reserves.
    pub circulating_supply: &'a Lovelace,
    /// Active stake of the epoch.
    pub total_active_stake: &'a Lovelace,
    /// Blocks minted by pools, on the same basis as eta.
    pub total_blocks: u64,
    /// Parameters of the earned epoch.
    pub params: &'a ProtocolParameters,
    /// Network constants.
    pub network: &'a NetworkConfig,
    /// Registration history of reward accounts and delegators.
    pub registrations: &'a RegistrationLedger,
    /// Pools whose shared reward address receives no leader reward
    /// before Allegra.
    pub shared_reward_address_pools: &'a BTreeSet<PoolId>,
}

/// Compute the rewards of one pool.
///
/// # Errors
///
/// - [`PoolError::InvalidParameterRange`](crate::PoolError::InvalidParameterRange)
///   for a margin outside [0, 1]
/// - [`PoolError::Numeric`](crate::PoolError::Numeric) for negative inputs,
///   zero divisors, or member shares exceeding the pool reward
pub fn calculate_pool_reward(
    pool: &PoolState,
    context: &PoolRewardContext<'_>,
) -> Result<PoolRewardResult> {
    pool.validate()?;
    ensure_non_negative("pool stake", &pool.active_stake)?;
    ensure_non_negative("fixed cost", &pool.fixed_cost)?;
    ensure_non_negative("pledge", &pool.pledge)?;

    let zero = PoolRewardResult::zero(
        pool.pool_id.clone(),
        context.earned_epoch,
        pool.reward_address.clone(),
    );
    if pool.block_count == 0 {
        return Ok(zero);
    }

    let performance = apparent_performance(
        &pool.active_stake,
        context.total_active_stake,
        pool.block_count,
        context.total_blocks,
        &context.params.decentralisation,
    )?;

    if pool.owner_active_stake < pool.pledge {
        tracing::debug!(
            pool_id = %pool.pool_id,
            owner_stake = %pool.owner_active_stake,
            pledge = %pool.pledge,
            "pledge not met, pool earns nothing"
        );
        return Ok(PoolRewardResult {
            apparent_performance: performance,
            ..zero
        });
    }

    let relative_pool_stake = ratio(&pool.active_stake, context.circulating_supply)?;
    let relative_pledge = ratio(&pool.pledge, context.circulating_supply)?;
    let optimal = optimal_reward(
        context.stake_pool_rewards_pot,
        context.params,
        &relative_pool_stake,
        &relative_pledge,
    )?;
    let reward = pool_reward(&optimal, &performance);

    let pre_allegra = context.network.is_pre_allegra(context.earned_epoch);
    let vasil = context.network.is_vasil(context.earned_epoch);
    let mut unspendable = Lovelace::zero();

    let earned_by_operator = operator_reward(
        &reward,
        &pool.margin,
        &pool.fixed_cost,
        &ratio(&pool.owner_active_stake, context.circulating_supply)?,
        &relative_pool_stake,
    )?;
    let mut operator = match context.registrations.status(&pool.reward_address) {
        AccountStatus::Registered => earned_by_operator,
        AccountStatus::NeverRegistered => {
            if vasil {
                unspendable += &earned_by_operator;
            }
            Lovelace::zero()
        }
        AccountStatus::Deregistered => Lovelace::zero(),
        AccountStatus::LateDeregistered => {
            unspendable += &earned_by_operator;
            Lovelace::zero()
        }
    };
    if pre_allegra && context.shared_reward_address_pools.contains(&pool.pool_id) {
        tracing::debug!(pool_id = %pool.pool_id, "reward address shared with another pool, leader reward dropped");
        operator = Lovelace::zero();
    }

    let mut member_rewards = Vec::with_capacity(pool.delegators.len());
    for delegator in &pool.delegators {
        let address = &delegator.stake_address;
        // Before Allegra, leader and member rewards to the same account did
        // not aggregate; the leader reward won.
        if pre_allegra && address == &pool.reward_address {
            continue;
        }
        if pool.owners.contains(address) {
            continue;
        }

        let amount = member_reward(
            &reward,
            &pool.margin,
            &pool.fixed_cost,
            &ratio(&delegator.active_stake, context.circulating_supply)?,
            &relative_pool_stake,
        )?;
        match context.registrations.delegator_status(address) {
            AccountStatus::Deregistered => {}
            AccountStatus::LateDeregistered => unspendable += &amount,
            AccountStatus::Registered | AccountStatus::NeverRegistered => {
                if !amount.is_zero() {
                    member_rewards.push(Reward {
                        stake_address: address.clone(),
                        pool_id: pool.pool_id.clone(),
                        amount,
                    });
                }
            }
        }
    }
    member_rewards.sort();

    let members_total: Lovelace = member_rewards.iter().map(|r| &r.amount).sum();
    let distributed = &operator + &members_total;
    let remainder = &reward - &distributed - &unspendable;
    ensure_non_negative("undistributed pool reward", &remainder)?;

    tracing::debug!(
        pool_id = %pool.pool_id,
        performance = %performance,
        pool_reward = %reward,
        operator = %operator,
        members = member_rewards.len(),
        "pool reward computed"
    );

    Ok(PoolRewardResult {
        apparent_performance: performance,
        optimal_reward: optimal,
        pool_reward: reward,
        operator_reward: operator,
        member_rewards,
        distributed_reward: distributed,
        unspendable_earned_rewards: unspendable,
        undistributed_remainder: remainder,
        ..zero
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapot_numeric::parse_rate;
    use adapot_types::{AccountAction, AccountUpdate, Delegator};

    const CIRCULATING: u64 = 33_000_000_000_000_000;
    const ACTIVE: u64 = 22_000_000_000_000_000;
    const POT: u64 = 20_000_000_000_000;

    struct Fixture {
        network: NetworkConfig,
        params: ProtocolParameters,
        pot: Lovelace,
        circulating: Lovelace,
        active: Lovelace,
        shared: BTreeSet<PoolId>,
    }

    impl Fixture {
        fn new() -> Self {
            let network = NetworkConfig::mainnet();
            let params = ProtocolParameters {
                decentralisation: parse_rate("0").expect("rate"),
                optimal_pool_count: 500,
                pool_owner_influence: parse_rate("0.3").expect("rate"),
                ..network.genesis_parameters.clone()
            };
            Self {
                network,
                params,
                pot: Lovelace::from(POT),
                circulating: Lovelace::from(CIRCULATING),
                active: Lovelace::from(ACTIVE),
                shared: BTreeSet::new(),
            }
        }

        fn context<'a>(&'a self, earned_epoch: Epoch, ledger: &'a RegistrationLedger) -> PoolRewardContext<'a> {
            PoolRewardContext {
                earned_epoch,
                stake_pool_rewards_pot: &self.pot,
                circulating_supply: &self.circulating,
                total_active_stake: &self.active,
                total_blocks: 21_600,
                params: &self.params,
                network: &self.network,
                registrations: ledger,
                shared_reward_address_pools: &self.shared,
            }
        }
    }

    fn registration(address: &str, action: AccountAction, epoch: Epoch, slot: u64) -> AccountUpdate {
        AccountUpdate {
            stake_address: address.to_string(),
            action,
            epoch,
            epoch_slot: slot,
            absolute_slot: u64::from(epoch) * 432_000 + slot,
            unix_block_time: 1_600_000_000 + u64::from(epoch) * 432_000 + slot,
        }
    }

    fn ledger(earned_epoch: Epoch, extra: Vec<AccountUpdate>) -> RegistrationLedger {
        let mut updates = vec![registration("stake1reward", AccountAction::Registration, 210, 0)];
        updates.extend(extra);
        RegistrationLedger::new(&updates, earned_epoch, &NetworkConfig::mainnet())
    }

    fn delegator(address: &str, ada: u64) -> Delegator {
        Delegator {
            stake_address: address.to_string(),
            active_stake: Lovelace::from(ada * 1_000_000),
        }
    }

    fn pool() -> PoolState {
        PoolState {
            pool_id: "pool1test".to_string(),
            epoch: 300,
            active_stake: Lovelace::from(30_000_000_000_000u64),
            reward_address: "stake1reward".to_string(),
            owners: BTreeSet::from(["stake1owner".to_string()]),
            owner_active_stake: Lovelace::from(600_000_000_000u64),
            margin: parse_rate("0.02").expect("rate"),
            fixed_cost: Lovelace::from(340_000_000u64),
            pledge: Lovelace::from(500_000_000_000u64),
            delegators: vec![
                delegator("stake1owner", 600_000),
                delegator("stake1alice", 20_000_000),
                delegator("stake1bob", 9_400_000),
            ],
            block_count: 30,
        }
    }

    fn paid_to(result: &PoolRewardResult, address: &str) -> Option<Lovelace> {
        result
            .member_rewards
            .iter()
            .find(|reward| reward.stake_address == address)
            .map(|reward| reward.amount.clone())
    }

    #[test]
    fn test_reference_pool() {
        let fixture = Fixture::new();
        let ledger = ledger(300, Vec::new());
        let result = calculate_pool_reward(&pool(), &fixture.context(300, &ledger)).expect("reward");

        assert_eq!(result.apparent_performance, parse_rate("1.0185185185185185185185185185185").expect("rate"));
        assert_eq!(result.optimal_reward, Lovelace::from(14_017_511_414u64));
        assert_eq!(result.pool_reward, Lovelace::from(14_277_094_958u64));
        assert_eq!(result.operator_reward, Lovelace::from(891_908_960u64));
        assert_eq!(paid_to(&result, "stake1alice"), Some(Lovelace::from(9_105_568_705u64)));
        assert_eq!(paid_to(&result, "stake1bob"), Some(Lovelace::from(4_279_617_291u64)));
        assert_eq!(paid_to(&result, "stake1owner"), None);
        assert_eq!(result.distributed_reward, Lovelace::from(14_277_094_956u64));
        assert!(result.unspendable_earned_rewards.is_zero());
        assert_eq!(
            &result.distributed_reward + &result.undistributed_remainder,
            result.pool_reward
        );
    }

    #[test]
    fn test_no_blocks_no_reward() {
        let fixture = Fixture::new();
        let ledger = ledger(300, Vec::new());
        let mut idle = pool();
        idle.block_count = 0;
        let result = calculate_pool_reward(&idle, &fixture.context(300, &ledger)).expect("reward");
        assert_eq!(result, PoolRewardResult::zero("pool1test".into(), 300, "stake1reward".into()));
    }

    #[test]
    fn test_empty_pool_is_zero_not_error() {
        let fixture = Fixture::new();
        let ledger = ledger(300, Vec::new());
        let mut empty = pool();
        empty.active_stake = Lovelace::zero();
        empty.owner_active_stake = Lovelace::zero();
        empty.pledge = Lovelace::zero();
        empty.delegators.clear();
        let result = calculate_pool_reward(&empty, &fixture.context(300, &ledger)).expect("reward");
        assert!(result.pool_reward.is_zero());
        assert!(result.distributed_reward.is_zero());
    }

    #[test]
    fn test_pledge_not_met() {
        let fixture = Fixture::new();
        let ledger = ledger(300, Vec::new());
        let mut short = pool();
        short.owner_active_stake = Lovelace::from(499_999_999_999u64);
        let result = calculate_pool_reward(&short, &fixture.context(300, &ledger)).expect("reward");
        assert!(result.pool_reward.is_zero());
        assert!(!result.apparent_performance.is_zero());
    }

    #[test]
    fn test_deregistered_delegators() {
        let fixture = Fixture::new();
        let ledger = ledger(
            300,
            vec![
                registration("stake1alice", AccountAction::Registration, 210, 5),
                registration("stake1bob", AccountAction::Registration, 210, 6),
                registration("stake1alice", AccountAction::Deregistration, 301, 10),
                registration("stake1bob", AccountAction::Deregistration, 301, 200_000),
            ],
        );
        let result = calculate_pool_reward(&pool(), &fixture.context(300, &ledger)).expect("reward");

        // Alice left before the stability window: her share stays undistributed.
        // Bob left after it: his share is unspendable.
        assert_eq!(paid_to(&result, "stake1alice"), None);
        assert_eq!(paid_to(&result, "stake1bob"), None);
        assert_eq!(result.unspendable_earned_rewards, Lovelace::from(4_279_617_291u64));
        assert_eq!(result.operator_reward, Lovelace::from(891_908_960u64));
        assert_eq!(
            &result.distributed_reward + &result.unspendable_earned_rewards + &result.undistributed_remainder,
            result.pool_reward
        );
    }

    #[test]
    fn test_unregistered_reward_address_by_era() {
        let fixture = Fixture::new();
        let empty: Vec<AccountUpdate> = Vec::new();

        let before_vasil = RegistrationLedger::new(&empty, 300, &fixture.network);
        let result = calculate_pool_reward(&pool(), &fixture.context(300, &before_vasil)).expect("reward");
        assert!(result.operator_reward.is_zero());
        assert!(result.unspendable_earned_rewards.is_zero());

        let after_vasil = RegistrationLedger::new(&empty, 400, &fixture.network);
        let result = calculate_pool_reward(&pool(), &fixture.context(400, &after_vasil)).expect("reward");
        assert!(result.operator_reward.is_zero());
        assert_eq!(result.unspendable_earned_rewards, Lovelace::from(891_908_960u64));
    }

    #[test]
    fn test_pre_allegra_rules() {
        let mut fixture = Fixture::new();
        fixture.shared.insert("pool1test".to_string());
        let mut self_delegating = pool();
        self_delegating.delegators[2].stake_address = "stake1reward".to_string();

        let before = ledger(220, Vec::new());
        let result =
            calculate_pool_reward(&self_delegating, &fixture.context(220, &before)).expect("reward");
        assert!(result.operator_reward.is_zero());
        assert_eq!(paid_to(&result, "stake1reward"), None);

        // From Allegra on, both rules are gone.
        let after = ledger(240, Vec::new());
        let result =
            calculate_pool_reward(&self_delegating, &fixture.context(240, &after)).expect("reward");
        assert_eq!(result.operator_reward, Lovelace::from(891_908_960u64));
        assert_eq!(paid_to(&result, "stake1reward"), Some(Lovelace::from(4_279_617_291u64)));
    }

    #[test]
    fn test_invalid_margin_rejected() {
        let fixture = Fixture::new();
        let ledger = ledger(300, Vec::new());
        let mut bad = pool();
        bad.margin = parse_rate("1.5").expect("rate");
        let result = calculate_pool_reward(&bad, &fixture.context(300, &ledger));
        assert!(matches!(result, Err(crate::PoolError::InvalidParameterRange(_))));
    }

    #[test]
    fn test_overdelegated_snapshot_rejected() {
        let fixture = Fixture::new();
        let ledger = ledger(300, Vec::new());
        let mut inconsistent = pool();
        inconsistent.delegators.push(delegator("stake1ghost", 30_000_000));
        let result = calculate_pool_reward(&inconsistent, &fixture.context(300, &ledger));
        assert!(matches!(result, Err(crate::PoolError::Numeric(_))));
    }
}
