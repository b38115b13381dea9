//! Chain fixtures shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;

use adapot_numeric::{parse_rate, BigDecimal, BigInt, Lovelace, Rate};
use adapot_provider::InMemoryProvider;
use adapot_types::{
    AccountAction, AccountUpdate, Delegator, Epoch, EpochInfo, MirCertificate, MirPot,
    NetworkConfig, PoolDeregistration, PoolState, ProtocolParameters,
};
use num_traits::ToPrimitive;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Mainnet slots per epoch.
pub const SLOTS_PER_EPOCH: u64 = 432_000;

/// Pools generated per earned epoch.
pub const POOLS_PER_EPOCH: usize = 12;

/// Rewards withdrawn in epoch 212 of [`random_chain`].
pub const WITHDRAWN_212: u64 = 500_000_000_000;

/// Mainnet Shelley start in seconds since the Unix epoch.
const SHELLEY_START_TIME: u64 = 1_596_059_091;

pub fn lovelace(amount: u64) -> Lovelace {
    Lovelace::from(amount)
}

/// Decentralisation given in tenths.
pub fn params(decentralisation_tenths: u64) -> ProtocolParameters {
    ProtocolParameters {
        decentralisation: Rate::new(BigInt::from(decentralisation_tenths), 1),
        ..NetworkConfig::mainnet().genesis_parameters
    }
}

pub fn decentralised(decentralisation: &str) -> ProtocolParameters {
    ProtocolParameters {
        decentralisation: parse_rate(decentralisation).expect("rate"),
        ..NetworkConfig::mainnet().genesis_parameters
    }
}

/// A certificate for `address` at `slot` within `epoch`.
pub fn account_update(address: &str, action: AccountAction, epoch: Epoch, slot: u64) -> AccountUpdate {
    let absolute_slot = u64::from(epoch) * SLOTS_PER_EPOCH + slot;
    AccountUpdate {
        stake_address: address.to_string(),
        action,
        epoch,
        epoch_slot: slot,
        absolute_slot,
        unix_block_time: SHELLEY_START_TIME + absolute_slot,
    }
}

pub fn registered(address: &str, epoch: Epoch) -> AccountUpdate {
    account_update(address, AccountAction::Registration, epoch, 0)
}

pub fn deregistered(address: &str, epoch: Epoch, slot: u64) -> AccountUpdate {
    account_update(address, AccountAction::Deregistration, epoch, slot)
}

pub fn retirement(pool_id: &str, reward_address: &str, epoch: Epoch) -> PoolDeregistration {
    PoolDeregistration {
        pool_id: pool_id.to_string(),
        reward_address: reward_address.to_string(),
        retiring_epoch: epoch,
        deposit_amount: NetworkConfig::mainnet().pool_deposit,
    }
}

/// A pool whose whole stake is delegated by its owner.
pub fn solo_pool(pool_id: &str, owner: &str, epoch: Epoch, stake: Lovelace, blocks: u64) -> PoolState {
    PoolState {
        pool_id: pool_id.to_string(),
        epoch,
        active_stake: stake.clone(),
        reward_address: owner.to_string(),
        owners: BTreeSet::from([owner.to_string()]),
        owner_active_stake: stake.clone(),
        margin: BigDecimal::from(0),
        fixed_cost: lovelace(340_000_000),
        pledge: lovelace(0),
        delegators: vec![Delegator {
            stake_address: owner.to_string(),
            active_stake: stake,
        }],
        block_count: blocks,
    }
}

/// Mainnet facts for settling epochs 208 to 214 with pseudo-random pools.
///
/// Pools are generated for earned epochs 208 to 212, each with
/// [`POOLS_PER_EPOCH`] pools whose blocks follow their stake. Every fifth
/// pool misses its pledge. The facts also carry one early and one late
/// member deregistration, a late operator deregistration, a refunded and an
/// escheated pool retirement, transaction deposits, a reserves MIR and a
/// reward withdrawal in 212.
pub fn random_chain(seed: u64) -> InMemoryProvider {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut provider = InMemoryProvider::new();

    for (epoch, tenths) in [(208, 10), (209, 10), (210, 9), (211, 7), (212, 5)] {
        provider = provider.with_protocol_parameters(epoch, params(tenths));

        let block_count = 21_600u64;
        let non_obft_block_count = block_count * (10 - tenths) / 10;
        let basis = if tenths >= 8 {
            block_count
        } else {
            non_obft_block_count
        };

        let pools: Vec<PoolState> = (0..POOLS_PER_EPOCH)
            .map(|index| random_pool(&mut rng, epoch, index))
            .collect();
        let active_stake: Lovelace = pools.iter().map(|pool| &pool.active_stake).sum();

        for mut pool in pools {
            pool.block_count = (lovelace(basis) * &pool.active_stake / &active_stake)
                .to_u64()
                .expect("block count");
            provider = provider.with_pool_state(pool);
        }
        provider = provider.with_epoch_info(EpochInfo {
            number: epoch,
            fees: lovelace(rng.gen_range(1_000_000_000..10_000_000_000)),
            block_count,
            non_obft_block_count,
            active_stake,
        });
    }

    for index in 0..POOLS_PER_EPOCH {
        provider = provider.with_account_update(registered(&reward_address(index), 200));
        for member in 0..4 {
            provider = provider.with_account_update(registered(&member_address(index, member), 200));
        }
    }

    provider
        .with_account_update(deregistered(&member_address(1, 0), 211, 1_000))
        .with_account_update(deregistered(&member_address(2, 0), 211, 300_000))
        .with_account_update(deregistered(&reward_address(3), 212, 250_000))
        .with_retirement(retirement("pool1retiringa", &reward_address(5), 212))
        .with_retirement(retirement("pool1retiringb", &reward_address(3), 213))
        .with_transaction_deposits(209, lovelace(20_000_000_000))
        .with_withdrawals(212, lovelace(WITHDRAWN_212))
        .with_mir_certificate(
            211,
            MirCertificate {
                pot: MirPot::Reserves,
                total_amount: lovelace(1_000_000_000_000),
            },
        )
}

pub fn reward_address(index: usize) -> String {
    format!("stake1reward{index:02}")
}

pub fn member_address(index: usize, member: usize) -> String {
    format!("stake1member{index:02}{member}")
}

fn random_pool(rng: &mut StdRng, epoch: Epoch, index: usize) -> PoolState {
    let owner = format!("stake1owner{index:02}");
    let owner_stake: u64 = rng.gen_range(1_000_000_000..2_000_000_000_000);

    let mut delegators = vec![Delegator {
        stake_address: owner.clone(),
        active_stake: lovelace(owner_stake),
    }];
    for member in 0..rng.gen_range(1..5) {
        delegators.push(Delegator {
            stake_address: member_address(index, member),
            active_stake: lovelace(rng.gen_range(1_000_000..50_000_000_000_000)),
        });
    }
    let active_stake: Lovelace = delegators.iter().map(|d| &d.active_stake).sum();

    let pledge = if index % 5 == 4 {
        owner_stake + 1
    } else {
        owner_stake / 2
    };

    PoolState {
        pool_id: format!("pool1e{epoch}n{index:02}"),
        epoch,
        active_stake,
        reward_address: reward_address(index),
        owners: BTreeSet::from([owner]),
        owner_active_stake: lovelace(owner_stake),
        margin: Rate::new(BigInt::from(rng.gen_range(0..100u32)), 3),
        fixed_cost: lovelace(340_000_000),
        pledge: lovelace(pledge),
        delegators,
        block_count: 0,
    }
}
