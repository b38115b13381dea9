//! Field-by-field comparison of a computed epoch with the chain record.

use std::collections::BTreeMap;

use adapot_numeric::{serde_lovelace, Lovelace};
use adapot_types::{AdaPots, Epoch, EpochResult, PoolId, Reward, StakeAddress};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::finding::Finding;

/// Total reward the chain paid through one pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualPoolReward {
    pub pool_id: PoolId,
    #[serde(with = "serde_lovelace")]
    pub amount: Lovelace,
}

/// What the chain recorded for an epoch.
///
/// Pool and member rewards are optional; when absent only the pots are
/// compared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualEpoch {
    pub pots: AdaPots,
    #[serde(default)]
    pub pool_rewards: Option<Vec<ActualPoolReward>>,
    #[serde(default)]
    pub member_rewards: Option<Vec<Reward>>,
}

impl ActualEpoch {
    /// Record with pots only.
    pub fn from_pots(pots: AdaPots) -> Self {
        Self {
            pots,
            pool_rewards: None,
            member_rewards: None,
        }
    }
}

/// Offset of one pot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// Pot name.
    pub field: String,
    /// Value recorded on chain.
    #[serde(with = "serde_lovelace")]
    pub expected: Lovelace,
    /// Value computed.
    #[serde(with = "serde_lovelace")]
    pub computed: Lovelace,
    /// `expected - computed`.
    #[serde(with = "serde_lovelace")]
    pub offset: Lovelace,
    pub finding: Finding,
}

impl FieldDiff {
    fn new(field: &str, expected: &Lovelace, computed: &Lovelace, pool_deposit: &Lovelace) -> Self {
        let offset = expected - computed;
        Self {
            field: field.to_string(),
            finding: Finding::classify(&offset, pool_deposit),
            expected: expected.clone(),
            computed: computed.clone(),
            offset,
        }
    }
}

/// Offset of a pool total or a single member reward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDiff {
    pub pool_id: PoolId,
    /// Member address, or `None` for the pool total.
    pub stake_address: Option<StakeAddress>,
    #[serde(with = "serde_lovelace")]
    pub expected: Lovelace,
    #[serde(with = "serde_lovelace")]
    pub computed: Lovelace,
    #[serde(with = "serde_lovelace")]
    pub offset: Lovelace,
}

/// Every difference found in one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochDiff {
    pub epoch: Epoch,
    /// One entry per pot, matching or not.
    pub pots: Vec<FieldDiff>,
    /// Pools whose total reward differs, sorted by pool id.
    pub pools: Vec<RewardDiff>,
    /// Member rewards that differ, sorted by pool id and address.
    pub members: Vec<RewardDiff>,
}

impl EpochDiff {
    /// Whether everything compared matched.
    pub fn is_clean(&self) -> bool {
        self.pots.iter().all(|diff| diff.finding.is_match())
            && self.pools.is_empty()
            && self.members.is_empty()
    }

    /// Pots that do not match.
    pub fn mismatches(&self) -> impl Iterator<Item = &FieldDiff> {
        self.pots.iter().filter(|diff| !diff.finding.is_match())
    }

    /// Log the outcome: one line when clean, one warning per difference
    /// otherwise.
    pub fn report(&self) {
        if self.is_clean() {
            tracing::info!(epoch = self.epoch, "epoch matches chain");
            return;
        }
        for diff in self.mismatches() {
            tracing::warn!(
                epoch = self.epoch,
                field = %diff.field,
                expected = %diff.expected,
                computed = %diff.computed,
                offset = %diff.offset,
                finding = %diff.finding,
                "pot mismatch"
            );
        }
        for diff in &self.pools {
            tracing::warn!(
                epoch = self.epoch,
                pool_id = %diff.pool_id,
                offset = %diff.offset,
                "pool reward mismatch"
            );
        }
        if !self.members.is_empty() {
            tracing::warn!(
                epoch = self.epoch,
                members = self.members.len(),
                "member reward mismatches"
            );
        }
    }
}

/// Compare `result` with the chain record.
pub fn compare_epoch(result: &EpochResult, actual: &ActualEpoch, pool_deposit: &Lovelace) -> EpochDiff {
    let computed = &result.pots;
    let expected = &actual.pots;
    let pots = vec![
        FieldDiff::new("treasury", &expected.treasury, &computed.treasury, pool_deposit),
        FieldDiff::new("reserves", &expected.reserves, &computed.reserves, pool_deposit),
        FieldDiff::new("rewards", &expected.rewards, &computed.rewards, pool_deposit),
        FieldDiff::new("deposits", &expected.deposits, &computed.deposits, pool_deposit),
        FieldDiff::new("fees_accrued", &expected.fees_accrued, &computed.fees_accrued, pool_deposit),
        FieldDiff::new(
            "circulating_supply",
            &expected.circulating_supply,
            &computed.circulating_supply,
            pool_deposit,
        ),
    ];

    let pools = match &actual.pool_rewards {
        Some(recorded) => {
            let expected = recorded
                .iter()
                .map(|pool| ((pool.pool_id.clone(), None), pool.amount.clone()));
            let computed = result
                .pool_rewards
                .iter()
                .map(|pool| ((pool.pool_id.clone(), None), pool.distributed_reward.clone()));
            reward_diffs(expected, computed)
        }
        None => Vec::new(),
    };

    let members = match &actual.member_rewards {
        Some(recorded) => {
            let key = |reward: &Reward| (reward.pool_id.clone(), Some(reward.stake_address.clone()));
            let expected = recorded.iter().map(|r| (key(r), r.amount.clone()));
            let computed = result
                .pool_rewards
                .iter()
                .flat_map(|pool| pool.member_rewards.iter())
                .map(|r| (key(r), r.amount.clone()));
            reward_diffs(expected, computed)
        }
        None => Vec::new(),
    };

    EpochDiff {
        epoch: result.epoch,
        pots,
        pools,
        members,
    }
}

type RewardKey = (PoolId, Option<StakeAddress>);

/// Differences between two reward sets; a key missing on one side counts
/// as zero there. Amounts under the same key are summed.
fn reward_diffs(
    expected: impl Iterator<Item = (RewardKey, Lovelace)>,
    computed: impl Iterator<Item = (RewardKey, Lovelace)>,
) -> Vec<RewardDiff> {
    let mut sides: BTreeMap<RewardKey, (Lovelace, Lovelace)> = BTreeMap::new();
    for (key, amount) in expected {
        sides.entry(key).or_insert_with(|| (Lovelace::zero(), Lovelace::zero())).0 += amount;
    }
    for (key, amount) in computed {
        sides.entry(key).or_insert_with(|| (Lovelace::zero(), Lovelace::zero())).1 += amount;
    }
    sides
        .into_iter()
        .filter(|(_, (expected, computed))| expected != computed)
        .map(|((pool_id, stake_address), (expected, computed))| RewardDiff {
            pool_id,
            stake_address,
            offset: &expected - &computed,
            expected,
            computed,
        })
        .collect()
}
