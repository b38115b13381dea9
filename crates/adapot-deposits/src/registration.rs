//! Registration status of reward accounts at reward time.
//!
//! Rewards earned in epoch `e` are computed during `e + 1` and applied at
//! its end. Two snapshots of the registration history matter:
//!
//! - the cutoff, at the randomness stabilisation window of `e + 1`, when
//!   the reward calculation starts;
//! - the boundary, at the end of `e + 1`, when the rewards are applied.
//!
//! Before Vasil, accounts gone at the cutoff are filtered out of the
//! calculation and their share stays in the reserves. Accounts that leave
//! between cutoff and boundary earn rewards that nobody can receive, which
//! go to the treasury. From Vasil on there is no filtering at the cutoff,
//! so every deregistration falls into the second group.

use std::collections::BTreeMap;

use adapot_types::{AccountAction, AccountUpdate, Epoch, NetworkConfig, StakeAddress};
use serde::{Deserialize, Serialize};

use crate::latest::latest_updates;

/// Registration status of one account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Registered at both cutoff and boundary.
    Registered,
    /// No registration at or before the cutoff.
    NeverRegistered,
    /// Deregistered at the cutoff; filtered out of the calculation.
    Deregistered,
    /// Deregistered by the boundary; earned rewards are unspendable.
    LateDeregistered,
}

/// Registration history of a set of addresses, viewed from one reward
/// calculation.
#[derive(Clone, Debug, Default)]
pub struct RegistrationLedger {
    at_cutoff: BTreeMap<StakeAddress, AccountAction>,
    at_boundary: BTreeMap<StakeAddress, AccountAction>,
    registered_before_cutoff: BTreeMap<StakeAddress, bool>,
    vasil: bool,
}

impl RegistrationLedger {
    /// Build the ledger for rewards earned in `earned_epoch`.
    pub fn new(updates: &[AccountUpdate], earned_epoch: Epoch, network: &NetworkConfig) -> Self {
        let settlement_epoch = earned_epoch + 1;
        let vasil = network.is_vasil(earned_epoch);
        let window = if vasil {
            u64::MAX
        } else {
            network.randomness_stabilisation_window
        };

        let before_cutoff = |update: &&AccountUpdate| {
            update.epoch < settlement_epoch
                || (update.epoch == settlement_epoch && update.epoch_slot < window)
        };
        let until_boundary = |update: &&AccountUpdate| update.epoch <= settlement_epoch;

        let actions = |latest: BTreeMap<StakeAddress, &AccountUpdate>| {
            latest
                .into_iter()
                .map(|(address, update)| (address, update.action))
                .collect::<BTreeMap<_, _>>()
        };

        let mut registered_before_cutoff = BTreeMap::new();
        for update in updates.iter().filter(before_cutoff) {
            let seen = registered_before_cutoff
                .entry(update.stake_address.clone())
                .or_insert(false);
            *seen |= update.action == AccountAction::Registration;
        }

        Self {
            at_cutoff: actions(latest_updates(updates.iter().filter(before_cutoff))),
            at_boundary: actions(latest_updates(updates.iter().filter(until_boundary))),
            registered_before_cutoff,
            vasil,
        }
    }

    /// Status of `address`.
    pub fn status(&self, address: &str) -> AccountStatus {
        let cutoff = self.at_cutoff.get(address).copied();
        let boundary = self.at_boundary.get(address).copied();
        let ever_registered = self
            .registered_before_cutoff
            .get(address)
            .copied()
            .unwrap_or(false);

        match (cutoff, boundary) {
            (_, Some(AccountAction::Deregistration)) if self.vasil => {
                AccountStatus::LateDeregistered
            }
            (Some(AccountAction::Deregistration), _) => AccountStatus::Deregistered,
            (Some(AccountAction::Registration), Some(AccountAction::Deregistration)) => {
                AccountStatus::LateDeregistered
            }
            (None, Some(AccountAction::Deregistration)) => AccountStatus::Deregistered,
            _ if !ever_registered => AccountStatus::NeverRegistered,
            _ => AccountStatus::Registered,
        }
    }

    /// Status of a delegator in the stake snapshot.
    ///
    /// Delegators are registered by construction of the snapshot, so only
    /// deregistrations count.
    pub fn delegator_status(&self, address: &str) -> AccountStatus {
        match self.status(address) {
            AccountStatus::NeverRegistered => AccountStatus::Registered,
            status => status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 172_800;

    fn update(address: &str, action: AccountAction, epoch: Epoch, slot: u64) -> AccountUpdate {
        let absolute_slot = u64::from(epoch) * 432_000 + slot;
        AccountUpdate {
            stake_address: address.to_string(),
            action,
            epoch,
            epoch_slot: slot,
            absolute_slot,
            unix_block_time: 1_591_566_291 + absolute_slot,
        }
    }

    fn registered(address: &str) -> AccountUpdate {
        update(address, AccountAction::Registration, 210, 0)
    }

    #[test]
    fn test_pre_vasil_statuses() {
        let network = NetworkConfig::mainnet();
        let updates = vec![
            registered("stake1ok"),
            registered("stake1early"),
            update("stake1early", AccountAction::Deregistration, 301, WINDOW - 1),
            registered("stake1late"),
            update("stake1late", AccountAction::Deregistration, 301, WINDOW),
            update("stake1new", AccountAction::Registration, 301, WINDOW + 5),
            update("stake1future", AccountAction::Deregistration, 302, 0),
        ];
        let ledger = RegistrationLedger::new(&updates, 300, &network);

        assert_eq!(ledger.status("stake1ok"), AccountStatus::Registered);
        assert_eq!(ledger.status("stake1early"), AccountStatus::Deregistered);
        assert_eq!(ledger.status("stake1late"), AccountStatus::LateDeregistered);
        assert_eq!(ledger.status("stake1new"), AccountStatus::NeverRegistered);
        assert_eq!(ledger.status("stake1unknown"), AccountStatus::NeverRegistered);
        assert_eq!(ledger.status("stake1future"), AccountStatus::NeverRegistered);
        assert_eq!(ledger.delegator_status("stake1new"), AccountStatus::Registered);
    }

    #[test]
    fn test_vasil_makes_every_deregistration_late() {
        let network = NetworkConfig::mainnet();
        let updates = vec![
            registered("stake1early"),
            update("stake1early", AccountAction::Deregistration, 401, 10),
            update("stake1new", AccountAction::Registration, 401, WINDOW + 5),
        ];
        let ledger = RegistrationLedger::new(&updates, 400, &network);

        assert_eq!(ledger.status("stake1early"), AccountStatus::LateDeregistered);
        assert_eq!(ledger.status("stake1new"), AccountStatus::Registered);
    }

    #[test]
    fn test_reregistration_after_cutoff_still_filtered() {
        let network = NetworkConfig::mainnet();
        let updates = vec![
            registered("stake1a"),
            update("stake1a", AccountAction::Deregistration, 301, 10),
            update("stake1a", AccountAction::Registration, 301, WINDOW + 10),
        ];
        let ledger = RegistrationLedger::new(&updates, 300, &network);
        assert_eq!(ledger.status("stake1a"), AccountStatus::Deregistered);
    }
}
