//! Latest update per stake address.

use std::collections::BTreeMap;

use adapot_types::{AccountAction, AccountUpdate, Epoch, StakeAddress};

// Block time first, then slot. The remaining fields only separate records
// that agree on both, which keeps the choice independent of input order.
fn ordering_key(update: &AccountUpdate) -> (u64, u64, AccountAction, Epoch, u64) {
    (
        update.unix_block_time,
        update.absolute_slot,
        update.action,
        update.epoch,
        update.epoch_slot,
    )
}

/// Keep only the most recent update of every stake address.
///
/// The update with the latest `unix_block_time` wins; ties go to the higher
/// `absolute_slot`. The result does not depend on the order of `updates`.
pub fn latest_updates<'a, I>(updates: I) -> BTreeMap<StakeAddress, &'a AccountUpdate>
where
    I: IntoIterator<Item = &'a AccountUpdate>,
{
    let mut latest: BTreeMap<StakeAddress, &'a AccountUpdate> = BTreeMap::new();
    for update in updates {
        match latest.get(&update.stake_address) {
            Some(current) if ordering_key(current) >= ordering_key(update) => {}
            _ => {
                latest.insert(update.stake_address.clone(), update);
            }
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn update(address: &str, action: AccountAction, time: u64, slot: u64) -> AccountUpdate {
        AccountUpdate {
            stake_address: address.to_string(),
            action,
            epoch: 300,
            epoch_slot: slot % 432_000,
            absolute_slot: slot,
            unix_block_time: time,
        }
    }

    #[test]
    fn test_latest_by_block_time() {
        let updates = vec![
            update("stake1a", AccountAction::Registration, 100, 10),
            update("stake1a", AccountAction::Deregistration, 200, 20),
            update("stake1b", AccountAction::Deregistration, 50, 5),
            update("stake1b", AccountAction::Registration, 60, 6),
        ];
        let latest = latest_updates(&updates);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["stake1a"].action, AccountAction::Deregistration);
        assert_eq!(latest["stake1b"].action, AccountAction::Registration);
    }

    #[test]
    fn test_same_block_time_resolved_by_slot() {
        let updates = vec![
            update("stake1a", AccountAction::Deregistration, 100, 11),
            update("stake1a", AccountAction::Registration, 100, 12),
        ];
        assert_eq!(
            latest_updates(&updates)["stake1a"].action,
            AccountAction::Registration
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(latest_updates(&Vec::new()).is_empty());
    }

    fn arb_update() -> impl Strategy<Value = AccountUpdate> {
        (0usize..4, any::<bool>(), 0u64..20, 0u64..20).prop_map(|(who, dereg, time, slot)| {
            let action = if dereg {
                AccountAction::Deregistration
            } else {
                AccountAction::Registration
            };
            update(&format!("stake1{who}"), action, time, slot)
        })
    }

    proptest! {
        #[test]
        fn test_selection_is_order_independent(
            (original, shuffled) in prop::collection::vec(arb_update(), 0..24)
                .prop_flat_map(|updates| (Just(updates.clone()), Just(updates).prop_shuffle()))
        ) {
            let a = latest_updates(&original);
            let b = latest_updates(&shuffled);
            prop_assert_eq!(a, b);
        }
    }
}
