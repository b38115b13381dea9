//! Per-network constants.
//!
//! One [`NetworkConfig`] is selected at startup and passed down to every
//! engine. Hard-fork epochs and genesis values are never written inline in
//! a formula.

use adapot_numeric::{serde_lovelace, serde_rate, Lovelace, Rate};
use serde::{Deserialize, Serialize};

use crate::params::ProtocolParameters;
use crate::{Epoch, Result, TypesError};

/// Layout version of [`NetworkConfig`].
pub const NETWORK_CONFIG_VERSION: u32 = 1;

/// Mainnet protocol magic.
pub const MAINNET_MAGIC: u32 = 764_824_073;
/// Preprod protocol magic.
pub const PREPROD_MAGIC: u32 = 1;
/// Preview protocol magic.
pub const PREVIEW_MAGIC: u32 = 2;
/// Sanchonet protocol magic.
pub const SANCHONET_MAGIC: u32 = 4;

/// Constants and era boundaries of one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Layout version, currently [`NETWORK_CONFIG_VERSION`].
    pub config_version: u32,
    /// Protocol magic.
    pub network_magic: u32,
    /// Maximum lovelace supply.
    #[serde(with = "serde_lovelace")]
    pub total_supply: Lovelace,
    /// Pool registration deposit.
    #[serde(with = "serde_lovelace")]
    pub pool_deposit: Lovelace,
    /// Slots per epoch.
    pub expected_slots_per_epoch: u64,
    /// Active slot coefficient `f`.
    #[serde(with = "serde_rate")]
    pub active_slot_coefficient: Rate,
    /// Slot within an epoch after which the stake snapshot is stable.
    pub randomness_stabilisation_window: u64,
    /// First Shelley epoch.
    pub shelley_start_epoch: Epoch,
    /// First Allegra epoch.
    pub allegra_hardfork_epoch: Epoch,
    /// First Vasil epoch.
    pub vasil_hardfork_epoch: Epoch,
    /// Byron bootstrap-address value returned to reserves at Allegra.
    #[serde(with = "serde_lovelace")]
    pub bootstrap_address_amount: Lovelace,
    /// Reserves at the Shelley start epoch.
    #[serde(with = "serde_lovelace")]
    pub shelley_initial_reserves: Lovelace,
    /// Treasury at the Shelley start epoch.
    #[serde(with = "serde_lovelace")]
    pub shelley_initial_treasury: Lovelace,
    /// UTxO value at the Shelley start epoch.
    #[serde(with = "serde_lovelace")]
    pub shelley_initial_utxo: Lovelace,
    /// Parameters in force before the first on-chain update.
    pub genesis_parameters: ProtocolParameters,
}

fn decimal(units: i64, scale: i64) -> Rate {
    Rate::new(units.into(), scale)
}

fn shelley_genesis_parameters() -> ProtocolParameters {
    ProtocolParameters {
        decentralisation: decimal(1, 0),
        treasury_growth_rate: decimal(2, 1),
        monetary_expansion_rate: decimal(3, 3),
        optimal_pool_count: 150,
        pool_owner_influence: decimal(3, 1),
    }
}

impl NetworkConfig {
    /// Mainnet.
    pub fn mainnet() -> Self {
        Self {
            config_version: NETWORK_CONFIG_VERSION,
            network_magic: MAINNET_MAGIC,
            total_supply: Lovelace::from(45_000_000_000_000_000_u64),
            pool_deposit: Lovelace::from(500_000_000_u64),
            expected_slots_per_epoch: 432_000,
            active_slot_coefficient: decimal(5, 2),
            randomness_stabilisation_window: 172_800,
            shelley_start_epoch: 208,
            allegra_hardfork_epoch: 236,
            vasil_hardfork_epoch: 365,
            bootstrap_address_amount: Lovelace::from(318_200_635_000_000_u64),
            shelley_initial_reserves: Lovelace::from(13_888_022_852_926_644_u64),
            shelley_initial_treasury: Lovelace::from(0),
            shelley_initial_utxo: Lovelace::from(31_111_977_147_073_356_u64),
            genesis_parameters: shelley_genesis_parameters(),
        }
    }

    /// Preprod testnet.
    pub fn preprod() -> Self {
        Self {
            network_magic: PREPROD_MAGIC,
            shelley_start_epoch: 4,
            allegra_hardfork_epoch: 5,
            vasil_hardfork_epoch: 12,
            ..Self::testnet_base()
        }
    }

    /// Preview testnet.
    pub fn preview() -> Self {
        Self {
            network_magic: PREVIEW_MAGIC,
            ..Self::short_epoch_testnet()
        }
    }

    /// Sanchonet testnet.
    pub fn sanchonet() -> Self {
        Self {
            network_magic: SANCHONET_MAGIC,
            ..Self::short_epoch_testnet()
        }
    }

    // Testnets share genesis balances. The UTxO value closes the genesis
    // pots against total supply.
    fn testnet_base() -> Self {
        Self {
            bootstrap_address_amount: Lovelace::from(0),
            shelley_initial_reserves: Lovelace::from(14_991_000_000_000_000_u64),
            shelley_initial_treasury: Lovelace::from(9_000_000_000_000_u64),
            shelley_initial_utxo: Lovelace::from(30_000_000_000_000_000_u64),
            ..Self::mainnet()
        }
    }

    fn short_epoch_testnet() -> Self {
        Self {
            expected_slots_per_epoch: 86_400,
            randomness_stabilisation_window: 34_560,
            shelley_start_epoch: 1,
            allegra_hardfork_epoch: 1,
            vasil_hardfork_epoch: 3,
            ..Self::testnet_base()
        }
    }

    /// Select a preset by protocol magic.
    ///
    /// # Errors
    ///
    /// - [`TypesError::UnknownNetwork`] for an unrecognised magic
    pub fn from_magic(magic: u32) -> Result<Self> {
        match magic {
            MAINNET_MAGIC => Ok(Self::mainnet()),
            PREPROD_MAGIC => Ok(Self::preprod()),
            PREVIEW_MAGIC => Ok(Self::preview()),
            SANCHONET_MAGIC => Ok(Self::sanchonet()),
            other => Err(TypesError::UnknownNetwork(other)),
        }
    }

    /// Select a preset by name (`mainnet`, `preprod`, `preview`, `sanchonet`).
    ///
    /// # Errors
    ///
    /// - [`TypesError::UnknownNetworkName`] for an unrecognised name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::mainnet()),
            "preprod" => Ok(Self::preprod()),
            "preview" => Ok(Self::preview()),
            "sanchonet" => Ok(Self::sanchonet()),
            _ => Err(TypesError::UnknownNetworkName(name.to_string())),
        }
    }

    /// Whether rewards earned in `earned_epoch` follow pre-Allegra rules.
    pub fn is_pre_allegra(&self, earned_epoch: Epoch) -> bool {
        earned_epoch < self.allegra_hardfork_epoch
    }

    /// Whether rewards earned in `earned_epoch` follow Vasil rules.
    pub fn is_vasil(&self, earned_epoch: Epoch) -> bool {
        earned_epoch >= self.vasil_hardfork_epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_magic() {
        let config = NetworkConfig::from_magic(MAINNET_MAGIC).expect("mainnet");
        assert_eq!(config.shelley_start_epoch, 208);
        assert_eq!(config.pool_deposit, Lovelace::from(500_000_000));

        let sancho = NetworkConfig::from_magic(4).expect("sanchonet");
        assert_eq!(sancho.network_magic, SANCHONET_MAGIC);
        assert_eq!(sancho.expected_slots_per_epoch, 86_400);

        assert_eq!(
            NetworkConfig::from_magic(42),
            Err(TypesError::UnknownNetwork(42))
        );
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(
            NetworkConfig::from_name("Preprod").expect("preprod"),
            NetworkConfig::preprod()
        );
        assert!(NetworkConfig::from_name("devnet").is_err());
    }

    #[test]
    fn test_era_predicates() {
        let mainnet = NetworkConfig::mainnet();
        assert!(mainnet.is_pre_allegra(235));
        assert!(!mainnet.is_pre_allegra(236));
        assert!(!mainnet.is_vasil(364));
        assert!(mainnet.is_vasil(365));
    }

    #[test]
    fn test_genesis_rates_are_exact() {
        let params = NetworkConfig::mainnet().genesis_parameters;
        assert_eq!(params.monetary_expansion_rate.to_string(), "0.003");
        assert_eq!(params.treasury_growth_rate.to_string(), "0.2");
        assert_eq!(params.pool_owner_influence.to_string(), "0.3");
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = NetworkConfig::preview();
        let json = serde_json::to_string(&config).expect("serialize");
        let back: NetworkConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }
}
