//! Configuration file management.

use std::path::PathBuf;

use adapot_types::{Epoch, NetworkConfig};
use serde::{Deserialize, Serialize};

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Network selection.
    #[serde(default)]
    pub network: NetworkSection,
    /// Range and inputs of the run.
    #[serde(default)]
    pub run: RunConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network selection. `magic` wins over `name` when both are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSection {
    /// "mainnet" | "preprod" | "preview" | "sanchonet".
    #[serde(default = "default_network_name")]
    pub name: String,
    /// Network magic.
    #[serde(default)]
    pub magic: Option<u32>,
}

/// Range and inputs of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// First epoch boundary to settle.
    #[serde(default = "default_start_epoch")]
    pub start_epoch: Epoch,
    /// Last epoch boundary to settle.
    #[serde(default = "default_end_epoch")]
    pub end_epoch: Epoch,
    /// Pool workers. 0 = one per CPU.
    #[serde(default)]
    pub worker_threads: usize,
    /// JSON chain facts.
    #[serde(default = "default_facts_path")]
    pub facts_path: String,
    /// Checkpoint file. Empty = no checkpoint.
    #[serde(default)]
    pub checkpoint_path: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions

fn default_network_name() -> String {
    "mainnet".to_string()
}

fn default_start_epoch() -> Epoch {
    208
}

fn default_end_epoch() -> Epoch {
    215
}

fn default_facts_path() -> String {
    "facts.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            name: default_network_name(),
            magic: None,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_epoch: default_start_epoch(),
            end_epoch: default_end_epoch(),
            worker_threads: 0,
            facts_path: default_facts_path(),
            checkpoint_path: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl CliConfig {
    /// Load configuration from `ADAPOT_CONFIG`, or `adapot.toml` in the
    /// working directory.
    ///
    /// Falls back to defaults if the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Preset of the configured network.
    pub fn network(&self) -> anyhow::Result<NetworkConfig> {
        let network = match self.network.magic {
            Some(magic) => NetworkConfig::from_magic(magic)?,
            None => NetworkConfig::from_name(&self.network.name)?,
        };
        Ok(network)
    }

    pub fn facts_path(&self) -> PathBuf {
        PathBuf::from(&self.run.facts_path)
    }

    pub fn checkpoint_path(&self) -> Option<PathBuf> {
        if self.run.checkpoint_path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.run.checkpoint_path))
        }
    }

    fn config_path() -> PathBuf {
        std::env::var("ADAPOT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("adapot.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.network.name, "mainnet");
        assert_eq!(config.run.start_epoch, 208);
        assert_eq!(config.run.worker_threads, 0);
        assert_eq!(config.logging.log_level, "info");
        assert!(config.checkpoint_path().is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = CliConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let _parsed: CliConfig = toml::from_str(&toml_str).expect("parse");
    }

    #[test]
    fn test_partial_file() {
        let config = CliConfig::parse(
            r#"
            [network]
            magic = 1

            [run]
            start_epoch = 5
            end_epoch = 20
            checkpoint_path = "preprod.checkpoint.json"
            "#,
        )
        .expect("parse");

        assert_eq!(config.run.end_epoch, 20);
        assert_eq!(config.run.facts_path, "facts.json");
        assert_eq!(config.logging.log_level, "info");
        assert_eq!(config.network().expect("network").network_magic, 1);
        assert_eq!(
            config.checkpoint_path(),
            Some(PathBuf::from("preprod.checkpoint.json"))
        );
    }

    #[test]
    fn test_unknown_network_rejected() {
        let config = CliConfig::parse("[network]\nname = \"devnet\"\n").expect("parse");
        assert!(config.network().is_err());
    }
}
