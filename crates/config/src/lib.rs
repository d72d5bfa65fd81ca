//! Layered configuration for the Vale lending client.
//!
//! Values resolve in increasing priority: built-in defaults, the
//! `vale.toml` file in the working directory, `VALE_`-prefixed environment
//! variables, and finally whatever the CLI merges on top.

use alloy_primitives::Address;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

pub use figment;

/// File name the configuration is loaded from.
pub const FILE_NAME: &str = "vale.toml";

/// Fallback RPC endpoint when neither config nor `ETH_RPC_URL` provide one.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default endpoint of the off-chain validator registration service.
pub const DEFAULT_REGISTRY_URL: &str = "http://localhost:5001";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Extract(#[from] figment::Error),
    #[error("missing `{0}` contract address; set it in vale.toml or via VALE_{1}")]
    MissingAddress(&'static str, &'static str),
}

/// Vale client configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint. `ETH_RPC_URL` is consulted when unset.
    pub rpc_url: Option<String>,
    /// EIP-155 chain id applied to the signing agent when set.
    pub chain_id: Option<u64>,
    /// Address of the validator NFT contract.
    pub validator_token: Option<Address>,
    /// Address of the lending pool contract.
    pub lending_pool: Option<Address>,
    /// Base URL of the off-chain validator registration service.
    pub registry_url: String,
    /// Seconds to wait for a transaction receipt.
    pub transaction_timeout: u64,
    /// Confirmations required before a transaction counts as mined.
    pub confirmations: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: None,
            chain_id: None,
            validator_token: None,
            lending_pool: None,
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            transaction_timeout: 120,
            confirmations: 1,
        }
    }
}

impl Config {
    /// Returns the `Figment` the configuration is extracted from.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(FILE_NAME))
            .merge(Env::prefixed("VALE_"))
    }

    /// Loads the configuration from defaults, `vale.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self::figment().extract()?)
    }

    /// The RPC endpoint to use.
    ///
    /// Falls back to `ETH_RPC_URL`, then to the local default.
    pub fn rpc_url(&self) -> String {
        if let Some(url) = &self.rpc_url {
            return url.clone();
        }
        std::env::var("ETH_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string())
    }

    /// The validator NFT contract address, required for on-chain flows.
    pub fn validator_token(&self) -> Result<Address, ConfigError> {
        self.validator_token
            .ok_or(ConfigError::MissingAddress("validator_token", "VALIDATOR_TOKEN"))
    }

    /// The lending pool contract address, required for on-chain flows.
    pub fn lending_pool(&self) -> Result<Address, ConfigError> {
        self.lending_pool.ok_or(ConfigError::MissingAddress("lending_pool", "LENDING_POOL"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        figment::Jail::expect_with(|_| {
            let config = Config::load().unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.rpc_url(), DEFAULT_RPC_URL);
            assert!(config.validator_token().is_err());
            Ok(())
        });
    }

    #[test]
    fn loads_from_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                FILE_NAME,
                r#"
                rpc_url = "http://10.0.0.1:8545"
                validator_token = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
                lending_pool = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
                confirmations = 3
                "#,
            )?;
            let config = Config::load().unwrap();
            assert_eq!(config.rpc_url(), "http://10.0.0.1:8545");
            assert_eq!(
                config.validator_token().unwrap(),
                address!("0x5FbDB2315678afecb367f032d93F642f64180aa3")
            );
            assert_eq!(
                config.lending_pool().unwrap(),
                address!("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512")
            );
            assert_eq!(config.confirmations, 3);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(FILE_NAME, "transaction_timeout = 30")?;
            jail.set_env("VALE_TRANSACTION_TIMEOUT", "600");
            jail.set_env("VALE_REGISTRY_URL", "http://registry.example:9000");
            let config = Config::load().unwrap();
            assert_eq!(config.transaction_timeout, 600);
            assert_eq!(config.registry_url, "http://registry.example:9000");
            Ok(())
        });
    }

    #[test]
    fn rpc_url_falls_back_to_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ETH_RPC_URL", "http://fallback.example:8545");
            let config = Config::load().unwrap();
            assert_eq!(config.rpc_url(), "http://fallback.example:8545");
            Ok(())
        });
    }
}
