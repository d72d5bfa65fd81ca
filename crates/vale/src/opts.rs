//! Shared CLI option groups, merged over the file/env configuration.

use std::sync::Arc;

use alloy_primitives::Address;
use clap::Parser;
use eyre::Result;
use vale_config::{
    Config,
    figment::{providers::Serialized, value::Dict},
};
use vale_wallets::{LocalAgent, SigningAgent};

/// RPC connection options.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "RPC options")]
pub struct RpcOpts {
    /// The RPC endpoint.
    #[arg(short = 'r', long = "rpc-url", env = "ETH_RPC_URL", value_name = "URL")]
    pub url: Option<String>,
}

impl RpcOpts {
    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(url) = &self.url {
            dict.insert("rpc_url".into(), url.clone().into());
        }
        dict
    }
}

/// Contract address overrides.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Contract options")]
pub struct ContractOpts {
    /// Address of the validator NFT contract.
    #[arg(long, env = "VALE_VALIDATOR_TOKEN", value_name = "ADDRESS")]
    pub validator_token: Option<Address>,

    /// Address of the lending pool contract.
    #[arg(long, env = "VALE_LENDING_POOL", value_name = "ADDRESS")]
    pub lending_pool: Option<Address>,
}

impl ContractOpts {
    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(token) = self.validator_token {
            dict.insert("validator_token".into(), token.to_string().into());
        }
        if let Some(pool) = self.lending_pool {
            dict.insert("lending_pool".into(), pool.to_string().into());
        }
        dict
    }
}

/// Wallet options. The raw wallet can be:
/// 1. Private Key (cleartext in CLI or environment)
/// 2. Private Key (interactively via secure prompt)
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Wallet options")]
pub struct WalletOpts {
    /// Open an interactive prompt to enter your private key.
    #[arg(long, short)]
    pub interactive: bool,

    /// Use the provided private key.
    #[arg(long, env = "ETH_PRIVATE_KEY", value_name = "RAW_PRIVATE_KEY")]
    pub private_key: Option<String>,
}

impl WalletOpts {
    /// The signing agent present in this environment, if any.
    pub fn agent(&self, chain_id: Option<u64>) -> Result<Option<Arc<dyn SigningAgent>>> {
        let agent = if self.interactive {
            Some(LocalAgent::interactive()?)
        } else if let Some(key) = &self.private_key {
            Some(LocalAgent::from_private_key(key)?)
        } else {
            None
        };
        Ok(agent.map(|agent| Arc::new(agent.with_chain_id(chain_id)) as Arc<dyn SigningAgent>))
    }
}

/// Transaction options.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Transaction options")]
pub struct TxOpts {
    /// The number of confirmations to wait for.
    #[arg(long, value_name = "CONFIRMATIONS")]
    pub confirmations: Option<u64>,

    /// Seconds to wait for a transaction receipt.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl TxOpts {
    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(confirmations) = self.confirmations {
            dict.insert("confirmations".into(), confirmations.into());
        }
        if let Some(timeout) = self.timeout {
            dict.insert("transaction_timeout".into(), timeout.into());
        }
        dict
    }
}

/// Layers the CLI option groups over defaults, `vale.toml` and the
/// environment; CLI flags win.
pub fn load_config(rpc: &RpcOpts, contracts: &ContractOpts, tx: &TxOpts) -> Result<Config> {
    let mut dict = rpc.dict();
    dict.extend(contracts.dict());
    dict.extend(tx.dict());
    Ok(Config::figment().merge(Serialized::defaults(dict)).extract()?)
}
