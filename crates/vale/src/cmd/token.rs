//! Read-only queries over the validator token.

use alloy_primitives::{Address, U256};
use alloy_provider::RootProvider;
use clap::Parser;
use eyre::Result;
use vale_common::provider::http_provider;
use vale_lending::{EthGateway, LendingGateway, parse_token_id};

use crate::opts::{ContractOpts, RpcOpts, TxOpts, load_config};

/// CLI arguments for `vale owner`.
#[derive(Debug, Parser)]
pub struct OwnerArgs {
    /// The validator NFT token id.
    #[arg(value_name = "TOKEN_ID")]
    token_id: String,

    #[command(flatten)]
    rpc: RpcOpts,

    #[command(flatten)]
    contracts: ContractOpts,
}

impl OwnerArgs {
    pub async fn run(self) -> Result<()> {
        let (gateway, token_id) = read_gateway(&self.rpc, &self.contracts, &self.token_id)?;
        let owner = gateway.owner_of(token_id).await?;
        println!("{owner}");
        Ok(())
    }
}

/// CLI arguments for `vale approved`.
#[derive(Debug, Parser)]
pub struct ApprovedArgs {
    /// The validator NFT token id.
    #[arg(value_name = "TOKEN_ID")]
    token_id: String,

    #[command(flatten)]
    rpc: RpcOpts,

    #[command(flatten)]
    contracts: ContractOpts,
}

impl ApprovedArgs {
    pub async fn run(self) -> Result<()> {
        let (gateway, token_id) = read_gateway(&self.rpc, &self.contracts, &self.token_id)?;
        let approved = gateway.get_approved(token_id).await?;
        if approved == Address::ZERO {
            println!("none");
        } else {
            println!("{approved}");
        }
        Ok(())
    }
}

fn read_gateway(
    rpc: &RpcOpts,
    contracts: &ContractOpts,
    token_id: &str,
) -> Result<(EthGateway<RootProvider>, U256)> {
    let config = load_config(rpc, contracts, &TxOpts::default())?;
    let token_id = parse_token_id(token_id)?;
    let provider = http_provider(&config.rpc_url())?;
    // Reads never touch the pool; its address is irrelevant here.
    let gateway = EthGateway::new(
        provider,
        config.validator_token()?,
        config.lending_pool.unwrap_or_default(),
    );
    Ok((gateway, token_id))
}
