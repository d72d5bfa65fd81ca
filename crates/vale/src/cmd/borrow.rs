use clap::Parser;
use eyre::{Result, eyre};
use vale_common::provider::{http_provider, signing_provider};
use vale_lending::{BorrowFlow, BorrowOutcome, ErrorCategory, EthGateway};
use vale_wallets::{SessionError, WalletSession};

use crate::opts::{ContractOpts, RpcOpts, TxOpts, WalletOpts, load_config};

/// CLI arguments for `vale borrow`.
#[derive(Debug, Parser)]
pub struct BorrowArgs {
    /// The validator NFT token id to use as collateral.
    #[arg(value_name = "TOKEN_ID")]
    token_id: String,

    #[command(flatten)]
    rpc: RpcOpts,

    #[command(flatten)]
    contracts: ContractOpts,

    #[command(flatten)]
    wallet: WalletOpts,

    #[command(flatten)]
    tx: TxOpts,
}

impl BorrowArgs {
    pub async fn run(self) -> Result<()> {
        let config = load_config(&self.rpc, &self.contracts, &self.tx)?;
        let validator_token = config.validator_token()?;
        let lending_pool = config.lending_pool()?;

        let session = match self.wallet.agent(config.chain_id)? {
            Some(agent) => WalletSession::new(agent),
            None => WalletSession::detached(),
        };
        let borrower = session.connect().await.map_err(|err| {
            let category = match err {
                SessionError::NoWalletAvailable => ErrorCategory::NoWalletAvailable,
                SessionError::UserRejected => ErrorCategory::UserRejected,
                _ => ErrorCategory::Unknown,
            };
            eyre!("{category}: {err}")
        })?;

        let provider = http_provider(&config.rpc_url())?;
        let gateway = EthGateway::new(
            signing_provider(session.wallet()?, provider),
            validator_token,
            lending_pool,
        )
        .with_confirmations(config.confirmations)
        .with_timeout(Some(config.transaction_timeout));

        let flow = BorrowFlow::new(gateway, borrower);
        let request = flow.run(&self.token_id).await?;

        for (step, hash) in request.tx_hashes() {
            println!("{step}: {hash}");
        }
        match request.result() {
            Some(BorrowOutcome::Succeeded { tx_hash }) => {
                println!("loan granted: {tx_hash}");
                Ok(())
            }
            Some(BorrowOutcome::Failed { category, message }) => {
                Err(eyre!("{category}: {message}"))
            }
            None => Err(eyre!("borrow flow ended without a terminal result")),
        }
    }
}
