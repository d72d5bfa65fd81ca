use clap::Parser;
use eyre::{Result, eyre};
use vale_common::display_chain;
use vale_config::Config;
use vale_lending::{RegistrationClient, parse_token_id};

/// CLI arguments for `vale register`.
#[derive(Debug, Parser)]
pub struct RegisterArgs {
    /// The validator NFT token id to register.
    #[arg(value_name = "TOKEN_ID")]
    token_id: String,

    /// Base URL of the registration service.
    #[arg(long, env = "VALE_REGISTRY_URL", value_name = "URL")]
    registry_url: Option<String>,
}

impl RegisterArgs {
    pub async fn run(self) -> Result<()> {
        // The off-chain flow shares only input validation with the borrow
        // path; it never touches the chain.
        let token_id = parse_token_id(&self.token_id)?;

        let config = Config::load()?;
        let registry_url = self.registry_url.unwrap_or(config.registry_url);
        let client = RegistrationClient::new(&registry_url)?;

        match client.register(&token_id.to_string()).await {
            Ok(message) => {
                println!("{message}");
                Ok(())
            }
            Err(err) => {
                let category = err.category();
                let report = eyre::Report::from(err);
                Err(eyre!("{category}: {}", display_chain(&report)))
            }
        }
    }
}
