use std::fmt;

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, ChainId};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use crate::error::AgentError;

/// A wallet-capable signing agent, shaped after the EIP-1193 provider
/// surface: account access must be requested and may be declined.
#[async_trait]
pub trait SigningAgent: Send + Sync {
    /// Prompts the agent for account access (`eth_requestAccounts`).
    ///
    /// A declined prompt surfaces as [`AgentError::Rejected`].
    async fn request_accounts(&self) -> Result<Vec<Address>, AgentError>;

    /// The signing capability used to authorize transactions.
    fn wallet(&self) -> EthereumWallet;
}

/// Signing agent backed by an in-process private key.
#[derive(Clone)]
pub struct LocalAgent {
    signer: PrivateKeySigner,
}

impl LocalAgent {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Builds the agent from a hex-encoded private key.
    pub fn from_private_key(key: &str) -> Result<Self, AgentError> {
        let signer = key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|err| AgentError::Signer(err.to_string()))?;
        Ok(Self::new(signer))
    }

    /// Prompts for the private key on the terminal without echoing it.
    pub fn interactive() -> Result<Self, AgentError> {
        let key = rpassword::prompt_password("Enter private key: ")
            .map_err(|err| AgentError::Other(err.to_string()))?;
        Self::from_private_key(&key)
    }

    /// Applies an EIP-155 chain id to signatures produced by this agent.
    pub fn with_chain_id(mut self, chain_id: Option<ChainId>) -> Self {
        self.signer.set_chain_id(chain_id);
        self
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl SigningAgent for LocalAgent {
    async fn request_accounts(&self) -> Result<Vec<Address>, AgentError> {
        // A local key has nothing to prompt; access is always granted.
        Ok(vec![self.signer.address()])
    }

    fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for LocalAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAgent").field("address", &self.signer.address()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_private_key_with_and_without_prefix() {
        let key = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let bare = LocalAgent::from_private_key(key).unwrap();
        let prefixed = LocalAgent::from_private_key(&format!("0x{key}")).unwrap();
        assert_eq!(bare.address(), prefixed.address());
    }

    #[test]
    fn rejects_garbage_keys() {
        assert!(matches!(
            LocalAgent::from_private_key("not a key"),
            Err(AgentError::Signer(_))
        ));
    }

    #[test]
    fn debug_does_not_leak_the_key() {
        let key = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let agent = LocalAgent::from_private_key(key).unwrap();
        let out = format!("{agent:?}");
        assert!(!out.contains("ac0974"), "{out}");
    }
}
