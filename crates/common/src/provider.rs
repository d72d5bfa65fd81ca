//! JSON-RPC provider construction.

use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use eyre::{Result, WrapErr};
use url::Url;

/// Builds a plain HTTP JSON-RPC provider for the given endpoint.
pub fn http_provider(rpc_url: &str) -> Result<RootProvider> {
    let url: Url = rpc_url.parse().wrap_err_with(|| format!("invalid rpc url: {rpc_url}"))?;
    Ok(RootProvider::new_http(url))
}

/// Wraps a provider with a wallet so that state-changing calls can be
/// signed and sent, with the recommended fillers (nonce, gas, chain id).
pub fn signing_provider(wallet: EthereumWallet, provider: RootProvider) -> impl Provider + Clone {
    ProviderBuilder::new().wallet(wallet).connect_provider(provider)
}
