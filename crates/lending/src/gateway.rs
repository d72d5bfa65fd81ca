//! Chain read/write gateway.
//!
//! Exactly the contract surface the borrow flow needs, behind
//! [`LendingGateway`]. The on-chain implementation also owns the single
//! error-normalization point: raw provider and contract failures never
//! leave this module, they are reduced to [`GatewayError`] first.

use std::{sync::Arc, time::Duration};

use alloy_contract::Error as ContractError;
use alloy_json_rpc::{ErrorPayload, RpcError};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{PendingTransactionBuilder, PendingTransactionError, Provider};
use alloy_sol_types::sol;
use async_trait::async_trait;
use tracing::{debug, trace};
use vale_common::{decode_revert_reason, display_chain};

sol! {
    #[sol(rpc)]
    interface IValidatorToken {
        function ownerOf(uint256 tokenId) external view returns (address);
        function getApproved(uint256 tokenId) external view returns (address);
        function approve(address to, uint256 tokenId) external;
    }
}

sol! {
    #[sol(rpc)]
    interface ILendingPool {
        function borrow(uint256 tokenId, address borrower) external;
    }
}

/// Handle for a submitted, not yet mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTx {
    pub hash: TxHash,
}

/// Mined outcome of a submitted transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxOutcome {
    pub hash: TxHash,
    /// Receipt status. A transaction can mine and still fail; nothing is
    /// thrown in that case, this flag alone reports it.
    pub success: bool,
}

/// A chain interaction failure, normalized at the gateway boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The signing agent declined the request.
    #[error("user rejected the request")]
    Rejected,
    /// The call reverted. `reason` carries the decoded revert string when
    /// the payload had one.
    #[error("execution reverted{}", reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    Revert { reason: Option<String> },
    /// Transport, node, or signer plumbing failure.
    #[error("rpc error: {0}")]
    Rpc(String),
}

/// Capability surface the borrow flow drives: the four contract
/// operations, plus confirmation of a pending handle they returned.
#[async_trait]
pub trait LendingGateway: Send + Sync {
    /// Current owner of the validator NFT. Fails if the token is unknown.
    async fn owner_of(&self, token_id: U256) -> Result<Address, GatewayError>;

    /// Currently approved spender for the token; the zero address when
    /// there is none.
    async fn get_approved(&self, token_id: U256) -> Result<Address, GatewayError>;

    /// Approves `spender` for this token id only, never a blanket
    /// approval.
    async fn approve(&self, spender: Address, token_id: U256) -> Result<PendingTx, GatewayError>;

    /// Submits the borrow call against the lending pool.
    async fn borrow(&self, token_id: U256, borrower: Address) -> Result<PendingTx, GatewayError>;

    /// Waits for the mined receipt of a previously submitted transaction.
    async fn confirm(&self, pending: &PendingTx) -> Result<TxOutcome, GatewayError>;

    /// Address of the lending pool the flow borrows from.
    fn lending_pool(&self) -> Address;
}

#[async_trait]
impl<G: LendingGateway + ?Sized> LendingGateway for Arc<G> {
    async fn owner_of(&self, token_id: U256) -> Result<Address, GatewayError> {
        (**self).owner_of(token_id).await
    }

    async fn get_approved(&self, token_id: U256) -> Result<Address, GatewayError> {
        (**self).get_approved(token_id).await
    }

    async fn approve(&self, spender: Address, token_id: U256) -> Result<PendingTx, GatewayError> {
        (**self).approve(spender, token_id).await
    }

    async fn borrow(&self, token_id: U256, borrower: Address) -> Result<PendingTx, GatewayError> {
        (**self).borrow(token_id, borrower).await
    }

    async fn confirm(&self, pending: &PendingTx) -> Result<TxOutcome, GatewayError> {
        (**self).confirm(pending).await
    }

    fn lending_pool(&self) -> Address {
        (**self).lending_pool()
    }
}

/// On-chain gateway over the validator token and lending pool bindings.
///
/// Reads work with any provider; `approve` and `borrow` require `provider`
/// to carry the session's wallet.
#[derive(Clone, Debug)]
pub struct EthGateway<P> {
    provider: P,
    validator_token: Address,
    lending_pool: Address,
    confirmations: u64,
    timeout: Option<u64>,
}

impl<P: Provider + Clone> EthGateway<P> {
    pub fn new(provider: P, validator_token: Address, lending_pool: Address) -> Self {
        Self { provider, validator_token, lending_pool, confirmations: 1, timeout: None }
    }

    /// Confirmations to require before a transaction counts as mined.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// Receipt wait timeout in seconds; `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl<P: Provider + Clone> LendingGateway for EthGateway<P> {
    async fn owner_of(&self, token_id: U256) -> Result<Address, GatewayError> {
        trace!(target: "vale::gateway", %token_id, "ownerOf");
        IValidatorToken::new(self.validator_token, &self.provider)
            .ownerOf(token_id)
            .call()
            .await
            .map_err(normalize)
    }

    async fn get_approved(&self, token_id: U256) -> Result<Address, GatewayError> {
        trace!(target: "vale::gateway", %token_id, "getApproved");
        IValidatorToken::new(self.validator_token, &self.provider)
            .getApproved(token_id)
            .call()
            .await
            .map_err(normalize)
    }

    async fn approve(&self, spender: Address, token_id: U256) -> Result<PendingTx, GatewayError> {
        debug!(target: "vale::gateway", %spender, %token_id, "submitting approval");
        let pending = IValidatorToken::new(self.validator_token, &self.provider)
            .approve(spender, token_id)
            .send()
            .await
            .map_err(normalize)?;
        Ok(PendingTx { hash: *pending.tx_hash() })
    }

    async fn borrow(&self, token_id: U256, borrower: Address) -> Result<PendingTx, GatewayError> {
        debug!(target: "vale::gateway", %token_id, %borrower, "submitting borrow");
        let pending = ILendingPool::new(self.lending_pool, &self.provider)
            .borrow(token_id, borrower)
            .send()
            .await
            .map_err(normalize)?;
        Ok(PendingTx { hash: *pending.tx_hash() })
    }

    async fn confirm(&self, pending: &PendingTx) -> Result<TxOutcome, GatewayError> {
        debug!(target: "vale::gateway", hash = %pending.hash, "awaiting receipt");
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), pending.hash)
            .with_required_confirmations(self.confirmations)
            .with_timeout(self.timeout.map(Duration::from_secs))
            .get_receipt()
            .await
            .map_err(normalize_pending)?;
        Ok(TxOutcome { hash: pending.hash, success: receipt.status() })
    }

    fn lending_pool(&self) -> Address {
        self.lending_pool
    }
}

/// Reduces a raw contract call failure to a [`GatewayError`].
fn normalize(err: ContractError) -> GatewayError {
    if let ContractError::TransportError(RpcError::ErrorResp(payload)) = &err {
        return normalize_payload(payload);
    }
    GatewayError::Rpc(chain(&err))
}

fn normalize_pending(err: PendingTransactionError) -> GatewayError {
    GatewayError::Rpc(chain(&err))
}

fn chain(err: &(dyn std::error::Error + 'static)) -> String {
    display_chain(err)
}

fn normalize_payload(payload: &ErrorPayload) -> GatewayError {
    if is_user_rejection(payload) {
        return GatewayError::Rejected;
    }
    if let Some(data) = payload.as_revert_data() {
        return GatewayError::Revert { reason: decode_revert_reason(&data) };
    }
    if let Some(rest) = payload.message.strip_prefix("execution reverted") {
        let reason = rest.trim_start_matches(':').trim();
        return GatewayError::Revert {
            reason: (!reason.is_empty()).then(|| reason.to_string()),
        };
    }
    GatewayError::Rpc(payload.to_string())
}

/// EIP-1193 user-rejection code, plus the message shape wallets commonly
/// produce for it.
fn is_user_rejection(payload: &ErrorPayload) -> bool {
    const USER_REJECTED_REQUEST: i64 = 4001;
    if payload.code == USER_REJECTED_REQUEST {
        return true;
    }
    let message = payload.message.to_lowercase();
    message.contains("user rejected") || message.contains("user denied")
}
