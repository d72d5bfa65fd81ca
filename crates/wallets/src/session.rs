use std::sync::Arc;

use alloy_network::EthereumWallet;
use alloy_primitives::Address;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    agent::SigningAgent,
    error::{AgentError, SessionError},
};

/// Connection state of a [`WalletSession`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// A connect attempt was made and declined or errored. Distinct from
    /// [`SessionStatus::Disconnected`] so callers can tell "never tried"
    /// from "tried and declined".
    Failed,
}

#[derive(Default)]
struct SessionState {
    status: SessionStatus,
    address: Option<Address>,
    /// Outcome of the last failed attempt, returned to callers that joined
    /// while it was still in flight.
    failure: Option<SessionError>,
}

/// The session owning the connection to the user's signing agent.
///
/// At most one live session exists per process and nothing outside it
/// mutates connection state. The signing capability never leaves the
/// session other than as the wallet handle consumed by a signing provider.
pub struct WalletSession {
    agent: Option<Arc<dyn SigningAgent>>,
    state: Mutex<SessionState>,
    /// Serializes connect attempts: a call made while another is in flight
    /// parks here and shares that attempt's outcome instead of prompting
    /// the agent a second time.
    connect_gate: tokio::sync::Mutex<()>,
}

impl WalletSession {
    pub fn new(agent: Arc<dyn SigningAgent>) -> Self {
        Self {
            agent: Some(agent),
            state: Mutex::new(SessionState::default()),
            connect_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// A session in an environment with no wallet-capable agent present.
    pub fn detached() -> Self {
        Self {
            agent: None,
            state: Mutex::new(SessionState::default()),
            connect_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Connects to the signing agent, prompting it for account access.
    ///
    /// Transitions Disconnected/Failed -> Connecting -> Connected. While an
    /// attempt is in flight a second call returns the pending outcome; a
    /// call made after a failure starts a fresh attempt.
    pub async fn connect(&self) -> Result<Address, SessionError> {
        let Some(agent) = self.agent.clone() else {
            return Err(SessionError::NoWalletAvailable);
        };
        if let Some(address) = self.current_address() {
            return Ok(address);
        }

        let joined_pending = self.state.lock().status == SessionStatus::Connecting;
        let _gate = self.connect_gate.lock().await;
        {
            let state = self.state.lock();
            match state.status {
                SessionStatus::Connected => {
                    if let Some(address) = state.address {
                        return Ok(address);
                    }
                }
                SessionStatus::Failed if joined_pending => {
                    return Err(state.failure.clone().unwrap_or(SessionError::UserRejected));
                }
                _ => {}
            }
        }

        self.state.lock().status = SessionStatus::Connecting;
        debug!(target: "vale::wallets", "requesting account access from signing agent");
        let result = agent.request_accounts().await;

        let mut state = self.state.lock();
        match result {
            Ok(accounts) => {
                if let Some(&address) = accounts.first() {
                    *state = SessionState {
                        status: SessionStatus::Connected,
                        address: Some(address),
                        failure: None,
                    };
                    debug!(target: "vale::wallets", %address, "wallet connected");
                    Ok(address)
                } else {
                    Err(Self::fail(&mut state, SessionError::Agent(AgentError::NoAccounts)))
                }
            }
            Err(AgentError::Rejected) => Err(Self::fail(&mut state, SessionError::UserRejected)),
            Err(err) => Err(Self::fail(&mut state, SessionError::Agent(err))),
        }
    }

    fn fail(state: &mut SessionState, err: SessionError) -> SessionError {
        debug!(target: "vale::wallets", %err, "wallet connection failed");
        state.status = SessionStatus::Failed;
        state.address = None;
        state.failure = Some(err.clone());
        err
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status
    }

    /// The connected account; `None` unless [`SessionStatus::Connected`].
    pub fn current_address(&self) -> Option<Address> {
        let state = self.state.lock();
        match state.status {
            SessionStatus::Connected => state.address,
            _ => None,
        }
    }

    /// The signing capability for the connected account.
    pub fn wallet(&self) -> Result<EthereumWallet, SessionError> {
        if self.current_address().is_none() {
            return Err(SessionError::NotConnected);
        }
        match &self.agent {
            Some(agent) => Ok(agent.wallet()),
            None => Err(SessionError::NoWalletAvailable),
        }
    }

    /// Handles the agent's accounts-changed signal. Switching to a
    /// different account resets the session; the next operation that needs
    /// signing reconnects.
    pub fn accounts_changed(&self, accounts: &[Address]) {
        let mut state = self.state.lock();
        if state.status != SessionStatus::Connected {
            return;
        }
        if accounts.first().copied() == state.address {
            return;
        }
        debug!(target: "vale::wallets", "signing agent switched accounts, resetting session");
        *state = SessionState::default();
    }

    /// Drops the connection and returns to `Disconnected`.
    pub fn disconnect(&self) {
        *self.state.lock() = SessionState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_signer_local::PrivateKeySigner;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct TestAgent {
        signer: PrivateKeySigner,
        reject: AtomicBool,
        prompts: AtomicUsize,
        hold: Option<Arc<Notify>>,
    }

    impl TestAgent {
        fn accepting() -> Self {
            Self {
                signer: PrivateKeySigner::random(),
                reject: AtomicBool::new(false),
                prompts: AtomicUsize::new(0),
                hold: None,
            }
        }

        fn rejecting() -> Self {
            let agent = Self::accepting();
            agent.reject.store(true, Ordering::SeqCst);
            agent
        }

        fn held(hold: Arc<Notify>) -> Self {
            Self { hold: Some(hold), ..Self::accepting() }
        }
    }

    #[async_trait]
    impl SigningAgent for TestAgent {
        async fn request_accounts(&self) -> Result<Vec<Address>, AgentError> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            if self.reject.load(Ordering::SeqCst) {
                Err(AgentError::Rejected)
            } else {
                Ok(vec![self.signer.address()])
            }
        }

        fn wallet(&self) -> EthereumWallet {
            EthereumWallet::from(self.signer.clone())
        }
    }

    #[tokio::test]
    async fn connect_populates_address() {
        let agent = Arc::new(TestAgent::accepting());
        let expected = agent.signer.address();
        let session = WalletSession::new(agent);

        assert_eq!(session.status(), SessionStatus::Disconnected);
        assert_eq!(session.current_address(), None);

        let address = session.connect().await.unwrap();
        assert_eq!(address, expected);
        assert_eq!(session.status(), SessionStatus::Connected);
        assert_eq!(session.current_address(), Some(expected));
        assert!(session.wallet().is_ok());
    }

    #[tokio::test]
    async fn rejection_transitions_to_failed() {
        let session = WalletSession::new(Arc::new(TestAgent::rejecting()));
        let err = session.connect().await.unwrap_err();
        assert_eq!(err, SessionError::UserRejected);
        // Failed, not Disconnected: "tried and declined" stays observable.
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_eq!(session.current_address(), None);
    }

    #[tokio::test]
    async fn detached_session_reports_no_wallet() {
        let session = WalletSession::detached();
        let err = session.connect().await.unwrap_err();
        assert_eq!(err, SessionError::NoWalletAvailable);
        assert_eq!(session.status(), SessionStatus::Disconnected);
    }

    #[tokio::test]
    async fn wallet_requires_connection() {
        let session = WalletSession::new(Arc::new(TestAgent::accepting()));
        assert_eq!(session.wallet().unwrap_err(), SessionError::NotConnected);
    }

    #[tokio::test]
    async fn concurrent_connect_prompts_once() {
        let hold = Arc::new(Notify::new());
        let agent = Arc::new(TestAgent::held(hold.clone()));
        let session = Arc::new(WalletSession::new(agent.clone()));

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.connect().await }
        });
        while session.status() != SessionStatus::Connecting {
            tokio::task::yield_now().await;
        }
        let second = tokio::spawn({
            let session = session.clone();
            async move { session.connect().await }
        });

        hold.notify_one();
        let a = first.await.unwrap().unwrap();
        let b = second.await.unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(agent.prompts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fresh_connect_retries_after_failure() {
        let agent = Arc::new(TestAgent::rejecting());
        let session = WalletSession::new(agent.clone());

        assert_eq!(session.connect().await.unwrap_err(), SessionError::UserRejected);
        agent.reject.store(false, Ordering::SeqCst);
        let address = session.connect().await.unwrap();
        assert_eq!(address, agent.signer.address());
        assert_eq!(agent.prompts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn accounts_changed_resets_session() {
        let session = WalletSession::new(Arc::new(TestAgent::accepting()));
        let address = session.connect().await.unwrap();

        // Same account: no-op.
        session.accounts_changed(&[address]);
        assert_eq!(session.status(), SessionStatus::Connected);

        session.accounts_changed(&[Address::random()]);
        assert_eq!(session.status(), SessionStatus::Disconnected);
        assert_eq!(session.current_address(), None);
    }
}
