/// Failures surfaced by a signing agent.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error("user rejected the request")]
    Rejected,
    #[error("signing agent returned no accounts")]
    NoAccounts,
    #[error("invalid signing key: {0}")]
    Signer(String),
    #[error("{0}")]
    Other(String),
}

/// Failures of the wallet session lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no wallet-capable signing agent is available")]
    NoWalletAvailable,
    #[error("user rejected the connection request")]
    UserRejected,
    #[error("wallet session is not connected")]
    NotConnected,
    #[error(transparent)]
    Agent(#[from] AgentError),
}
